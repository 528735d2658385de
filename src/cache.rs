//! On-disk cache of record sets.
//!
//! One JSON file per `(kind, key)` under the cache root:
//!
//! ```text
//! cache/
//! ├── groups-all.json
//! ├── meetings-r1.json
//! ├── tdoc_list-r1-96.json
//! └── ftp_list-r1-96.json
//! ```
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the target, so an entry is either the previous complete table or the
//! new complete table. A file that cannot be read back as the expected kind is
//! treated as absent.

use crate::error::{CatalogError, Result};
use crate::models::{Record, ResourceKind};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<R> {
    kind: String,
    key: String,
    saved_at: String,
    columns: Vec<String>,
    records: R,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic file for `(kind, key)`.
    pub fn path_for(&self, kind: ResourceKind, key: &str) -> PathBuf {
        let key = urlencoding::encode(&key.trim().to_lowercase()).into_owned();
        self.root.join(format!("{}-{}.json", kind.slug(), key))
    }

    /// Load the cached record set, or `None` when absent or unreadable.
    #[instrument(level = "debug", skip(self), fields(kind = %T::KIND))]
    pub async fn load<T>(&self, key: &str) -> Option<Vec<T>>
    where
        T: Record + DeserializeOwned,
    {
        let path = self.path_for(T::KIND, key);
        let text = match fs::read_to_string(&path).await {
            Ok(t) => t,
            Err(_) => {
                debug!(path = %path.display(), "No cache entry");
                return None;
            }
        };
        let entry: CacheEntry<Vec<T>> = match serde_json::from_str(&text) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache entry; ignoring");
                return None;
            }
        };
        let expected: Vec<&str> = T::KIND.columns().to_vec();
        if entry.kind != T::KIND.slug() || entry.columns != expected {
            warn!(path = %path.display(), "Cache entry has a different schema; ignoring");
            return None;
        }
        debug!(path = %path.display(), rows = entry.records.len(), saved_at = %entry.saved_at, "Cache hit");
        Some(entry.records)
    }

    /// Persist `records`, superseding any previous entry for the key.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Cache`] when the directory, temporary file or rename
    /// fails. The previous entry is left in place in that case.
    #[instrument(level = "info", skip(self, records), fields(kind = %T::KIND, rows = records.len()))]
    pub async fn save<T>(&self, key: &str, records: &[T]) -> Result<()>
    where
        T: Record + Serialize,
    {
        let path = self.path_for(T::KIND, key);
        let cache_err = |message: String| CatalogError::Cache {
            path: path.display().to_string(),
            message,
        };

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| cache_err(e.to_string()))?;
        let entry = CacheEntry {
            kind: T::KIND.slug().to_string(),
            key: key.to_string(),
            saved_at: Utc::now().to_rfc3339(),
            columns: T::KIND.columns().iter().map(|c| c.to_string()).collect(),
            records,
        };
        let json = serde_json::to_vec_pretty(&entry).map_err(|e| cache_err(e.to_string()))?;

        // Removed on drop unless persisted.
        let tmp = NamedTempFile::new_in(&self.root)
            .map_err(|e| cache_err(e.to_string()))?
            .into_temp_path();
        let mut file = fs::OpenOptions::new()
            .write(true)
            .open(&tmp)
            .await
            .map_err(|e| cache_err(e.to_string()))?;
        file.write_all(&json)
            .await
            .map_err(|e| cache_err(e.to_string()))?;
        file.sync_all().await.map_err(|e| cache_err(e.to_string()))?;
        drop(file);
        tmp.persist(&path).map_err(|e| cache_err(e.error.to_string()))?;

        info!(path = %path.display(), "Saved cache entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Group, Meeting};

    fn groups() -> Vec<Group> {
        vec![
            Group {
                name: "ran1".to_string(),
                url: "http://www.3gpp.org/DynaReport/Meetings-R1.htm".to_string(),
            },
            Group {
                name: "ran2".to_string(),
                url: "http://www.3gpp.org/DynaReport/Meetings-R2.htm".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        assert!(store.load::<Group>("all").await.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_returns_same_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested"));
        store.save("all", &groups()).await.unwrap();
        assert_eq!(store.load::<Group>("all").await.unwrap(), groups());
    }

    #[tokio::test]
    async fn test_save_supersedes_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.save("all", &groups()).await.unwrap();
        store.save("all", &groups()[..1]).await.unwrap();
        assert_eq!(store.load::<Group>("all").await.unwrap().len(), 1);
    }

    #[test]
    fn test_file_names_are_deterministic_and_per_kind() {
        let store = CacheStore::new("cache");
        assert_eq!(
            store.path_for(ResourceKind::Meetings, "R1"),
            PathBuf::from("cache/meetings-r1.json")
        );
        assert_eq!(
            store.path_for(ResourceKind::TdocList, "R1-96 bis"),
            PathBuf::from("cache/tdoc_list-r1-96%20bis.json")
        );
    }

    #[tokio::test]
    async fn test_corrupt_or_foreign_entry_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        std::fs::write(store.path_for(ResourceKind::Groups, "all"), "{ truncated").unwrap();
        assert!(store.load::<Group>("all").await.is_none());

        // A groups file copied under a meetings name must not load as meetings.
        store.save("all", &groups()).await.unwrap();
        std::fs::copy(
            store.path_for(ResourceKind::Groups, "all"),
            store.path_for(ResourceKind::Meetings, "r1"),
        )
        .unwrap();
        assert!(store.load::<Meeting>("r1").await.is_none());
    }

    #[tokio::test]
    async fn test_no_temporary_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.save("all", &groups()).await.unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["groups-all.json".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store.save("all", &groups()).await.unwrap();

        // A root that is a regular file cannot hold cache entries.
        let blocked = CacheStore::new(store.path_for(ResourceKind::Groups, "all"));
        let err = blocked.save("all", &groups()[..1]).await.unwrap_err();
        assert!(matches!(err, CatalogError::Cache { .. }));

        assert_eq!(store.load::<Group>("all").await.unwrap(), groups());
    }
}
