//! JSON output of record sets.

use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `records` as a pretty-printed JSON array.
pub fn to_json<T: Serialize>(records: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Write `records` as JSON to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = records.len()))]
pub async fn write_records<T: Serialize>(records: &[T], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = to_json(records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(parent = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON records");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Group;

    fn groups() -> Vec<Group> {
        vec![Group {
            name: "ran1".to_string(),
            url: "http://www.3gpp.org/DynaReport/Meetings-R1.htm".to_string(),
        }]
    }

    #[test]
    fn test_to_json_uses_column_names() {
        let json = to_json(&groups()).unwrap();
        assert!(json.contains(r#""Name": "ran1""#));
        assert!(json.contains(r#""Url": "http://www.3gpp.org/DynaReport/Meetings-R1.htm""#));
    }

    #[tokio::test]
    async fn test_write_records_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/groups.json");
        write_records(&groups(), &path).await.unwrap();

        let back: Vec<Group> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, groups());
    }
}
