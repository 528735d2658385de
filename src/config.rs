//! Immutable configuration for the catalog.
//!
//! The site layout constants (element ids, base URL, group name translation)
//! live here once and are handed to each component through [`CatalogConfig`].
//! Nothing in this module is mutated after start-up.

use crate::error::{CatalogError, Result};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use url::Url;

/// Root of the public site.
pub const DEFAULT_BASE_URL: &str = "http://www.3gpp.org";

/// Id of the top-level navigation container on the home page.
pub const NAV_ID: &str = "nav";

/// Id of the dynamic data table used by meeting and Tdoc list pages.
pub const DYN_TABLE_ID: &str = "a3dyntab";

/// Default bound for the "Zips" indirection of directory listings.
pub const DEFAULT_MAX_REDIRECTS: usize = 3;

pub const DEFAULT_CACHE_DIR: &str = "cache";

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_2) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/47.0.2526.80 Safari/537.36";

/// Short group names accepted by the catalog and their canonical names as
/// they appear in the site navigation.
pub const GROUP_NAME_TRANSLATION: &[(&str, &str)] = &[
    ("r1", "ran1"),
    ("r2", "ran2"),
    ("r3", "ran3"),
    ("r4", "ran4"),
];

/// Translate a short group name (`r1`) into its canonical name (`ran1`).
pub fn canonical_group_name(short: &str) -> Option<&'static str> {
    let short = short.trim().to_lowercase();
    GROUP_NAME_TRANSLATION
        .iter()
        .find(|(s, _)| *s == short)
        .map(|(_, long)| *long)
}

/// Settings shared by the fetcher, extractors and the controller.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: Url,
    pub cache_root: PathBuf,
    pub max_redirects: usize,
}

impl CatalogConfig {
    pub fn new(base_url: &str, cache_root: impl Into<PathBuf>, max_redirects: usize) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::Config(format!("invalid base url {base_url}: {e}")))?;
        Ok(Self {
            base_url,
            cache_root: cache_root.into(),
            max_redirects,
        })
    }
}

/// Proxy file layout:
///
/// ```json
/// { "servers": ["10.0.0.1", "10.0.0.2"], "port": 8080, "user": "u", "passwd": "p" }
/// ```
#[derive(Debug, Deserialize)]
pub struct ProxyFile {
    pub servers: Vec<String>,
    pub port: u16,
    pub user: Option<String>,
    pub passwd: Option<String>,
}

impl ProxyFile {
    /// Pick one server at random and build the proxy URL used for both http
    /// and https. Credentials are embedded only when user and password are
    /// both present.
    pub fn choose_url(&self) -> Option<String> {
        let server = self.servers.choose(&mut rand::rng())?;
        let url = match (&self.user, &self.passwd) {
            (Some(user), Some(passwd)) => {
                format!("http://{}:{}@{}:{}", user, passwd, server, self.port)
            }
            _ => format!("http://{}:{}", server, self.port),
        };
        Some(url)
    }
}

/// Load the proxy file and choose a proxy URL.
///
/// A missing file means a direct connection. A file that exists but cannot be
/// read or parsed is a configuration error.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_proxy(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        warn!("Proxy file not found; connecting directly");
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::Config(format!("cannot read {}: {e}", path.display())))?;
    let proxies: ProxyFile = serde_json::from_str(&text)
        .map_err(|e| CatalogError::Config(format!("invalid proxy file {}: {e}", path.display())))?;
    let chosen = proxies.choose_url();
    match &chosen {
        Some(_) => info!(servers = proxies.servers.len(), "Selected proxy server"),
        None => warn!("Proxy file lists no servers; connecting directly"),
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_canonical_group_name() {
        assert_eq!(canonical_group_name("r1"), Some("ran1"));
        assert_eq!(canonical_group_name(" R4 "), Some("ran4"));
        assert_eq!(canonical_group_name("s2"), None);
    }

    #[test]
    fn test_proxy_url_with_credentials() {
        let p = ProxyFile {
            servers: vec!["10.0.0.1".to_string()],
            port: 8080,
            user: Some("u".to_string()),
            passwd: Some("p".to_string()),
        };
        assert_eq!(p.choose_url().as_deref(), Some("http://u:p@10.0.0.1:8080"));
    }

    #[test]
    fn test_proxy_url_needs_both_credentials() {
        let p = ProxyFile {
            servers: vec!["proxy.local".to_string()],
            port: 3128,
            user: Some("u".to_string()),
            passwd: None,
        };
        assert_eq!(p.choose_url().as_deref(), Some("http://proxy.local:3128"));
    }

    #[test]
    fn test_proxy_choose_from_empty_list() {
        let p = ProxyFile {
            servers: vec![],
            port: 1,
            user: None,
            passwd: None,
        };
        assert!(p.choose_url().is_none());
    }

    #[test]
    fn test_load_proxy_missing_file_is_direct() {
        let dir = tempfile::tempdir().unwrap();
        let res = load_proxy(&dir.path().join("nope.json")).unwrap();
        assert!(res.is_none());
    }

    #[test]
    fn test_load_proxy_invalid_file_is_config_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        let err = load_proxy(f.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_load_proxy_picks_listed_server() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"servers": ["a", "b"], "port": 80}}"#).unwrap();
        let url = load_proxy(f.path()).unwrap().unwrap();
        assert!(url == "http://a:80" || url == "http://b:80");
    }

    #[test]
    fn test_config_rejects_bad_base_url() {
        assert!(CatalogConfig::new("not a url", "cache", 3).is_err());
        let cfg = CatalogConfig::new(DEFAULT_BASE_URL, "cache", 3).unwrap();
        assert_eq!(cfg.base_url.as_str(), "http://www.3gpp.org/");
    }
}
