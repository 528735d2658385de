//! Cache-and-merge controller.
//!
//! [`Catalog`] answers the retrieval operations (`get_groups`, `get_meetings`,
//! `get_tdoc_list`, `get_ftp_list`, `get_tdoc`). For each `(kind, key)` it
//! either trusts the cached record set or fetches, extracts and persists a
//! new one:
//!
//! ```text
//! Unloaded ──cache entry, no force──▶ CacheHit ──▶ records
//!     │
//!     └─no entry / force_reload──▶ Fetching ──ok, non-empty──▶ Ready (saved)
//!                                     └──error──▶ Failed (cache untouched)
//! ```
//!
//! Resolution chains re-enter the same cycle for their dependencies: a
//! group's meetings need the groups table, a meeting's lists need the
//! group's meeting table. `force_reload` is passed down the chain.

use crate::cache::CacheStore;
use crate::config::{CatalogConfig, DYN_TABLE_ID, canonical_group_name};
use crate::error::{CatalogError, Result};
use crate::fetcher::PageFetcher;
use crate::models::{FtpEntry, Group, Meeting, Record, TdocListEntry, TdocRecord};
use crate::normalize;
use crate::scrapers::ftp::{self, ListingPage};
use crate::scrapers::groups::discover_groups;
use crate::scrapers::table::{RowExtractor, extract_table};
use scraper::Html;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tokio::sync::OnceCell;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Cache key of the groups table; there is only one.
const GROUPS_KEY: &str = "all";

pub struct Catalog<F> {
    fetcher: F,
    cache: CacheStore,
    config: CatalogConfig,
}

impl<F: PageFetcher> Catalog<F> {
    pub fn new(fetcher: F, config: CatalogConfig) -> Self {
        let cache = CacheStore::new(config.cache_root.clone());
        info!(
            base_url = %config.base_url,
            cache_root = %cache.root().display(),
            max_redirects = config.max_redirects,
            "Catalog ready"
        );
        Self {
            fetcher,
            cache,
            config,
        }
    }

    /// Groups discovered from the site navigation.
    ///
    /// # Errors
    ///
    /// [`CatalogError::PageFormat`] when the home page cannot be fetched, has
    /// no navigation container, or yields no group.
    #[instrument(level = "info", skip(self))]
    pub async fn get_groups(&self, force_reload: bool) -> Result<Vec<Group>> {
        self.resolve(GROUPS_KEY, force_reload, async {
            let url = self.config.base_url.as_str();
            let html = self.fetch_page(url).await?;
            let groups = discover_groups(&html, &self.config.base_url)?;
            if groups.is_empty() {
                return Err(CatalogError::page_format(url, "navigation lists no groups"));
            }
            Ok(groups)
        })
        .await
    }

    /// Full meeting list URL of a group given by short name (`r1`).
    #[instrument(level = "info", skip(self))]
    pub async fn get_group_meeting_url(&self, short_group_name: &str, force_reload: bool) -> Result<String> {
        let long_name = canonical_group_name(short_group_name).ok_or_else(|| {
            CatalogError::not_found(short_group_name, "unknown group short name")
        })?;
        let groups = self.get_groups(force_reload).await?;
        groups
            .into_iter()
            .find(|g| g.key() == long_name)
            .map(|g| g.url)
            .ok_or_else(|| {
                CatalogError::not_found(
                    short_group_name,
                    format!("group {long_name} is not listed on the site"),
                )
            })
    }

    /// Meetings of a group given by short name.
    #[instrument(level = "info", skip(self))]
    pub async fn get_meetings(&self, short_group_name: &str, force_reload: bool) -> Result<Vec<Meeting>> {
        let key = short_group_name.trim().to_lowercase();
        self.resolve(&key, force_reload, async {
            let url = self.get_group_meeting_url(&key, force_reload).await?;
            let html = self.fetch_page(&url).await?;
            let meetings = parse_meetings(&html, &url)?;
            if meetings.is_empty() {
                return Err(CatalogError::page_format(&url, "meeting table has no rows"));
            }
            Ok(meetings)
        })
        .await
    }

    /// Full Tdoc list of a meeting (`R1-96`).
    ///
    /// An empty list is returned as such and not cached.
    #[instrument(level = "info", skip(self))]
    pub async fn get_tdoc_list(&self, meeting_name: &str, force_reload: bool) -> Result<Vec<TdocListEntry>> {
        self.tdoc_list_with(meeting_name, force_reload, &OnceCell::new())
            .await
    }

    /// FTP directory listing of a meeting.
    ///
    /// An empty listing is returned as such and not cached.
    #[instrument(level = "info", skip(self))]
    pub async fn get_ftp_list(&self, meeting_name: &str, force_reload: bool) -> Result<Vec<FtpEntry>> {
        self.ftp_list_with(meeting_name, force_reload, &OnceCell::new())
            .await
    }

    /// Tdocs of a meeting: the Tdoc list joined with the FTP listing.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] naming the meeting when either side, or the
    /// join itself, is empty. No partial table is ever returned.
    #[instrument(level = "info", skip(self))]
    pub async fn get_tdoc(&self, meeting_name: &str, force_reload: bool) -> Result<Vec<TdocRecord>> {
        let not_found = |reason: &str| {
            CatalogError::not_found(
                meeting_name,
                format!("Tdocs cannot be found for meeting {meeting_name}: {reason}"),
            )
        };

        // Both lists share one meeting lookup.
        let meeting = OnceCell::new();
        let files = self
            .ftp_list_with(meeting_name, force_reload, &meeting)
            .await?;
        if files.is_empty() {
            return Err(not_found("FTP listing is empty"));
        }
        let list = self
            .tdoc_list_with(meeting_name, force_reload, &meeting)
            .await?;
        if list.is_empty() {
            return Err(not_found("Tdoc list is empty"));
        }

        let tdocs = normalize::join_tdocs(&list, &files);
        if tdocs.is_empty() {
            return Err(not_found("no document appears in both sources"));
        }
        info!(rows = tdocs.len(), "Built Tdoc table");
        Ok(tdocs)
    }

    /// Tdoc list resolution. `meeting` is filled by the first lookup that
    /// needs the meeting record and reused afterwards.
    async fn tdoc_list_with(
        &self,
        meeting_name: &str,
        force_reload: bool,
        meeting: &OnceCell<Meeting>,
    ) -> Result<Vec<TdocListEntry>> {
        let key = meeting_name.trim().to_lowercase();
        self.resolve(&key, force_reload, async {
            let meeting = meeting
                .get_or_try_init(|| self.find_meeting(meeting_name, force_reload))
                .await?;
            if meeting.full_list_url.is_empty() {
                return Err(CatalogError::not_found(
                    meeting_name,
                    "meeting has no full Tdoc list link",
                ));
            }
            let html = self.fetch_page(&meeting.full_list_url).await?;
            parse_tdoc_list(&html, &meeting.full_list_url, &meeting.meeting_id)
        })
        .await
    }

    async fn ftp_list_with(
        &self,
        meeting_name: &str,
        force_reload: bool,
        meeting: &OnceCell<Meeting>,
    ) -> Result<Vec<FtpEntry>> {
        let key = meeting_name.trim().to_lowercase();
        self.resolve(&key, force_reload, async {
            let meeting = meeting
                .get_or_try_init(|| self.find_meeting(meeting_name, force_reload))
                .await?;
            if meeting.files_url.is_empty() {
                return Err(CatalogError::not_found(meeting_name, "meeting has no files link"));
            }
            self.fetch_listing(&meeting.files_url, &meeting.meeting_id).await
        })
        .await
    }

    /// Meeting record for `R1-96`, looked up in the meetings of group `r1`.
    async fn find_meeting(&self, meeting_name: &str, force_reload: bool) -> Result<Meeting> {
        let key = meeting_name.trim().to_lowercase();
        let group = key.split('-').next().unwrap_or_default();
        if group.is_empty() || !key.contains('-') {
            return Err(CatalogError::not_found(
                meeting_name,
                "meeting names look like <group>-<number>",
            ));
        }
        let meetings = self.get_meetings(group, force_reload).await?;
        meetings
            .into_iter()
            .find(|m| m.key() == key)
            .ok_or_else(|| {
                CatalogError::not_found(meeting_name, format!("no such meeting in group {group}"))
            })
    }

    /// Fetch a directory listing, following "Zips" index pages up to
    /// `max_redirects` times.
    async fn fetch_listing(&self, files_url: &str, meeting: &str) -> Result<Vec<FtpEntry>> {
        let mut url = Url::parse(files_url)
            .map_err(|e| CatalogError::page_format(files_url, format!("invalid files url: {e}")))?;
        let mut redirects = 0usize;
        loop {
            let html = self.fetch_page(url.as_str()).await?;
            match ftp::parse_listing(&html, &url, meeting)? {
                ListingPage::Files(entries) => {
                    info!(rows = entries.len(), %url, "Parsed directory listing");
                    return Ok(entries);
                }
                ListingPage::Redirect(next) => {
                    redirects += 1;
                    if redirects > self.config.max_redirects {
                        return Err(CatalogError::page_format(
                            url.as_str(),
                            format!(
                                "more than {} Zips redirects",
                                self.config.max_redirects
                            ),
                        ));
                    }
                    url = next;
                }
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.fetcher
            .fetch(url)
            .await
            .map_err(|e| CatalogError::from_fetch(url, e))
    }

    /// Cache decision shared by every resource kind.
    ///
    /// `fetch` is only polled on a cache miss or forced reload. Non-empty
    /// results are persisted; a failed save is logged and the fetched records
    /// are still returned.
    async fn resolve<T, Fut>(&self, key: &str, force_reload: bool, fetch: Fut) -> Result<Vec<T>>
    where
        T: Record + Serialize + DeserializeOwned,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        if !force_reload {
            if let Some(records) = self.cache.load::<T>(key).await {
                info!(kind = %T::KIND, key, rows = records.len(), "Using cached records");
                return Ok(records);
            }
        }

        info!(kind = %T::KIND, key, force_reload, "Fetching records");
        let records = fetch.await?;
        if records.is_empty() {
            warn!(kind = %T::KIND, key, "Fetched an empty record set; not caching");
        } else if let Err(e) = self.cache.save(key, &records).await {
            error!(kind = %T::KIND, key, error = %e, "Failed to save cache entry");
        }
        Ok(records)
    }
}

/// Meetings from a group's meeting table page.
pub fn parse_meetings(html: &str, url: &str) -> Result<Vec<Meeting>> {
    let page_url = Url::parse(url)
        .map_err(|e| CatalogError::page_format(url, format!("invalid url: {e}")))?;
    let document = Html::parse_document(html);
    let table = extract_table(&document, DYN_TABLE_ID, url)?;
    let extractor = RowExtractor::new(&page_url, true);
    let rows: Vec<_> = table
        .rows
        .iter()
        .map(|row| extractor.extract_row(*row, &table.headers))
        .collect();
    Ok(normalize::meetings(&rows))
}

/// Tdoc list entries from a meeting's full list page.
pub fn parse_tdoc_list(html: &str, url: &str, meeting: &str) -> Result<Vec<TdocListEntry>> {
    let page_url = Url::parse(url)
        .map_err(|e| CatalogError::page_format(url, format!("invalid url: {e}")))?;
    let document = Html::parse_document(html);
    let table = extract_table(&document, DYN_TABLE_ID, url)?;
    let extractor = RowExtractor::new(&page_url, false);
    let rows: Vec<_> = table
        .rows
        .iter()
        .map(|row| extractor.extract_row(*row, &table.headers))
        .collect();
    Ok(normalize::tdoc_list(&rows, meeting))
}
