//! FTP-style directory listing extraction.
//!
//! A meeting's "Files" link points at a plain directory index. Some of those
//! are themselves an index page whose real content sits behind a "Zips"
//! link; [`parse_listing`] reports which of the two it was given and the
//! controller follows the indirection through its fetcher.

use crate::error::{CatalogError, Result};
use crate::models::FtpEntry;
use crate::scrapers::dedup;
use crate::scrapers::node::PageNode;
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

/// Literal that marks an index page.
pub const ZIPS_MARKER: &str = "Zips";
const PARENT_MARKER: &str = "Parent";

/// What a directory page turned out to be.
#[derive(Debug, PartialEq, Eq)]
pub enum ListingPage {
    /// Index page; the listing lives at the resolved "Zips" target.
    Redirect(Url),
    /// Terminal listing.
    Files(Vec<FtpEntry>),
}

/// Classify and parse a directory page.
///
/// # Arguments
///
/// * `html` - Raw page text
/// * `page_url` - URL the page was fetched from
/// * `meeting` - Meeting id injected into each entry
///
/// # Errors
///
/// [`CatalogError::PageFormat`] when a terminal listing has no `<pre>` block.
#[instrument(level = "debug", skip(html, page_url), fields(page_url = %page_url))]
pub fn parse_listing(html: &str, page_url: &Url, meeting: &str) -> Result<ListingPage> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    if html.contains(ZIPS_MARKER) {
        if let Some(target) = zips_target(root, page_url) {
            debug!(%target, "Index page; following Zips link");
            return Ok(ListingPage::Redirect(target));
        }
        debug!("Zips marker without a usable link; reading as terminal listing");
    }

    let pre = root.first_named("pre").ok_or_else(|| {
        CatalogError::page_format(page_url.as_str(), "directory listing has no <pre> block")
    })?;
    Ok(ListingPage::Files(listing_entries(pre, page_url, meeting)))
}

fn zips_target<'a, N: PageNode<'a>>(root: N, page_url: &Url) -> Option<Url> {
    root.links()
        .into_iter()
        .filter(|a| a.text().contains(ZIPS_MARKER))
        .find_map(|a| a.attr("href").and_then(|h| page_url.join(h.trim()).ok()))
}

/// One [`FtpEntry`] per file anchor under `pre`.
pub fn listing_entries<'a, N: PageNode<'a>>(pre: N, page_url: &Url, meeting: &str) -> Vec<FtpEntry> {
    let mut entries = Vec::new();
    for a in pre.links() {
        let file_name = a.text();
        if file_name.contains(PARENT_MARKER) {
            continue;
        }
        let Some(tdoc_id) = tdoc_from_file_name(&file_name) else {
            debug!(%file_name, "Skipping entry without a document id");
            continue;
        };
        let Some(href) = a.attr("href") else {
            continue;
        };
        let href = page_url
            .join(href.trim())
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string());
        entries.push(FtpEntry {
            tdoc_id: tdoc_id.to_string(),
            file_name: file_name.clone(),
            meeting: meeting.to_string(),
            href,
        });
    }
    dedup(entries)
}

/// `R1-1900001.zip` → `R1-1900001`. Names without a `.`, or starting with one,
/// carry no document id.
pub fn tdoc_from_file_name(file_name: &str) -> Option<&str> {
    match file_name.split_once('.') {
        Some((stem, _)) if !stem.trim().is_empty() => Some(stem.trim()),
        _ => None,
    }
}
