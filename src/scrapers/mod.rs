//! Page scrapers for the standards site.
//!
//! Each submodule understands one page type and returns raw or lightly shaped
//! records; caching and merging live in [`crate::catalog`].
//!
//! | Page | Module | Output |
//! |------|--------|--------|
//! | Home page navigation menu | [`groups`] | `Vec<Group>` |
//! | Meeting table / Tdoc full list | [`table`] | headers + `RawRow`s |
//! | FTP directory index | [`ftp`] | `Vec<FtpEntry>` or a "Zips" redirect |
//!
//! Traversal is written against [`node::PageNode`] rather than the parser
//! types directly.
//!
//! Common conventions:
//! - Malformed menu items and cells are skipped or defaulted, never fatal
//! - Structural absence (no `#nav`, no table, no header, no `<pre>`) is a
//!   [`CatalogError::PageFormat`](crate::error::CatalogError::PageFormat)
//! - Every returned record set is de-duplicated, first occurrence wins

pub mod ftp;
pub mod groups;
pub mod node;
pub mod table;

use itertools::Itertools;
use scraper::{ElementRef, Html};
use std::hash::Hash;

/// Element whose `id` attribute equals `id`.
pub fn element_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().id() == Some(id))
}

/// Drop rows identical across every column, keeping the first occurrence.
pub fn dedup<T: Clone + Eq + Hash>(rows: Vec<T>) -> Vec<T> {
    rows.into_iter().unique().collect()
}
