//! Dynamic data table extraction.
//!
//! Meeting lists and Tdoc lists are both rendered as a table with a stable id.
//! [`extract_table`] finds it and returns the header labels together with the
//! body rows as opaque handles; [`RowExtractor::extract_row`] decodes one row
//! into a `header -> value` map using per-column heuristics.

use crate::error::{CatalogError, Result};
use crate::models::NO_TDOC;
use crate::scrapers::node::PageNode;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use url::Url;

/// Field names written by the tdoc-range column.
pub const START_TDOC: &str = "StartTdoc";
pub const END_TDOC: &str = "EndTdoc";
pub const FULL_LIST: &str = "FullList";

/// Document number: group prefix, dash, digits (`R1-1900001`, `rp-190`).
static TDOC_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[a-z][a-z0-9]*-\d+").expect("valid tdoc regex"));

/// Raw field values of one row, keyed by header label.
pub type RawRow = BTreeMap<String, String>;

/// Header labels and body rows of a located table.
#[derive(Debug)]
pub struct Table<N> {
    /// One label per `th`, empty when the header cell has no text.
    pub headers: Vec<String>,
    pub rows: Vec<N>,
}

/// Locate the table with `table_id` in `document`.
///
/// # Errors
///
/// [`CatalogError::PageFormat`] when the table or its header section is
/// missing. A table with a header and no rows is a valid, empty result.
#[instrument(level = "debug", skip(document))]
pub fn extract_table<'a>(
    document: &'a Html,
    table_id: &str,
    url: &str,
) -> Result<Table<ElementRef<'a>>> {
    let table = super::element_by_id(document, table_id)
        .ok_or_else(|| CatalogError::page_format(url, format!("missing table #{table_id}")))?;
    table_parts(table).ok_or_else(|| {
        CatalogError::page_format(url, format!("table #{table_id} has no header section"))
    })
}

/// Split a table node into header labels and row handles; `None` without a
/// header section.
pub fn table_parts<'a, N: PageNode<'a>>(table: N) -> Option<Table<N>> {
    let thead = table.first_named("thead")?;
    let header_row = thead.first_named("tr")?;
    let headers = header_row
        .children()
        .into_iter()
        .filter(|c| c.tag_name().eq_ignore_ascii_case("th"))
        .map(|th| {
            th.text_fragments()
                .into_iter()
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_default()
        })
        .collect();
    let rows = table
        .first_named("tbody")
        .map(|tbody| tbody.descendants_named("tr"))
        .unwrap_or_default();
    Some(Table { headers, rows })
}

/// Decodes table rows.
#[derive(Debug, Clone)]
pub struct RowExtractor<'u> {
    /// URL the page was fetched from; relative links resolve against it.
    pub page_url: &'u Url,
    /// Treat headers containing "tdoc" as start/end range columns. Meeting
    /// tables want this; Tdoc lists, whose id column is also named "Tdoc",
    /// do not.
    pub tdoc_ranges: bool,
}

impl<'u> RowExtractor<'u> {
    pub fn new(page_url: &'u Url, tdoc_ranges: bool) -> Self {
        Self {
            page_url,
            tdoc_ranges,
        }
    }

    /// Decode one row. Cells are matched to headers by position; cells past
    /// the last header are ignored. Unrecognized cell shapes leave their field
    /// out of the map.
    pub fn extract_row<'a, N: PageNode<'a>>(&self, row: N, headers: &[String]) -> RawRow {
        let mut fields = RawRow::new();
        for (cell, header) in row.children_named("td").into_iter().zip(headers) {
            if header.is_empty() {
                continue;
            }
            let lower = header.to_lowercase();
            let links = cell.links();

            if self.tdoc_ranges && lower.contains("tdoc") {
                let (start, end, full) = self.tdoc_range(&links);
                fields.insert(START_TDOC.to_string(), start);
                fields.insert(END_TDOC.to_string(), end);
                fields.insert(FULL_LIST.to_string(), full);
            } else if links.len() == 1 {
                let value = if lower.contains("files") {
                    links[0]
                        .attr("href")
                        .map(|h| self.resolve(h))
                        .unwrap_or_default()
                } else {
                    links[0].text()
                };
                fields.insert(header.clone(), value);
            } else if links.is_empty() {
                if let Some(text) = cell.non_blank_text() {
                    fields.insert(header.clone(), text);
                }
            } else {
                debug!(%header, links = links.len(), "Skipping multi-link cell");
            }
        }
        fields
    }

    /// Start, end and full-list URL of a tdoc-range cell. Anything but a
    /// two-link cell, or numbers that do not parse, fall back to the
    /// sentinels; the full-list URL only needs the second link.
    fn tdoc_range<'a, N: PageNode<'a>>(&self, links: &[N]) -> (String, String, String) {
        let [first, second] = links else {
            return (NO_TDOC.to_string(), NO_TDOC.to_string(), String::new());
        };
        let full = second.attr("href").map(|h| self.resolve(h)).unwrap_or_default();

        let in_first = tdoc_numbers(&first.text());
        let (start, end) = match in_first.as_slice() {
            [s, e] => (s.clone(), e.clone()),
            [s] => match tdoc_numbers(&second.text()).as_slice() {
                [e] => (s.clone(), e.clone()),
                _ => (NO_TDOC.to_string(), NO_TDOC.to_string()),
            },
            _ => (NO_TDOC.to_string(), NO_TDOC.to_string()),
        };
        (start, end, full)
    }

    fn resolve(&self, href: &str) -> String {
        let href = href.trim();
        match self.page_url.join(href) {
            Ok(u) => u.to_string(),
            Err(_) => href.to_string(),
        }
    }
}

/// All document numbers in `text`.
pub fn tdoc_numbers(text: &str) -> Vec<String> {
    TDOC_NUMBER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
