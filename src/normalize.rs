//! Raw rows → typed, de-duplicated records.
//!
//! Extractors produce `header -> value` maps whose keys are whatever labels
//! the page used. Normalization matches those labels to the declared columns
//! of the resource kind (case-insensitively), fills anything missing with an
//! empty value and drops duplicate rows.

use crate::models::{FtpEntry, Meeting, NO_TDOC, TdocListEntry, TdocRecord};
use crate::scrapers::dedup;
use crate::scrapers::table::RawRow;
use std::collections::HashMap;
use tracing::debug;

/// Value of `column` in `row`, matching header labels case-insensitively.
fn field(row: &RawRow, column: &str) -> Option<String> {
    row.get(column).cloned().or_else(|| {
        row.iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(column))
            .map(|(_, v)| v.clone())
    })
}

pub fn meetings(rows: &[RawRow]) -> Vec<Meeting> {
    let records = rows
        .iter()
        .map(|row| {
            let get = |c: &str| field(row, c).unwrap_or_default();
            let tdoc = |c: &str| field(row, c).unwrap_or_else(|| NO_TDOC.to_string());
            Meeting {
                meeting_id: get("Meeting"),
                title: get("Title"),
                town: get("Town"),
                start_date: get("Start"),
                end_date: get("End"),
                start_tdoc: tdoc("StartTdoc"),
                end_tdoc: tdoc("EndTdoc"),
                full_list_url: get("FullList"),
                files_url: get("Files"),
            }
        })
        .filter(|m| !m.meeting_id.is_empty())
        .collect();
    dedup(records)
}

/// Tdoc list rows for `meeting`. Rows without a document id are dropped.
pub fn tdoc_list(rows: &[RawRow], meeting: &str) -> Vec<TdocListEntry> {
    let records = rows
        .iter()
        .map(|row| {
            let get = |c: &str| field(row, c).unwrap_or_default();
            TdocListEntry {
                tdoc_id: get("Tdoc"),
                title: get("Title"),
                source: get("Source"),
                meeting: meeting.to_string(),
            }
        })
        .filter(|t| !t.tdoc_id.is_empty())
        .collect();
    dedup(records)
}

/// Inner join on the lower-cased document id.
///
/// The FTP side decides file identity (`file_name`, `href`), the Tdoc list
/// decides the descriptive fields (`title`, `source`). Ids present on only one
/// side are dropped. A document with several files yields one record per file.
pub fn join_tdocs(list: &[TdocListEntry], files: &[FtpEntry]) -> Vec<TdocRecord> {
    let by_id: HashMap<String, &TdocListEntry> = list
        .iter()
        .rev()
        .map(|t| (t.tdoc_id.to_lowercase(), t))
        .collect();

    let joined: Vec<TdocRecord> = files
        .iter()
        .filter_map(|f| {
            let entry = by_id.get(&f.tdoc_id.to_lowercase())?;
            Some(TdocRecord {
                tdoc: entry.tdoc_id.clone(),
                title: entry.title.clone(),
                meeting: entry.meeting.clone(),
                file_name: f.file_name.clone(),
                source: entry.source.clone(),
                href: f.href.clone(),
            })
        })
        .collect();
    debug!(
        list = list.len(),
        files = files.len(),
        joined = joined.len(),
        "Joined Tdoc list with FTP listing"
    );
    dedup(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_meetings_fill_missing_fields() {
        let rows = vec![raw(&[("meeting", "R1-100"), ("Town", "Athens")])];
        let m = &meetings(&rows)[0];
        assert_eq!(m.meeting_id, "R1-100");
        assert_eq!(m.town, "Athens");
        assert_eq!(m.title, "");
        assert_eq!(m.start_tdoc, NO_TDOC);
        assert_eq!(m.files_url, "");
    }

    #[test]
    fn test_meetings_dedup_and_drop_idless_rows() {
        let row = raw(&[("Meeting", "R1-100"), ("Title", "RAN1#100")]);
        let rows = vec![row.clone(), raw(&[("Title", "no id")]), row];
        assert_eq!(meetings(&rows).len(), 1);
    }

    #[test]
    fn test_tdoc_list_ignores_unknown_headers() {
        let rows = vec![raw(&[("TDoc", "R1-1"), ("Extra", "x")])];
        assert_eq!(tdoc_list(&rows, "R1-96"), vec![TdocListEntry {
            tdoc_id: "R1-1".to_string(),
            title: String::new(),
            source: String::new(),
            meeting: "R1-96".to_string(),
        }]);
    }

    fn list_entry(id: &str, title: &str) -> TdocListEntry {
        TdocListEntry {
            tdoc_id: id.to_string(),
            title: title.to_string(),
            source: "Nokia".to_string(),
            meeting: "R1-96".to_string(),
        }
    }

    fn ftp_entry(id: &str, file: &str) -> FtpEntry {
        FtpEntry {
            tdoc_id: id.to_string(),
            file_name: file.to_string(),
            meeting: "R1-96".to_string(),
            href: format!("https://www.3gpp.org/ftp/{file}"),
        }
    }

    #[test]
    fn test_join_is_inner_and_case_insensitive() {
        let list = vec![list_entry("R1-1900001", "Agenda"), list_entry("R1-1900002", "Only listed")];
        let files = vec![ftp_entry("r1-1900001", "r1-1900001.zip"), ftp_entry("R1-1900003", "R1-1900003.zip")];
        let joined = join_tdocs(&list, &files);
        assert_eq!(
            joined,
            vec![TdocRecord {
                tdoc: "R1-1900001".to_string(),
                title: "Agenda".to_string(),
                meeting: "R1-96".to_string(),
                file_name: "r1-1900001.zip".to_string(),
                source: "Nokia".to_string(),
                href: "https://www.3gpp.org/ftp/r1-1900001.zip".to_string(),
            }]
        );
    }

    #[test]
    fn test_join_with_empty_side_is_empty() {
        assert!(join_tdocs(&[], &[ftp_entry("R1-1", "R1-1.zip")]).is_empty());
        assert!(join_tdocs(&[list_entry("R1-1", "t")], &[]).is_empty());
    }

    #[test]
    fn test_join_first_list_entry_wins_on_duplicate_ids() {
        let list = vec![list_entry("R1-1", "first"), list_entry("r1-1", "second")];
        let joined = join_tdocs(&list, &[ftp_entry("R1-1", "R1-1.zip")]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].title, "first");
    }
}
