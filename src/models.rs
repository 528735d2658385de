//! Record types for every resource kind the catalog produces.
//!
//! - [`Group`]: a working group and the URL of its full meeting list
//! - [`Meeting`]: one row of a group's meeting table
//! - [`TdocListEntry`]: one row of a meeting's full Tdoc list
//! - [`FtpEntry`]: one file of a meeting's FTP directory listing
//! - [`TdocRecord`]: a Tdoc list entry joined with its FTP entry
//!
//! Field names serialize under the column names declared by
//! [`ResourceKind::columns`], so cached files and JSON output carry the same
//! column set in the same order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for a tdoc range bound that could not be parsed.
pub const NO_TDOC: &str = "0";

/// The resource kinds the controller caches independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Groups,
    Meetings,
    TdocList,
    FtpList,
    Tdocs,
}

impl ResourceKind {
    /// Column order for this kind. Declared once; every record of the kind
    /// emits exactly this set.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Groups => &["Name", "Url"],
            Self::Meetings => &[
                "Meeting",
                "Title",
                "Town",
                "Start",
                "End",
                "StartTdoc",
                "EndTdoc",
                "FullList",
                "Files",
            ],
            Self::TdocList => &["Tdoc", "Title", "Source", "Meeting"],
            Self::FtpList => &["Tdoc", "FileName", "Meeting", "Href"],
            Self::Tdocs => &["Tdoc", "Title", "Meeting", "FileName", "Source", "Href"],
        }
    }

    /// Stable slug used in cache file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Groups => "groups",
            Self::Meetings => "meetings",
            Self::TdocList => "tdoc_list",
            Self::FtpList => "ftp_list",
            Self::Tdocs => "tdocs",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Common view over records: their kind and their values in column order.
pub trait Record {
    const KIND: ResourceKind;

    fn values(&self) -> Vec<&str>;

    /// Lower-cased lookup key.
    fn key(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Url")]
    pub url: String,
}

impl Record for Group {
    const KIND: ResourceKind = ResourceKind::Groups;

    fn values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.url.as_str()]
    }

    fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(rename = "Meeting")]
    pub meeting_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Town")]
    pub town: String,
    #[serde(rename = "Start")]
    pub start_date: String,
    #[serde(rename = "End")]
    pub end_date: String,
    #[serde(rename = "StartTdoc")]
    pub start_tdoc: String,
    #[serde(rename = "EndTdoc")]
    pub end_tdoc: String,
    /// Resolved URL of the meeting's full Tdoc list, or empty.
    #[serde(rename = "FullList")]
    pub full_list_url: String,
    /// Resolved URL of the meeting's FTP directory, or empty.
    #[serde(rename = "Files")]
    pub files_url: String,
}

impl Record for Meeting {
    const KIND: ResourceKind = ResourceKind::Meetings;

    fn values(&self) -> Vec<&str> {
        vec![
            self.meeting_id.as_str(),
            self.title.as_str(),
            self.town.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
            self.start_tdoc.as_str(),
            self.end_tdoc.as_str(),
            self.full_list_url.as_str(),
            self.files_url.as_str(),
        ]
    }

    fn key(&self) -> String {
        self.meeting_id.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TdocListEntry {
    #[serde(rename = "Tdoc")]
    pub tdoc_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Meeting")]
    pub meeting: String,
}

impl Record for TdocListEntry {
    const KIND: ResourceKind = ResourceKind::TdocList;

    fn values(&self) -> Vec<&str> {
        vec![
            self.tdoc_id.as_str(),
            self.title.as_str(),
            self.source.as_str(),
            self.meeting.as_str(),
        ]
    }

    fn key(&self) -> String {
        self.tdoc_id.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FtpEntry {
    #[serde(rename = "Tdoc")]
    pub tdoc_id: String,
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "Meeting")]
    pub meeting: String,
    #[serde(rename = "Href")]
    pub href: String,
}

impl Record for FtpEntry {
    const KIND: ResourceKind = ResourceKind::FtpList;

    fn values(&self) -> Vec<&str> {
        vec![
            self.tdoc_id.as_str(),
            self.file_name.as_str(),
            self.meeting.as_str(),
            self.href.as_str(),
        ]
    }

    fn key(&self) -> String {
        self.tdoc_id.to_lowercase()
    }
}

/// A Tdoc with both its descriptive fields and its file location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TdocRecord {
    #[serde(rename = "Tdoc")]
    pub tdoc: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Meeting")]
    pub meeting: String,
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Href")]
    pub href: String,
}

impl Record for TdocRecord {
    const KIND: ResourceKind = ResourceKind::Tdocs;

    fn values(&self) -> Vec<&str> {
        vec![
            self.tdoc.as_str(),
            self.title.as_str(),
            self.meeting.as_str(),
            self.file_name.as_str(),
            self.source.as_str(),
            self.href.as_str(),
        ]
    }

    fn key(&self) -> String {
        self.tdoc.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting() -> Meeting {
        Meeting {
            meeting_id: "R1-100".to_string(),
            title: "RAN1#100".to_string(),
            town: "Athens".to_string(),
            start_date: "2020-02-24".to_string(),
            end_date: "2020-02-28".to_string(),
            start_tdoc: "R1-2000001".to_string(),
            end_tdoc: "R1-2001999".to_string(),
            full_list_url: "http://www.3gpp.org/list".to_string(),
            files_url: "http://www.3gpp.org/ftp/files".to_string(),
        }
    }

    #[test]
    fn test_values_match_declared_columns() {
        assert_eq!(meeting().values().len(), ResourceKind::Meetings.columns().len());
        let g = Group {
            name: "ran1".to_string(),
            url: "http://x".to_string(),
        };
        assert_eq!(g.values().len(), ResourceKind::Groups.columns().len());
    }

    #[test]
    fn test_serialized_fields_are_exactly_the_columns() {
        let json = serde_json::to_value(meeting()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        let mut expected: Vec<&str> = ResourceKind::Meetings.columns().to_vec();
        // serde_json::Map is sorted without the preserve_order feature.
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_key_is_lower_case_display_is_not() {
        let m = meeting();
        assert_eq!(m.key(), "r1-100");
        assert_eq!(m.meeting_id, "R1-100");
    }
}
