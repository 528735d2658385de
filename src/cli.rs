//! Command-line interface definitions.
//!
//! Every retrieval operation of the catalog is a subcommand; the cache and
//! network settings are shared options that can also come from the
//! environment.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_CACHE_DIR, DEFAULT_MAX_REDIRECTS};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Working groups found in the site navigation
/// tdoc_catalog groups
///
/// # Meetings of RAN1, refreshed from the site
/// tdoc_catalog --force-reload meetings r1
///
/// # Tdocs of a meeting as JSON, also written to a file
/// tdoc_catalog --format json -o out/r1-96.json tdocs R1-96
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding cached record sets
    #[arg(short, long, env = "TDOC_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Root URL of the site
    #[arg(long, env = "TDOC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// JSON proxy file (`servers`, `port`, optional `user`/`passwd`)
    #[arg(short, long, env = "TDOC_PROXY_FILE")]
    pub proxy_file: Option<PathBuf>,

    /// Maximum number of "Zips" index pages followed for one listing
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Ignore cached entries and fetch again
    #[arg(short, long, global = true)]
    pub force_reload: bool,

    /// Also write the records as JSON to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Format printed to stdout
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List working groups and their meeting list URLs
    Groups,
    /// Print the full meeting list URL of a group (`r1`)
    MeetingUrl { group: String },
    /// List the meetings of a group (`r1`)
    Meetings { group: String },
    /// Full Tdoc list of a meeting (`R1-96`)
    TdocList { meeting: String },
    /// FTP directory listing of a meeting
    FtpList { meeting: String },
    /// Tdoc list joined with the FTP listing
    Tdocs { meeting: String },
    /// Case-insensitive search in one record set
    Search {
        kind: SearchKind,
        value: String,
        /// Group short name or meeting name the record set belongs to
        #[arg(long)]
        key: Option<String>,
        /// Restrict the search to one column
        #[arg(long)]
        column: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKind {
    Groups,
    Meetings,
    TdocList,
    FtpList,
    Tdocs,
}
