//! # Tdoc Catalog
//!
//! Builds a local, queryable catalog of 3GPP working groups, their meetings
//! and the documents ("Tdocs") of each meeting by scraping the public site.
//!
//! ## Usage
//!
//! ```sh
//! tdoc_catalog groups
//! tdoc_catalog meetings r1
//! tdoc_catalog tdocs R1-96 --format json
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: [`fetcher`] retrieves page text, one request at a time
//! 2. **Extraction**: [`scrapers`] walk the navigation menu, the dynamic data
//!    tables and the FTP directory listings
//! 3. **Normalization**: [`normalize`] turns raw rows into typed records and
//!    joins Tdoc lists with FTP listings
//! 4. **Caching**: [`catalog`] decides per resource and key whether to trust
//!    the [`cache`] or fetch again
//! 5. **Output**: [`outputs`] prints a table or JSON

use clap::Parser;
use serde::Serialize;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cache;
mod catalog;
mod cli;
mod config;
mod error;
mod fetcher;
mod models;
mod normalize;
mod outputs;
mod scrapers;
mod search;
mod utils;

use catalog::Catalog;
use cli::{Cli, Command, Format, SearchKind};
use config::{CatalogConfig, load_proxy};
use fetcher::{HttpFetcher, PageFetcher};
use models::Record;
use outputs::{json, table};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_dir(&args.cache_dir).await {
        error!(
            path = %args.cache_dir.display(),
            error = %e,
            "Cache directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let proxy = match &args.proxy_file {
        Some(path) => load_proxy(path)?,
        None => None,
    };
    let fetcher = HttpFetcher::new(proxy.as_deref())?;
    let config = CatalogConfig::new(&args.base_url, args.cache_dir.clone(), args.max_redirects)?;
    let catalog = Catalog::new(fetcher, config);

    if let Err(e) = run(&catalog, &args).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(millis = elapsed.as_millis() as u64, "Execution complete");
    Ok(())
}

async fn run<F: PageFetcher>(catalog: &Catalog<F>, args: &Cli) -> Result<(), Box<dyn Error>> {
    let force = args.force_reload;
    match &args.command {
        Command::Groups => emit(&catalog.get_groups(force).await?, args).await,
        Command::MeetingUrl { group } => {
            println!("{}", catalog.get_group_meeting_url(group, force).await?);
            Ok(())
        }
        Command::Meetings { group } => {
            emit(&catalog.get_meetings(group, force).await?, args).await
        }
        Command::TdocList { meeting } => {
            emit(&catalog.get_tdoc_list(meeting, force).await?, args).await
        }
        Command::FtpList { meeting } => {
            emit(&catalog.get_ftp_list(meeting, force).await?, args).await
        }
        Command::Tdocs { meeting } => emit(&catalog.get_tdoc(meeting, force).await?, args).await,
        Command::Search {
            kind,
            value,
            key,
            column,
        } => {
            let column = column.as_deref();
            let need_key = || key.as_deref().ok_or("--key is required for this record kind");
            match kind {
                SearchKind::Groups => {
                    let rows = catalog.get_groups(force).await?;
                    emit_hits(&rows, value, column, args).await
                }
                SearchKind::Meetings => {
                    let rows = catalog.get_meetings(need_key()?, force).await?;
                    emit_hits(&rows, value, column, args).await
                }
                SearchKind::TdocList => {
                    let rows = catalog.get_tdoc_list(need_key()?, force).await?;
                    emit_hits(&rows, value, column, args).await
                }
                SearchKind::FtpList => {
                    let rows = catalog.get_ftp_list(need_key()?, force).await?;
                    emit_hits(&rows, value, column, args).await
                }
                SearchKind::Tdocs => {
                    let rows = catalog.get_tdoc(need_key()?, force).await?;
                    emit_hits(&rows, value, column, args).await
                }
            }
        }
    }
}

async fn emit_hits<T>(
    rows: &[T],
    value: &str,
    column: Option<&str>,
    args: &Cli,
) -> Result<(), Box<dyn Error>>
where
    T: Record + Serialize + Clone,
{
    let hits: Vec<T> = search::search(rows, value, column)?
        .into_iter()
        .cloned()
        .collect();
    info!(hits = hits.len(), %value, "Search complete");
    emit(&hits, args).await
}

/// Print `records` in the requested format and optionally write them as JSON.
async fn emit<T: Record + Serialize>(records: &[T], args: &Cli) -> Result<(), Box<dyn Error>> {
    match args.format {
        Format::Table => print!("{}", table::render(records)),
        Format::Json => println!("{}", json::to_json(records)?),
    }
    if let Some(path) = &args.output {
        json::write_records(records, path).await?;
    }
    Ok(())
}
