//! Scrape orchestrator.
//!
//! Drives one run end to end:
//! 1. Collect replay ids from the search feed
//! 2. Download and parse each replay
//! 3. Resolve both rosters and build rows
//! 4. Write the dataset

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::SpeciesCatalog;
use crate::dataset::build_rows;
use crate::fetch::FetchError;
use crate::models::OutputRow;
use crate::replays::{parse_log, ReplaySource};
use crate::storage::{write_records, StorageError};

/// Replays between progress log lines.
const PROGRESS_EVERY: usize = 25;

/// Errors that abort a scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("No rows produced from {replays} replays")]
    NoRows { replays: usize },
}

/// What to scrape and where to put it.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Format identifier (e.g. "gen9ou")
    pub format: String,

    /// Maximum search pages to walk
    pub max_pages: u32,

    /// Maximum replays to collect
    pub max_replays: usize,

    /// Output file; `.jsonl` selects JSON Lines, anything else CSV
    pub output: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            format: "gen9ou".to_string(),
            max_pages: 25,
            max_replays: 400,
            output: PathBuf::from("data/pokemon_showdown_teams.csv"),
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub replay_ids: usize,
    pub downloaded: usize,
    pub download_failures: usize,
    pub unparsed: usize,
    pub unresolved: usize,
    pub rows: usize,
}

/// Collect rows for every replay the source yields.
///
/// Replays that fail to download, parse, or resolve are skipped. A failing
/// search page aborts the run.
pub async fn collect_rows(
    source: &dyn ReplaySource,
    catalog: &mut SpeciesCatalog,
    config: &ScrapeConfig,
) -> Result<(Vec<OutputRow>, ScrapeSummary), ScrapeError> {
    let ids = source
        .collect_replay_ids(&config.format, config.max_replays, config.max_pages)
        .await?;

    let mut summary = ScrapeSummary {
        replay_ids: ids.len(),
        ..Default::default()
    };
    let mut rows = Vec::new();

    for (index, id) in ids.iter().enumerate() {
        if index > 0 && index % PROGRESS_EVERY == 0 {
            info!(
                "Processed {}/{} replays, {} rows so far",
                index,
                ids.len(),
                rows.len()
            );
        }

        let record = match source.fetch_replay(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to download replay {}: {}", id, e);
                summary.download_failures += 1;
                continue;
            }
        };
        summary.downloaded += 1;

        let parsed = match parse_log(&record.log) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Skipping replay {}: {}", id, e);
                summary.unparsed += 1;
                continue;
            }
        };

        let replay_rows = build_rows(&record, &parsed, catalog).await;
        if replay_rows.is_empty() {
            summary.unresolved += 1;
            continue;
        }
        rows.extend(replay_rows);
    }

    summary.rows = rows.len();
    info!(
        "Scraped {} rows from {} replays ({} species fetched remotely)",
        summary.rows,
        summary.replay_ids,
        catalog.fetched_len()
    );
    Ok((rows, summary))
}

/// Run a full scrape and write the dataset.
///
/// Nothing is written when no rows were produced.
pub async fn run_scrape(
    source: &dyn ReplaySource,
    catalog: &mut SpeciesCatalog,
    config: &ScrapeConfig,
) -> Result<ScrapeSummary, ScrapeError> {
    let (rows, summary) = collect_rows(source, catalog, config).await?;
    if rows.is_empty() {
        return Err(ScrapeError::NoRows {
            replays: summary.replay_ids,
        });
    }

    write_records(&config.output, &rows)?;
    info!("Saved {} rows to {}", rows.len(), config.output.display());
    Ok(summary)
}
