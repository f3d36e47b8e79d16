use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use showdown_teams::catalog::{PokeApiClient, SpeciesCatalog};
use showdown_teams::config::AppConfig;
use showdown_teams::fetch::Fetcher;
use showdown_teams::replays::ShowdownClient;
use showdown_teams::scrape::{run_scrape, ScrapeConfig};

#[derive(Parser)]
#[command(name = "showdown-teams")]
#[command(about = "Build a team dataset from Pokémon Showdown replays")]
#[command(version)]
struct Cli {
    /// Format identifier to search (e.g. gen9ou)
    #[arg(long, default_value = "gen9ou")]
    format: String,

    /// Maximum search pages to walk
    #[arg(long, default_value_t = 25)]
    pages: u32,

    /// Maximum replays to process
    #[arg(long, default_value_t = 400)]
    max_replays: usize,

    /// Species stats CSV
    #[arg(long, default_value = "data/pokemon_base_pokeapi.csv")]
    base_stats: PathBuf,

    /// Output file (.csv or .jsonl)
    #[arg(long, default_value = "data/pokemon_showdown_teams.csv")]
    output: PathBuf,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    showdown_teams::init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.log_level),
        cli.json_logs,
    );
    info!("Starting showdown-teams v{}", env!("CARGO_PKG_VERSION"));

    let species_api = PokeApiClient::new(
        Fetcher::new(config.pokeapi_fetcher())?,
        &config.pokeapi.base_url,
    );
    let mut catalog =
        SpeciesCatalog::from_csv_path(&cli.base_stats, config.name_tables(), Arc::new(species_api))
            .with_context(|| format!("loading species table {}", cli.base_stats.display()))?;
    info!(
        "Catalog ready: {} local species, {} name overrides",
        catalog.local_len(),
        catalog.names().override_count()
    );

    let replay_fetcher = Fetcher::new(config.showdown_fetcher())?;
    let search_fetcher =
        replay_fetcher.with_request_delay(Duration::from_millis(config.showdown.page_delay_ms));
    let source = ShowdownClient::new(search_fetcher, replay_fetcher, &config.showdown.base_url);

    let scrape = ScrapeConfig {
        format: cli.format,
        max_pages: cli.pages,
        max_replays: cli.max_replays,
        output: cli.output,
    };
    info!(
        "Scraping up to {} {} replays over {} pages",
        scrape.max_replays, scrape.format, scrape.max_pages
    );

    let summary = run_scrape(&source, &mut catalog, &scrape).await?;
    info!(
        "Done: {} rows from {} replays ({} download failures, {} unparsed, {} unresolved)",
        summary.rows,
        summary.replay_ids,
        summary.download_failures,
        summary.unparsed,
        summary.unresolved
    );

    Ok(())
}
