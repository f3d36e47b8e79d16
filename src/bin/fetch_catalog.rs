use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use showdown_teams::catalog::{download_species, save_species_csv, PokeApiClient};
use showdown_teams::config::AppConfig;
use showdown_teams::fetch::Fetcher;

#[derive(Parser)]
#[command(name = "fetch-catalog")]
#[command(about = "Download base stats for the first N Pokémon from PokéAPI")]
#[command(version)]
struct Cli {
    /// Number of Pokémon to list
    #[arg(long, default_value_t = 1000)]
    limit: u32,

    /// Species stats CSV to write
    #[arg(long, default_value = "data/pokemon_base_pokeapi.csv")]
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

    let client = PokeApiClient::new(
        Fetcher::new(config.pokeapi_fetcher())?,
        &config.pokeapi.base_url,
    );

    let listing = client.list_pokemon(cli.limit, 0).await?;
    let slugs: Vec<String> = listing.results.into_iter().map(|r| r.name).collect();
    info!(
        "Listed {} of {} Pokémon",
        slugs.len(),
        listing.count.map_or_else(|| "?".to_string(), |c| c.to_string())
    );

    let rows = download_species(&client, &slugs).await;
    if rows.is_empty() {
        bail!("no species could be downloaded");
    }

    save_species_csv(&cli.output, &rows)?;
    info!("Saved {} of {} species", rows.len(), slugs.len());

    Ok(())
}
