use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use showdown_teams::catalog::load_species_csv;
use showdown_teams::dataset::generate_teams;
use showdown_teams::storage::write_records;

#[derive(Parser)]
#[command(name = "generate-teams")]
#[command(about = "Generate a labelled dataset of random six-member teams")]
#[command(version)]
struct Cli {
    /// Species stats CSV
    #[arg(long, default_value = "data/pokemon_base_pokeapi.csv")]
    base_stats: PathBuf,

    /// Output file (.csv or .jsonl)
    #[arg(long, default_value = "data/pokemon_teams_100k.csv")]
    output: PathBuf,

    /// Number of teams to generate
    #[arg(long, default_value_t = 100_000)]
    samples: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    showdown_teams::init_tracing(&cli.log_level, cli.json_logs);

    let species = load_species_csv(&cli.base_stats)
        .with_context(|| format!("loading species table {}", cli.base_stats.display()))?;
    info!("{} species available", species.len());

    let rows = generate_teams(&species, cli.samples, cli.seed)?;
    write_records(&cli.output, &rows)?;
    info!("Saved {} teams to {}", rows.len(), cli.output.display());

    Ok(())
}
