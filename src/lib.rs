//! # Showdown Teams
//!
//! Builds Pokémon team datasets from PokéAPI base stats and Pokémon Showdown
//! battle replays.
//!
//! ## Architecture
//!
//! - **names**: Display name to slug normalization
//! - **catalog**: Species statistics, local table plus remote lookups
//! - **replays**: Replay search, download and battle log parsing
//! - **dataset**: Per-replay rows and synthetic teams
//! - **scrape**: End-to-end scrape orchestration
//! - **storage**: CSV and JSON Lines output
//! - **fetch**: Throttled, cached HTTP client
//! - **config**: Configuration loading and validation

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod fetch;
pub mod models;
pub mod names;
pub mod replays;
pub mod scrape;
pub mod storage;

pub use models::*;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}
