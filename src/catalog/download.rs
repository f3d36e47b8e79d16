//! Bulk species download for building the local table.

use tracing::{info, warn};

use super::api::SpeciesApi;
use super::file::CatalogRow;

/// Entries between progress log lines.
const PROGRESS_EVERY: usize = 50;

/// Download detail records for `slugs` in order. Failed lookups are logged
/// and left out.
pub async fn download_species(api: &dyn SpeciesApi, slugs: &[String]) -> Vec<CatalogRow> {
    let mut rows = Vec::with_capacity(slugs.len());

    for (index, slug) in slugs.iter().enumerate() {
        match api.pokemon(slug).await {
            Ok(detail) => rows.push(CatalogRow::from(detail)),
            Err(e) => warn!("{}: failed to download {}: {}", api.name(), slug, e),
        }

        let done = index + 1;
        if done % PROGRESS_EVERY == 0 {
            info!("Downloaded {}/{} species", done, slugs.len());
        }
    }

    rows
}
