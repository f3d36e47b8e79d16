//! Species catalog: the local stats table plus on-demand remote lookups.
//!
//! Resolution order for a display name:
//! 1. normalize and apply overrides (`NameTables::resolve`)
//! 2. local table
//! 3. species fetched earlier in this run
//! 4. remote lookup, with one variant retry on a 404
//!
//! All caches belong to the `SpeciesCatalog` value and are only touched
//! through `&mut self`, so each slug has a single writer.

pub mod api;
pub mod download;
pub mod file;
#[cfg(test)]
pub(crate) mod testing;
pub mod variant;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{SpeciesStats, TeamAggregate};
use crate::names::NameTables;

pub use api::{PokeApiClient, PokemonDetail, SpeciesApi, SpeciesFamily};
pub use download::download_species;
pub use file::{load_species_csv, read_species, save_species_csv, CatalogRow};
pub use variant::VariantResolver;

/// Errors that can occur while loading or writing the species table.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to open species file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Species statistics keyed by slug, lazily extended from a remote API.
pub struct SpeciesCatalog {
    local: HashMap<String, SpeciesStats>,
    fetched: HashMap<String, SpeciesStats>,
    variants: VariantResolver,
    names: NameTables,
    api: Arc<dyn SpeciesApi>,
}

impl SpeciesCatalog {
    /// Build a catalog over an in-memory table. Later duplicates win.
    pub fn new<I>(local: I, names: NameTables, api: Arc<dyn SpeciesApi>) -> Self
    where
        I: IntoIterator<Item = SpeciesStats>,
    {
        let local = local.into_iter().map(|s| (s.name.clone(), s)).collect();
        Self {
            local,
            fetched: HashMap::new(),
            variants: VariantResolver::new(),
            names,
            api,
        }
    }

    /// Build a catalog from the species CSV file.
    pub fn from_csv_path(
        path: &Path,
        names: NameTables,
        api: Arc<dyn SpeciesApi>,
    ) -> Result<Self, CatalogError> {
        Ok(Self::new(load_species_csv(path)?, names, api))
    }

    pub fn names(&self) -> &NameTables {
        &self.names
    }

    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Number of species fetched remotely during this run.
    pub fn fetched_len(&self) -> usize {
        self.fetched.len()
    }

    /// Resolve a display name to its species stats.
    ///
    /// Remote failures are logged and reported as `None`; nothing is retried
    /// beyond the single variant attempt after a 404.
    pub async fn get(&mut self, display_name: &str) -> Option<SpeciesStats> {
        let slug = self.names.resolve(display_name);
        if slug.is_empty() {
            debug!("Name {:?} normalizes to an empty slug", display_name);
            return None;
        }

        if let Some(hit) = self.cached(&slug) {
            return Some(hit.clone());
        }

        match self.api.pokemon(&slug).await {
            Ok(detail) => Some(self.remember(slug, detail.stats)),
            Err(e) if e.is_not_found() => self.get_variant(display_name, &slug).await,
            Err(e) => {
                warn!("Lookup of {} ({}) failed: {}", display_name, slug, e);
                None
            }
        }
    }

    /// Aggregate a roster; `None` unless every member resolves.
    pub async fn team_aggregate(&mut self, roster: &[String]) -> Option<TeamAggregate> {
        let mut members = Vec::with_capacity(roster.len());
        for name in roster {
            match self.get(name).await {
                Some(stats) => members.push(stats),
                None => {
                    debug!("Unresolved team member {}", name);
                    return None;
                }
            }
        }
        TeamAggregate::from_members(&members)
    }

    async fn get_variant(&mut self, display_name: &str, slug: &str) -> Option<SpeciesStats> {
        let variant = self.variants.resolve(self.api.as_ref(), slug).await;
        let variant = match variant {
            Some(v) if v != slug => v,
            _ => {
                warn!("No variant found for {} ({})", display_name, slug);
                return None;
            }
        };

        if let Some(hit) = self.cached(&variant) {
            return Some(hit.clone());
        }

        debug!("Retrying {} as variant {}", display_name, variant);
        match self.api.pokemon(&variant).await {
            Ok(detail) => Some(self.remember(variant, detail.stats)),
            Err(e) => {
                warn!("Variant {} for {} also failed: {}", variant, display_name, e);
                None
            }
        }
    }

    fn cached(&self, slug: &str) -> Option<&SpeciesStats> {
        self.local.get(slug).or_else(|| self.fetched.get(slug))
    }

    fn remember(&mut self, slug: String, stats: SpeciesStats) -> SpeciesStats {
        self.fetched.insert(slug, stats.clone());
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::api::{NamedResource, Variety};
    use super::testing::{species, MockSpeciesApi};
    use super::*;

    fn family(name: &str, varieties: &[(&str, bool)]) -> SpeciesFamily {
        SpeciesFamily {
            name: name.to_string(),
            varieties: varieties
                .iter()
                .map(|(n, d)| Variety {
                    is_default: *d,
                    pokemon: NamedResource {
                        name: n.to_string(),
                        url: String::new(),
                    },
                })
                .collect(),
        }
    }

    fn catalog(local: Vec<SpeciesStats>, api: Arc<MockSpeciesApi>) -> SpeciesCatalog {
        SpeciesCatalog::new(local, NameTables::default(), api)
    }

    #[tokio::test]
    async fn test_local_hit_makes_no_remote_call() {
        let api = Arc::new(MockSpeciesApi::new());
        let mut catalog = catalog(
            vec![species("great-tusk", 100.0), species("flutter-mane", 80.0)],
            api.clone(),
        );

        let hit = catalog.get("Great Tusk").await.unwrap();
        assert_eq!(hit.name, "great-tusk");
        assert!(catalog.get("Flutter Mane").await.is_some());
        assert_eq!(api.pokemon_calls(), 0);
        assert_eq!(api.family_calls(), 0);
    }

    #[tokio::test]
    async fn test_override_applied_before_local_lookup() {
        let api = Arc::new(MockSpeciesApi::new());
        let mut catalog = catalog(vec![species("landorus-incarnate", 90.0)], api.clone());

        assert!(catalog.get("Landorus").await.is_some());
        assert_eq!(api.pokemon_calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_result_is_cached() {
        let api = Arc::new(MockSpeciesApi::new().with_pokemon(species("kingambit", 100.0)));
        let mut catalog = catalog(Vec::new(), api.clone());

        assert!(catalog.get("Kingambit").await.is_some());
        assert!(catalog.get("kingambit").await.is_some());
        assert_eq!(api.pokemon_calls(), 1);
        assert_eq!(catalog.fetched_len(), 1);
    }

    #[tokio::test]
    async fn test_remote_form_found_without_variant_lookup() {
        let api = Arc::new(
            MockSpeciesApi::new()
                .with_pokemon(species("samurott-hisui", 90.0))
                .with_family(family(
                    "samurott",
                    &[("samurott", true), ("samurott-hisui", false)],
                )),
        );
        let mut catalog = catalog(Vec::new(), api.clone());

        let hit = catalog.get("Samurott-Hisui").await.unwrap();
        assert_eq!(hit.name, "samurott-hisui");
        assert_eq!(api.pokemon_calls(), 1);
        assert_eq!(api.family_calls(), 0);
    }

    #[tokio::test]
    async fn test_not_found_falls_back_to_default_variety() {
        let api = Arc::new(
            MockSpeciesApi::new()
                .with_pokemon(species("mimikyu-disguised", 55.0))
                .with_family(family(
                    "mimikyu",
                    &[("mimikyu-disguised", true), ("mimikyu-busted", false)],
                )),
        );
        let tables = NameTables::new(Vec::new(), Vec::new());
        let mut catalog = SpeciesCatalog::new(Vec::new(), tables, api.clone());

        let hit = catalog.get("Mimikyu").await.unwrap();
        assert_eq!(hit.name, "mimikyu-disguised");
        assert_eq!(api.requested(), vec!["mimikyu", "mimikyu-disguised"]);
    }

    #[tokio::test]
    async fn test_variant_retry_uses_matched_variety() {
        let api = Arc::new(
            MockSpeciesApi::new()
                .with_pokemon(species("toxtricity-low-key", 75.0))
                .with_family(family(
                    "toxtricity",
                    &[("toxtricity-amped", true), ("toxtricity-low-key", false)],
                )),
        );
        let mut catalog = catalog(Vec::new(), api.clone());

        let hit = catalog.get("Toxtricity-Low").await.unwrap();
        assert_eq!(hit.name, "toxtricity-low-key");
        assert_eq!(api.requested(), vec!["toxtricity-low", "toxtricity-low-key"]);

        // second lookup of the variant slug itself is a cache hit
        assert!(catalog.get("toxtricity-low-key").await.is_some());
        assert_eq!(api.pokemon_calls(), 2);
    }

    #[tokio::test]
    async fn test_variant_same_as_slug_is_not_found() {
        let api = Arc::new(
            MockSpeciesApi::new().with_family(family("ghost", &[("ghost-x", false)])),
        );
        let mut catalog = catalog(Vec::new(), api.clone());

        assert!(catalog.get("Ghost-X").await.is_none());
        assert_eq!(api.pokemon_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_variant_retry_is_not_found() {
        let api = Arc::new(MockSpeciesApi::new().with_family(family(
            "ogerpon",
            &[("ogerpon", true), ("ogerpon-tera-mask", false)],
        )));
        let mut catalog = catalog(Vec::new(), api.clone());

        assert!(catalog.get("Ogerpon-Tera").await.is_none());
        assert_eq!(api.requested(), vec!["ogerpon-tera", "ogerpon-tera-mask"]);
    }

    #[tokio::test]
    async fn test_server_error_skips_variant_resolution() {
        let api = Arc::new(MockSpeciesApi::new().with_broken("gholdengo"));
        let mut catalog = catalog(Vec::new(), api.clone());

        assert!(catalog.get("Gholdengo").await.is_none());
        assert_eq!(api.pokemon_calls(), 1);
        assert_eq!(api.family_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_slug_never_hits_network() {
        let api = Arc::new(MockSpeciesApi::new());
        let mut catalog = catalog(Vec::new(), api.clone());

        assert!(catalog.get("???").await.is_none());
        assert_eq!(api.pokemon_calls(), 0);
    }

    #[tokio::test]
    async fn test_team_aggregate_all_resolved() {
        let api = Arc::new(MockSpeciesApi::new());
        let mut catalog = catalog(
            vec![species("a", 10.0), species("b", 20.0), species("c", 30.0)],
            api,
        );
        let roster = vec!["A".to_string(), "B".to_string(), "C".to_string()];

        let agg = catalog.team_aggregate(&roster).await.unwrap();
        assert_eq!(agg.size, 3);
        assert_eq!(agg.sum.hp, 60.0);
        assert_eq!(agg.mean.speed, 20.0);
    }

    #[tokio::test]
    async fn test_team_aggregate_unresolved_member() {
        let api = Arc::new(MockSpeciesApi::new());
        let mut catalog = catalog(vec![species("a", 10.0), species("b", 20.0)], api);
        let roster = vec!["A".to_string(), "Missingno".to_string(), "B".to_string()];

        assert!(catalog.team_aggregate(&roster).await.is_none());
    }

    #[tokio::test]
    async fn test_team_aggregate_empty_roster() {
        let api = Arc::new(MockSpeciesApi::new());
        let mut catalog = catalog(Vec::new(), api);
        assert!(catalog.team_aggregate(&[]).await.is_none());
    }
}
