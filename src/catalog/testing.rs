//! In-memory `SpeciesApi` for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::api::{PokemonDetail, SpeciesApi, SpeciesFamily};
use crate::fetch::FetchError;
use crate::models::{BaseStats, SpeciesStats};

/// Serves canned species and families; anything else is a 404.
#[derive(Default)]
pub struct MockSpeciesApi {
    pokemon: HashMap<String, SpeciesStats>,
    families: HashMap<String, SpeciesFamily>,
    broken: HashSet<String>,
    pokemon_calls: AtomicUsize,
    family_calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockSpeciesApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pokemon(mut self, stats: SpeciesStats) -> Self {
        self.pokemon.insert(stats.name.clone(), stats);
        self
    }

    pub fn with_family(mut self, family: SpeciesFamily) -> Self {
        self.families.insert(family.name.clone(), family);
        self
    }

    /// Make lookups of `slug` fail with a server error instead of a 404.
    pub fn with_broken(mut self, slug: &str) -> Self {
        self.broken.insert(slug.to_string());
        self
    }

    pub fn pokemon_calls(&self) -> usize {
        self.pokemon_calls.load(Ordering::SeqCst)
    }

    pub fn family_calls(&self) -> usize {
        self.family_calls.load(Ordering::SeqCst)
    }

    /// Slugs passed to `pokemon`, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn not_found() -> FetchError {
        FetchError::HttpStatus {
            status: 404,
            message: "Not Found".to_string(),
        }
    }

    fn server_error() -> FetchError {
        FetchError::HttpStatus {
            status: 500,
            message: "Internal Server Error".to_string(),
        }
    }
}

#[async_trait]
impl SpeciesApi for MockSpeciesApi {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn pokemon(&self, slug: &str) -> Result<PokemonDetail, FetchError> {
        self.pokemon_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(slug.to_string());
        }

        if self.broken.contains(slug) {
            return Err(Self::server_error());
        }
        self.pokemon
            .get(slug)
            .cloned()
            .map(PokemonDetail::new)
            .ok_or_else(Self::not_found)
    }

    async fn species_family(&self, slug: &str) -> Result<SpeciesFamily, FetchError> {
        self.family_calls.fetch_add(1, Ordering::SeqCst);
        self.families.get(slug).cloned().ok_or_else(Self::not_found)
    }
}

/// A species with flat stats, for building fixtures.
pub fn species(name: &str, value: f64) -> SpeciesStats {
    SpeciesStats::new(
        name,
        "normal",
        BaseStats::new(value, value, value, value, value, value),
    )
}
