//! PokéAPI client.
//!
//! All PokéAPI specifics (endpoint paths, response shapes, stat names) live
//! in this module. The rest of the crate talks to it through `SpeciesApi`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::fetch::{endpoint, FetchError, Fetcher};
use crate::models::{BaseStats, SpeciesStats};

/// Remote species data source.
#[async_trait]
pub trait SpeciesApi: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Look up a single species or form by slug.
    async fn pokemon(&self, slug: &str) -> Result<PokemonDetail, FetchError>;

    /// Look up the species family (all varieties) for a base slug.
    async fn species_family(&self, slug: &str) -> Result<SpeciesFamily, FetchError>;
}

/// A species record plus the physical attributes the catalog file carries.
#[derive(Debug, Clone, PartialEq)]
pub struct PokemonDetail {
    pub stats: SpeciesStats,
    pub height: Option<u32>,
    pub weight: Option<u32>,
}

impl PokemonDetail {
    pub fn new(stats: SpeciesStats) -> Self {
        Self {
            stats,
            height: None,
            weight: None,
        }
    }
}

/// A species family as returned by the species endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeciesFamily {
    pub name: String,
    #[serde(default)]
    pub varieties: Vec<Variety>,
}

/// One variety (form) of a species.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Variety {
    #[serde(default)]
    pub is_default: bool,
    pub pokemon: NamedResource,
}

impl Variety {
    pub fn name(&self) -> &str {
        &self.pokemon.name
    }
}

/// `{name, url}` reference used throughout PokéAPI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Paginated resource listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub count: Option<u32>,
    pub results: Vec<NamedResource>,
}

// ── Raw response types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PokemonResponse {
    types: Vec<TypeSlot>,
    stats: Vec<StatEntry>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    weight: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct StatEntry {
    base_stat: f64,
    stat: NamedResource,
}

impl PokemonResponse {
    /// Convert into a fully populated record named `slug`.
    fn into_detail(self, slug: &str) -> Result<PokemonDetail, FetchError> {
        let stat = |key: &str| {
            self.stats
                .iter()
                .find(|s| s.stat.name == key)
                .map(|s| s.base_stat)
                .ok_or_else(|| FetchError::MissingField(format!("{}: stat {}", slug, key)))
        };

        let stats = BaseStats::new(
            stat("hp")?,
            stat("attack")?,
            stat("defense")?,
            stat("special-attack")?,
            stat("special-defense")?,
            stat("speed")?,
        );

        let mut types = self.types.iter().map(|t| t.kind.name.clone());
        let type1 = types
            .next()
            .ok_or_else(|| FetchError::MissingField(format!("{}: types", slug)))?;

        let mut species = SpeciesStats::new(slug, type1, stats);
        species.type2 = types.next();

        Ok(PokemonDetail {
            stats: species,
            height: self.height,
            weight: self.weight,
        })
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

/// PokéAPI v2 client.
pub struct PokeApiClient {
    fetcher: Fetcher,
    api_base: String,
}

impl PokeApiClient {
    pub fn new(fetcher: Fetcher, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { fetcher, api_base }
    }

    /// List the first `limit` Pokémon starting at `offset`.
    pub async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<ResourceList, FetchError> {
        let mut url = endpoint(&self.api_base, &["pokemon"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        self.fetcher.get_json(&url).await
    }
}

#[async_trait]
impl SpeciesApi for PokeApiClient {
    fn name(&self) -> &'static str {
        "pokeapi"
    }

    async fn pokemon(&self, slug: &str) -> Result<PokemonDetail, FetchError> {
        debug!("PokéAPI: looking up {}", slug);
        let url = endpoint(&self.api_base, &["pokemon", slug])?;
        let response: PokemonResponse = self.fetcher.get_json(&url).await?;
        response.into_detail(slug)
    }

    async fn species_family(&self, slug: &str) -> Result<SpeciesFamily, FetchError> {
        debug!("PokéAPI: looking up species family {}", slug);
        let url = endpoint(&self.api_base, &["pokemon-species", slug])?;
        self.fetcher.get_json(&url).await
    }
}
