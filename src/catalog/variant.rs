//! Variant (form) resolution for slugs the species endpoint doesn't know.
//!
//! Showdown names forms loosely ("Samurott-Hisui", "Ogerpon-Cornerstone"),
//! while PokéAPI only has the exact variety slugs ("samurott-hisui",
//! "ogerpon-cornerstone-mask"). When a lookup 404s we fetch the species family
//! of the base name and pick a variety by token containment.
//!
//! Containment is a heuristic: when two varieties share a substring of the
//! form token the first listed one wins, and multi-token forms only match on
//! their first token.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::api::{SpeciesApi, SpeciesFamily};

/// Resolves variety slugs, caching species families for the run.
#[derive(Debug, Default)]
pub struct VariantResolver {
    families: HashMap<String, SpeciesFamily>,
}

impl VariantResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of species families fetched so far.
    pub fn cached_families(&self) -> usize {
        self.families.len()
    }

    /// Find the variety slug that best matches `slug`.
    ///
    /// Returns `None` only when the family record cannot be obtained or lists
    /// no usable variety.
    pub async fn resolve(&mut self, api: &dyn SpeciesApi, slug: &str) -> Option<String> {
        let (base, _) = split_form(slug);
        if base.is_empty() {
            return None;
        }

        let family = self.family(api, base).await?;
        let variant = pick_variety(family, slug);
        debug!("Variant for {}: {:?}", slug, variant);
        variant
    }

    async fn family(&mut self, api: &dyn SpeciesApi, base: &str) -> Option<&SpeciesFamily> {
        if !self.families.contains_key(base) {
            match api.species_family(base).await {
                Ok(family) => {
                    self.families.insert(base.to_string(), family);
                }
                Err(e) => {
                    warn!("Could not load species family {} from {}: {}", base, api.name(), e);
                    return None;
                }
            }
        }
        self.families.get(base)
    }
}

/// Split a slug into its base species and first form token.
pub fn split_form(slug: &str) -> (&str, Option<&str>) {
    let mut parts = slug.split('-');
    let base = parts.next().unwrap_or_default();
    let form = parts.next().filter(|f| !f.is_empty());
    (base, form)
}

/// Pick a variety of `family` for `slug`.
///
/// First listed variety that equals the slug or contains the form token wins;
/// otherwise the default variety.
pub fn pick_variety(family: &SpeciesFamily, slug: &str) -> Option<String> {
    let (_, form) = split_form(slug);

    family
        .varieties
        .iter()
        .find(|v| v.name() == slug || form.is_some_and(|f| v.name().contains(f)))
        .or_else(|| family.varieties.iter().find(|v| v.is_default))
        .map(|v| v.name().to_string())
}
