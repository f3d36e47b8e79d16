//! Synthetic six-member teams scored by a noisy, non-linear power formula.
//!
//! Each team is six distinct species drawn uniformly from the catalog. The
//! label `strong_team` splits the dataset at the median noisy score, so the
//! two classes are balanced.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::{Normal, NormalError};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{BaseStats, SpeciesStats, TeamAggregate};

/// Members per synthetic team.
pub const TEAM_SIZE: usize = 6;

/// Standard deviation of the score noise.
pub const NOISE_STD_DEV: f64 = 20.0;

#[derive(Debug, Error)]
pub enum SyntheticError {
    #[error("At least 6 species are required for a team, found {found}")]
    TooFewSpecies { found: usize },

    #[error("Invalid noise distribution: {0}")]
    Noise(#[from] NormalError),
}

/// One generated team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticTeamRow {
    pub p1_name: String,
    pub p2_name: String,
    pub p3_name: String,
    pub p4_name: String,
    pub p5_name: String,
    pub p6_name: String,

    pub sum_hp: f64,
    pub sum_attack: f64,
    pub sum_defense: f64,
    pub sum_sp_attack: f64,
    pub sum_sp_defense: f64,
    pub sum_speed: f64,

    pub mean_hp: f64,
    pub mean_attack: f64,
    pub mean_defense: f64,
    pub mean_sp_attack: f64,
    pub mean_sp_defense: f64,
    pub mean_speed: f64,

    /// Power score plus noise
    pub team_power_score: f64,

    /// 1 when the score is at or above the dataset median
    pub strong_team: u8,
}

impl SyntheticTeamRow {
    fn new(names: [String; TEAM_SIZE], aggregate: &TeamAggregate, score: f64) -> Self {
        let [p1_name, p2_name, p3_name, p4_name, p5_name, p6_name] = names;
        let (sum, mean) = (&aggregate.sum, &aggregate.mean);

        Self {
            p1_name,
            p2_name,
            p3_name,
            p4_name,
            p5_name,
            p6_name,
            sum_hp: sum.hp,
            sum_attack: sum.attack,
            sum_defense: sum.defense,
            sum_sp_attack: sum.sp_attack,
            sum_sp_defense: sum.sp_defense,
            sum_speed: sum.speed,
            mean_hp: mean.hp,
            mean_attack: mean.attack,
            mean_defense: mean.defense,
            mean_sp_attack: mean.sp_attack,
            mean_sp_defense: mean.sp_defense,
            mean_speed: mean.speed,
            team_power_score: score,
            strong_team: 0,
        }
    }
}

/// Noise-free team strength from summed base stats.
///
/// Attack grows slightly superlinearly, speed interacts with special attack,
/// and bulk has diminishing returns.
pub fn power_score(sum: &BaseStats) -> f64 {
    let attack_term = sum.attack.powf(1.1);
    let speed_term = (sum.speed * sum.sp_attack + 1.0).sqrt();
    let bulk_term = (sum.defense + sum.sp_defense + 0.5 * sum.hp).ln_1p();

    0.40 * attack_term + 0.35 * speed_term + 0.25 * bulk_term
}

/// Median of a non-empty slice; the mean of the two middle values when the
/// length is even.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Draw `samples` teams from `species` with a reproducible RNG.
pub fn generate_teams(
    species: &[SpeciesStats],
    samples: usize,
    seed: u64,
) -> Result<Vec<SyntheticTeamRow>, SyntheticError> {
    if species.len() < TEAM_SIZE {
        return Err(SyntheticError::TooFewSpecies {
            found: species.len(),
        });
    }

    let mut rng = Pcg64::seed_from_u64(seed);
    let noise = Normal::new(0.0, NOISE_STD_DEV)?;
    let mut rows = Vec::with_capacity(samples);

    for _ in 0..samples {
        let members: Vec<SpeciesStats> = index::sample(&mut rng, species.len(), TEAM_SIZE)
            .into_iter()
            .map(|i| species[i].clone())
            .collect();
        let Some(aggregate) = TeamAggregate::from_members(&members) else {
            continue;
        };

        let names: [String; TEAM_SIZE] = std::array::from_fn(|i| members[i].name.clone());
        let score = power_score(&aggregate.sum) + rng.sample(noise);
        rows.push(SyntheticTeamRow::new(names, &aggregate, score));
    }

    let scores: Vec<f64> = rows.iter().map(|r| r.team_power_score).collect();
    if let Some(threshold) = median(&scores) {
        for row in &mut rows {
            row.strong_team = u8::from(row.team_power_score >= threshold);
        }
        info!(
            "Generated {} synthetic teams, median score {:.2}",
            rows.len(),
            threshold
        );
    }

    Ok(rows)
}
