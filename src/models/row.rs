//! Flat output record for the replay dataset.

use serde::{Deserialize, Serialize};

use super::{Slot, TeamAggregate};

/// One row per (replay, player slot).
///
/// Aggregate columns are spelled out instead of nested so the row
/// serializes directly as a CSV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub replay_id: String,
    pub format_id: Option<String>,
    pub player_slot: Slot,
    pub player_name: Option<String>,
    pub opponent_name: Option<String>,
    pub player_rating: Option<f64>,
    pub opponent_rating: Option<f64>,
    pub rating_diff: Option<f64>,
    pub turns: u32,
    pub team_size: usize,
    /// Roster joined with commas, in order of appearance
    pub team_pokemon: String,
    /// 1 when this slot won the battle
    pub won_battle: u8,

    pub sum_hp: f64,
    pub mean_hp: f64,
    pub sum_attack: f64,
    pub mean_attack: f64,
    pub sum_defense: f64,
    pub mean_defense: f64,
    pub sum_sp_attack: f64,
    pub mean_sp_attack: f64,
    pub sum_sp_defense: f64,
    pub mean_sp_defense: f64,
    pub sum_speed: f64,
    pub mean_speed: f64,
}

/// Identity and outcome columns of a row, before aggregates are attached.
#[derive(Debug, Clone)]
pub struct RowHeader {
    pub replay_id: String,
    pub format_id: Option<String>,
    pub player_slot: Slot,
    pub player_name: Option<String>,
    pub opponent_name: Option<String>,
    pub player_rating: Option<f64>,
    pub opponent_rating: Option<f64>,
    pub turns: u32,
    pub roster: Vec<String>,
    pub won: bool,
}

impl OutputRow {
    pub fn new(header: RowHeader, aggregate: &TeamAggregate) -> Self {
        let rating_diff = match (header.player_rating, header.opponent_rating) {
            (Some(own), Some(opp)) => Some(own - opp),
            _ => None,
        };
        let (sum, mean) = (&aggregate.sum, &aggregate.mean);

        Self {
            replay_id: header.replay_id,
            format_id: header.format_id,
            player_slot: header.player_slot,
            player_name: header.player_name,
            opponent_name: header.opponent_name,
            player_rating: header.player_rating,
            opponent_rating: header.opponent_rating,
            rating_diff,
            turns: header.turns,
            team_size: header.roster.len(),
            team_pokemon: header.roster.join(","),
            won_battle: u8::from(header.won),
            sum_hp: sum.hp,
            mean_hp: mean.hp,
            sum_attack: sum.attack,
            mean_attack: mean.attack,
            sum_defense: sum.defense,
            mean_defense: mean.defense,
            sum_sp_attack: sum.sp_attack,
            mean_sp_attack: mean.sp_attack,
            sum_sp_defense: sum.sp_defense,
            mean_sp_defense: mean.sp_defense,
            sum_speed: sum.speed,
            mean_speed: mean.speed,
        }
    }
}
