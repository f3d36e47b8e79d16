//! Per-replay row building.

use tracing::debug;

use crate::catalog::SpeciesCatalog;
use crate::models::{BySlot, OutputRow, ParsedReplay, ReplayRecord, RowHeader, Slot, TeamAggregate};

/// Build the two output rows of a replay, resolving both rosters.
///
/// p1 is resolved before p2; a replay with any unresolved species yields
/// no rows.
pub async fn build_rows(
    record: &ReplayRecord,
    parsed: &ParsedReplay,
    catalog: &mut SpeciesCatalog,
) -> Vec<OutputRow> {
    let Some(p1) = catalog.team_aggregate(&parsed.teams.p1).await else {
        debug!("Replay {}: p1 roster not fully resolved", record.id);
        return Vec::new();
    };
    let Some(p2) = catalog.team_aggregate(&parsed.teams.p2).await else {
        debug!("Replay {}: p2 roster not fully resolved", record.id);
        return Vec::new();
    };

    assemble_rows(record, parsed, &BySlot { p1, p2 })
}

/// Combine a parsed replay with both slot aggregates into rows (p1, then p2).
pub fn assemble_rows(
    record: &ReplayRecord,
    parsed: &ParsedReplay,
    aggregates: &BySlot<TeamAggregate>,
) -> Vec<OutputRow> {
    Slot::ALL
        .iter()
        .map(|&slot| {
            let player = parsed.players.get(slot).as_ref();
            let opponent = parsed.players.get(slot.opponent()).as_ref();

            let header = RowHeader {
                replay_id: record.id.clone(),
                format_id: record.format_id.clone(),
                player_slot: slot,
                player_name: player.map(|p| p.name.clone()),
                opponent_name: opponent.map(|p| p.name.clone()),
                player_rating: player.and_then(|p| p.rating),
                opponent_rating: opponent.and_then(|p| p.rating),
                turns: parsed.turns,
                roster: parsed.teams.get(slot).clone(),
                won: parsed.winner == slot,
            };
            OutputRow::new(header, aggregates.get(slot))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{species, MockSpeciesApi};
    use crate::names::NameTables;
    use crate::replays::parse_log;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const LOG: &str = "\
|player|p1|Ash|ace-trainer|1523
|player|p2|Gary|rival|1490
|poke|p1|Alpha, L50|
|poke|p1|Beta, F|
|poke|p2|Gamma|
|poke|p2|Delta, M|
|turn|17
|win|Ash
";

    fn record() -> ReplayRecord {
        ReplayRecord {
            id: "gen9ou-42".to_string(),
            format_id: Some("gen9ou".to_string()),
            log: LOG.to_string(),
        }
    }

    fn catalog(local: Vec<crate::models::SpeciesStats>) -> (SpeciesCatalog, Arc<MockSpeciesApi>) {
        let api = Arc::new(MockSpeciesApi::new());
        (
            SpeciesCatalog::new(local, NameTables::default(), api.clone()),
            api,
        )
    }

    #[tokio::test]
    async fn test_two_rows_for_resolved_rosters() {
        let (mut catalog, api) = catalog(vec![
            species("alpha", 100.0),
            species("beta", 50.0),
            species("gamma", 80.0),
            species("delta", 60.0),
        ]);
        let record = record();
        let parsed = parse_log(&record.log).unwrap();

        let rows = build_rows(&record, &parsed, &mut catalog).await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().map(|r| r.won_battle as u32).sum::<u32>(), 1);
        assert_eq!(api.pokemon_calls(), 0);

        let (p1, p2) = (&rows[0], &rows[1]);
        assert_eq!(p1.player_slot, Slot::P1);
        assert_eq!(p1.player_name.as_deref(), Some("Ash"));
        assert_eq!(p1.opponent_name.as_deref(), Some("Gary"));
        assert_eq!(p1.rating_diff, Some(33.0));
        assert_eq!(p1.team_pokemon, "Alpha,Beta");
        assert_eq!(p1.sum_hp, 150.0);
        assert_eq!(p1.mean_speed, 75.0);
        assert_eq!(p1.won_battle, 1);
        assert_eq!(p1.turns, 17);

        assert_eq!(p2.player_slot, Slot::P2);
        assert_eq!(p2.rating_diff, Some(-33.0));
        assert_eq!(p2.sum_attack, 140.0);
        assert_eq!(p2.won_battle, 0);
        assert_eq!(p2.format_id.as_deref(), Some("gen9ou"));
    }

    #[tokio::test]
    async fn test_unresolved_species_yields_no_rows() {
        let (mut catalog, _) = catalog(vec![
            species("alpha", 100.0),
            species("beta", 50.0),
            species("gamma", 80.0),
        ]);
        let record = record();
        let parsed = parse_log(&record.log).unwrap();

        assert!(build_rows(&record, &parsed, &mut catalog).await.is_empty());
    }

    #[tokio::test]
    async fn test_p2_not_resolved_when_p1_fails() {
        let (mut catalog, api) = catalog(vec![species("gamma", 80.0), species("delta", 60.0)]);
        let record = record();
        let parsed = parse_log(&record.log).unwrap();

        assert!(build_rows(&record, &parsed, &mut catalog).await.is_empty());
        // only "alpha" was looked up remotely before giving up
        assert_eq!(api.requested(), vec!["alpha"]);
    }

    #[test]
    fn test_assemble_rows_without_player_lines() {
        let log = "|poke|p1|Alpha|\n|poke|p2|Gamma|\n|win|Nobody\n";
        let parsed = ParsedReplay {
            teams: BySlot {
                p1: vec!["Alpha".to_string()],
                p2: vec!["Gamma".to_string()],
            },
            players: BySlot::default(),
            winner: Slot::P2,
            turns: 0,
        };
        let record = ReplayRecord {
            id: "x".to_string(),
            format_id: None,
            log: log.to_string(),
        };
        let agg = TeamAggregate::from_members(&[species("alpha", 10.0)]).unwrap();

        let rows = assemble_rows(&record, &parsed, &BySlot { p1: agg, p2: agg });

        assert_eq!(rows[0].player_name, None);
        assert_eq!(rows[0].rating_diff, None);
        assert_eq!(rows[0].won_battle, 0);
        assert_eq!(rows[1].won_battle, 1);
    }
}
