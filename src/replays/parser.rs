//! Battle log parsing.
//!
//! A Showdown battle log is a sequence of `|type|arg|arg...` lines. Only four
//! line types matter here; everything else is skipped.
//!
//! ```text
//! |player|p1|Ash|ace-trainer|1523
//! |poke|p1|Great Tusk, L50|
//! |turn|10
//! |win|Ash
//! ```

use thiserror::Error;

use crate::models::{BySlot, ParsedReplay, PlayerInfo, Slot};

/// Why a log could not produce a usable replay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("replay log is empty")]
    EmptyLog,

    #[error("no species revealed for {0}")]
    EmptyRoster(Slot),

    #[error("winner {0:?} does not match any player")]
    NoWinner(Option<String>),
}

/// Extract rosters, players, winner and turn count from a raw battle log.
pub fn parse_log(log: &str) -> Result<ParsedReplay, ParseError> {
    if log.is_empty() {
        return Err(ParseError::EmptyLog);
    }

    let mut teams: BySlot<Vec<String>> = BySlot::default();
    // ordered by the first `|player|` line seen for each slot
    let mut players: Vec<(Slot, PlayerInfo)> = Vec::with_capacity(2);
    let mut winner_name: Option<String> = None;
    let mut turns = 0;

    for line in log.lines() {
        if let Some(rest) = line.strip_prefix("|player|") {
            if let Some((slot, info)) = parse_player(rest) {
                match players.iter_mut().find(|(s, _)| *s == slot) {
                    Some(entry) => entry.1 = info,
                    None => players.push((slot, info)),
                }
            }
        } else if let Some(rest) = line.strip_prefix("|poke|") {
            if let Some((slot, species)) = parse_poke(rest) {
                let roster = teams.get_mut(slot);
                if !roster.iter().any(|s| s == species) {
                    roster.push(species.to_string());
                }
            }
        } else if let Some(rest) = line.strip_prefix("|win|") {
            let name = rest.split('|').next().unwrap_or_default();
            winner_name = (!name.is_empty()).then(|| name.to_string());
        } else if let Some(rest) = line.strip_prefix("|turn|") {
            let value = rest.split('|').next().unwrap_or_default();
            if let Ok(turn) = value.trim().parse() {
                turns = turn;
            }
        }
    }

    for slot in Slot::ALL {
        if teams.get(slot).is_empty() {
            return Err(ParseError::EmptyRoster(slot));
        }
    }

    let winner = winner_name
        .as_deref()
        .and_then(|name| {
            players
                .iter()
                .find(|(_, info)| info.name == name)
                .map(|(slot, _)| *slot)
        })
        .ok_or_else(|| ParseError::NoWinner(winner_name.clone()))?;

    let mut by_slot: BySlot<Option<PlayerInfo>> = BySlot::default();
    for (slot, info) in players {
        *by_slot.get_mut(slot) = Some(info);
    }

    Ok(ParsedReplay {
        teams,
        players: by_slot,
        winner,
        turns,
    })
}

/// `<slot>|<name>|<avatar>|<rating>|...`; trailing fields may be missing.
fn parse_player(rest: &str) -> Option<(Slot, PlayerInfo)> {
    let padded = format!("{}||||", rest);
    let mut fields = padded.split('|');

    let slot = Slot::parse(fields.next()?)?;
    let name = fields.next().unwrap_or_default().to_string();
    let _avatar = fields.next();
    let rating = fields
        .next()
        .and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite());

    Some((slot, PlayerInfo { name, rating }))
}

/// `<slot>|<species>, <details>|...`; returns the bare species name.
fn parse_poke(rest: &str) -> Option<(Slot, &str)> {
    let mut fields = rest.split('|');
    let slot = fields.next()?;
    let details = fields.next()?;

    let slot = Slot::parse(slot)?;
    let species = details.split(',').next().unwrap_or_default().trim();
    (!species.is_empty()).then_some((slot, species))
}
