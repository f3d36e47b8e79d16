//! Battle replay models.

use serde::{Deserialize, Serialize};

/// One of the two competing sides in a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    P1,
    P2,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::P1, Slot::P2];

    /// Parse the slot token used in battle logs ("p1", "p2").
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "p1" => Some(Slot::P1),
            "p2" => Some(Slot::P2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::P1 => "p1",
            Slot::P2 => "p2",
        }
    }

    pub fn opponent(&self) -> Self {
        match self {
            Slot::P1 => Slot::P2,
            Slot::P2 => Slot::P1,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value held per slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BySlot<T> {
    pub p1: T,
    pub p2: T,
}

impl<T> BySlot<T> {
    pub fn get(&self, slot: Slot) -> &T {
        match slot {
            Slot::P1 => &self.p1,
            Slot::P2 => &self.p2,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::P1 => &mut self.p1,
            Slot::P2 => &mut self.p2,
        }
    }
}

/// A replay as served by the replay detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub id: String,

    /// Format identifier (e.g. "gen9ou")
    #[serde(rename = "formatid", default)]
    pub format_id: Option<String>,

    /// Raw newline-delimited battle log
    #[serde(default)]
    pub log: String,
}

/// Player identity and ladder rating for one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub rating: Option<f64>,
}

/// Fields extracted from a battle log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReplay {
    /// Distinct species display names per slot, in order of first appearance
    pub teams: BySlot<Vec<String>>,

    /// Player announced for each slot, if any
    pub players: BySlot<Option<PlayerInfo>>,

    pub winner: Slot,

    /// Last turn number seen (0 if the log never reached turn 1)
    pub turns: u32,
}
