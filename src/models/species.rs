//! Species statistics model.

use serde::{Deserialize, Serialize};

/// The six base stats of a species (or an aggregate over several).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub sp_attack: f64,
    pub sp_defense: f64,
    pub speed: f64,
}

impl BaseStats {
    pub fn new(hp: f64, attack: f64, defense: f64, sp_attack: f64, sp_defense: f64, speed: f64) -> Self {
        Self {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        }
    }

    /// Values in table order: hp, attack, defense, sp_attack, sp_defense, speed.
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_attack,
            self.sp_defense,
            self.speed,
        ]
    }

    pub fn from_array(values: [f64; 6]) -> Self {
        let [hp, attack, defense, sp_attack, sp_defense, speed] = values;
        Self::new(hp, attack, defense, sp_attack, sp_defense, speed)
    }

    /// True when every value is a finite, non-negative number.
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Component-wise sum.
    pub fn total<'a, I>(stats: I) -> Self
    where
        I: IntoIterator<Item = &'a BaseStats>,
    {
        stats.into_iter().fold(Self::default(), |acc, s| {
            let (a, b) = (acc.to_array(), s.to_array());
            Self::from_array(std::array::from_fn(|i| a[i] + b[i]))
        })
    }

    /// Component-wise division by `n`.
    pub fn scaled_down(&self, n: f64) -> Self {
        Self::from_array(self.to_array().map(|v| v / n))
    }
}

/// Canonical statistics for one species or form, keyed by slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    /// Canonical lowercase slug (e.g. "ogerpon-wellspring-mask")
    pub name: String,

    /// Primary type
    pub type1: String,

    /// Secondary type, if any
    pub type2: Option<String>,

    /// Base stats
    pub stats: BaseStats,
}

impl SpeciesStats {
    pub fn new(name: impl Into<String>, type1: impl Into<String>, stats: BaseStats) -> Self {
        Self {
            name: name.into(),
            type1: type1.into(),
            type2: None,
            stats,
        }
    }

    pub fn with_type2(mut self, type2: impl Into<String>) -> Self {
        self.type2 = Some(type2.into());
        self
    }
}

/// Sum and mean of each base stat across a team.
///
/// Only exists when every member of the roster resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub size: usize,
    pub sum: BaseStats,
    pub mean: BaseStats,
}

impl TeamAggregate {
    /// Aggregate a fully resolved roster. An empty roster has no aggregate.
    pub fn from_members(members: &[SpeciesStats]) -> Option<Self> {
        if members.is_empty() {
            return None;
        }

        let sum = BaseStats::total(members.iter().map(|m| &m.stats));
        Some(Self {
            size: members.len(),
            sum,
            mean: sum.scaled_down(members.len() as f64),
        })
    }
}
