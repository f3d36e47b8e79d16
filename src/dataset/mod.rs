//! Dataset builders: replay rows and synthetic teams.

pub mod rows;
pub mod synthetic;

pub use rows::{assemble_rows, build_rows};
pub use synthetic::{generate_teams, power_score, SyntheticError, SyntheticTeamRow};
