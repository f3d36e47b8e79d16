//! Core data models shared by the catalog and replay pipelines.

mod replay;
mod row;
mod species;

pub use replay::*;
pub use row::*;
pub use species::*;
