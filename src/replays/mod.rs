//! Replay discovery, download and log parsing.

pub mod client;
pub mod parser;

pub use client::{collect_ids, ReplaySource, ReplaySummary, ShowdownClient};
pub use parser::{parse_log, ParseError};
