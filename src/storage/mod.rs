//! Dataset files on the local filesystem.
//!
//! Output is written either as CSV (default) or JSON Lines, chosen by the
//! file extension.

mod jsonl;
mod table;

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

pub use jsonl::{JsonlReader, JsonlWriter};
pub use table::{save_csv, write_csv};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// On-disk layout of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Jsonl,
}

impl OutputFormat {
    /// `.jsonl` selects JSON Lines; anything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => OutputFormat::Jsonl,
            _ => OutputFormat::Csv,
        }
    }
}

/// Write records to `path` in the format its extension selects.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<usize, StorageError> {
    match OutputFormat::from_path(path) {
        OutputFormat::Csv => save_csv(path, records),
        OutputFormat::Jsonl => JsonlWriter::new(path.to_path_buf()).write_all(records),
    }
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
