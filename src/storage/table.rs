//! CSV output with a header row derived from the record's field names.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::{ensure_parent, StorageError};

/// Serialize records as CSV to any writer.
pub fn write_csv<W: Write, T: Serialize>(wtr: W, records: &[T]) -> Result<usize, StorageError> {
    let mut writer = csv::Writer::from_writer(wtr);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Write records to a CSV file, replacing it and creating parent directories.
pub fn save_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<usize, StorageError> {
    ensure_parent(path)?;
    let count = write_csv(File::create(path)?, records)?;
    info!("Wrote {} records to {}", count, path.display());
    Ok(count)
}
