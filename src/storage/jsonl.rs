//! JSON Lines output: one serialized record per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{ensure_parent, StorageError};

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Write records, replacing the entire file.
    pub fn write_all(&self, records: &[T]) -> Result<usize, StorageError> {
        ensure_parent(&self.path)?;

        let mut writer = BufWriter::new(File::create(&self.path)?);
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        info!("Wrote {} records to {:?}", records.len(), self.path);
        Ok(records.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all records. A missing file reads as empty; bad lines are skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Failed to parse line {} in {:?}: {}", index + 1, self.path, e),
            }
        }

        debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Entry {
        id: String,
        turns: u32,
    }

    fn entry(id: &str, turns: u32) -> Entry {
        Entry {
            id: id.to_string(),
            turns,
        }
    }

    #[test]
    fn test_jsonl_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("rows.jsonl");
        let entries = vec![entry("a", 10), entry("b", 22)];

        let writer: JsonlWriter<Entry> = JsonlWriter::new(path.clone());
        assert_eq!(writer.write_all(&entries).unwrap(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);

        let reader: JsonlReader<Entry> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), entries);
    }

    #[test]
    fn test_jsonl_write_replaces_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.jsonl");
        let writer: JsonlWriter<Entry> = JsonlWriter::new(path.clone());

        writer.write_all(&[entry("a", 1), entry("b", 2)]).unwrap();
        writer.write_all(&[entry("c", 3)]).unwrap();

        let reader: JsonlReader<Entry> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![entry("c", 3)]);
    }

    #[test]
    fn test_jsonl_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<Entry> = JsonlReader::new(temp_dir.path().join("nope.jsonl"));
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_jsonl_skips_malformed_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mixed.jsonl");
        std::fs::write(&path, "{\"id\":\"a\",\"turns\":1}\nnot json\n\n{\"id\":\"b\",\"turns\":2}\n").unwrap();

        let reader: JsonlReader<Entry> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![entry("a", 1), entry("b", 2)]);
    }
}
