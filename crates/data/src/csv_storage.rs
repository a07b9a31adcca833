//! Serde-driven CSV tables, one row struct per line.

use cointegrator_core::{CointError, Result};
use csv::{ReaderBuilder, Writer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

pub struct CsvStorage;

impl CsvStorage {
    /// Writes rows to a CSV file with a header derived from the row type.
    ///
    /// Creates the parent directory when needed.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path).map_err(|e| CointError::persistence(path, e))?;
        let mut writer = Writer::from_writer(file);

        for row in rows {
            writer.serialize(row)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Reads every row of a CSV file written by [`CsvStorage::write_rows`].
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or a row does not match `T`
    pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| CointError::persistence(path, e))?;

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }

        Ok(rows)
    }
}
