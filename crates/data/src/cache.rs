//! On-disk memoization of result tables.
//!
//! Each artifact is a CSV table accompanied by `<artifact>.manifest.json`
//! recording the fingerprint of the inputs it was computed from. A table is
//! only served when its manifest fingerprint matches the caller's current
//! fingerprint, so a changed price history or config forces a recompute.
//! Deleting the files remains a valid way to refresh.
//!
//! Writers are assumed to be exclusive; there is no file locking.

use crate::csv_storage::CsvStorage;
use crate::price_history::PriceHistory;
use chrono::{DateTime, Utc};
use cointegrator_core::{CointError, Result, StorageConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Bumped whenever the layout of a cached table changes.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// SHA-256 over schema version, parameters and the price-history snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprints the inputs of a computation.
    ///
    /// # Errors
    /// Returns an error if `params` cannot be serialized to JSON.
    pub fn compute<P: Serialize + ?Sized>(history: &PriceHistory, params: &P) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(CACHE_SCHEMA_VERSION.to_le_bytes());
        hasher.update(serde_json::to_vec(params)?);
        hasher.update(serde_json::to_vec(history)?);
        Ok(Self(hex::encode(hasher.finalize())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short form is enough for logs
        f.write_str(&self.0[..self.0.len().min(12)])
    }
}

/// Sidecar describing a cached table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub fingerprint: Fingerprint,
    pub rows: usize,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.output_dir.clone())
    }

    #[must_use]
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn manifest_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.manifest.json"))
    }

    /// Returns true when `name` exists and was computed from inputs matching `fingerprint`.
    #[must_use]
    pub fn is_valid(&self, name: &str, fingerprint: &Fingerprint) -> bool {
        if !self.artifact_path(name).is_file() {
            debug!(artifact = name, "No cached artifact");
            return false;
        }

        match self.read_manifest(name) {
            Ok(manifest) if manifest.fingerprint == *fingerprint => true,
            Ok(manifest) => {
                info!(
                    artifact = name,
                    cached = %manifest.fingerprint,
                    current = %fingerprint,
                    "Cached artifact is stale"
                );
                false
            }
            Err(e) => {
                warn!(artifact = name, error = %e, "Cached artifact has no readable manifest");
                false
            }
        }
    }

    /// Loads a cached table if it is valid for `fingerprint`.
    ///
    /// Unreadable tables are reported and treated as a miss.
    #[must_use]
    pub fn lookup<T: DeserializeOwned>(&self, name: &str, fingerprint: &Fingerprint) -> Option<Vec<T>> {
        if !self.is_valid(name, fingerprint) {
            return None;
        }

        let path = self.artifact_path(name);
        match CsvStorage::read_rows(&path) {
            Ok(rows) => {
                info!(path = %path.display(), rows = rows.len(), "Loaded cached table");
                Some(rows)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cached table, recomputing");
                None
            }
        }
    }

    /// Persists a table and its manifest.
    ///
    /// Empty tables are not written, so the next request recomputes them.
    /// Returns whether anything was written.
    ///
    /// # Errors
    /// Returns [`CointError::Persistence`] if either file cannot be written.
    pub fn store<T: Serialize>(
        &self,
        name: &str,
        fingerprint: &Fingerprint,
        rows: &[T],
    ) -> Result<bool> {
        if rows.is_empty() {
            info!(artifact = name, "Nothing to save, table is empty");
            return Ok(false);
        }

        let path = self.artifact_path(name);
        let manifest_path = self.manifest_path(name);

        // drop the old manifest first so a half-written table is never considered valid
        if manifest_path.exists() {
            fs::remove_file(&manifest_path).map_err(|e| CointError::persistence(&manifest_path, e))?;
        }

        CsvStorage::write_rows(&path, rows)
            .map_err(|e| CointError::persistence(&path, e))?;

        let manifest = CacheManifest {
            fingerprint: fingerprint.clone(),
            rows: rows.len(),
            saved_at: Utc::now(),
        };
        let file = File::create(&manifest_path).map_err(|e| CointError::persistence(&manifest_path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &manifest)
            .map_err(|e| CointError::persistence(&manifest_path, e))?;

        info!(path = %path.display(), rows = rows.len(), "Table saved");
        Ok(true)
    }

    /// Removes an artifact and its manifest if present.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be removed.
    pub fn invalidate(&self, name: &str) -> Result<()> {
        for path in [self.artifact_path(name), self.manifest_path(name)] {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| CointError::persistence(&path, e))?;
                debug!(path = %path.display(), "Removed cached file");
            }
        }
        Ok(())
    }

    fn read_manifest(&self, name: &str) -> Result<CacheManifest> {
        let file = File::open(self.manifest_path(name))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
