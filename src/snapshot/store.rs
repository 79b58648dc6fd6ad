//! Persistent storage for key snapshots.

use super::types::CredentialRecord;
use crate::dash_paths::{self, KeyHash};
use crate::errors::DashError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Summary of one tracked key, for listing without the full history.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedKey {
    pub key_hash: KeyHash,
    pub preview: String,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub model_count: usize,
    pub spend_samples: usize,
}

/// Directory of `<key_hash>.json` records.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Opens a store rooted at `dir`, creating it owner-only if needed.
    pub fn open(dir: PathBuf) -> Result<Self> {
        dash_paths::create_private_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, key_hash: &KeyHash) -> PathBuf {
        self.dir.join(key_hash.file_name())
    }

    /// Loads the record for a key.
    ///
    /// A missing file is a first run (`Ok(None)`). A file that exists but
    /// cannot be read, parsed, or belongs to another key is `StoreCorrupt`.
    pub fn load(&self, key_hash: &KeyHash) -> Result<Option<CredentialRecord>, DashError> {
        let path = self.record_path(key_hash);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DashError::StoreCorrupt {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let record: CredentialRecord =
            serde_json::from_str(&content).map_err(|e| DashError::StoreCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if record.key_hash != *key_hash {
            return Err(DashError::StoreCorrupt {
                path,
                reason: format!("record belongs to key {}", record.key_hash),
            });
        }

        Ok(Some(record))
    }

    /// Saves a record atomically with owner-only permissions.
    ///
    /// The record is first written to a temporary file, then renamed to the final path.
    pub fn save(&self, record: &CredentialRecord) -> Result<PathBuf> {
        dash_paths::create_private_dir(&self.dir)?;
        let path = self.record_path(&record.key_hash);
        let temp_path = path.with_extension("json.tmp");

        let content =
            serde_json::to_string_pretty(record).context("Failed to serialize snapshot record")?;

        // A leftover temp file would keep its old mode; start fresh.
        match fs::remove_file(&temp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to remove stale temp file: {}", temp_path.display())
                })
            }
        }
        let mut file = private_file(&temp_path)
            .with_context(|| format!("Failed to create temp snapshot file: {}", temp_path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temp snapshot file: {}", temp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to flush temp snapshot file: {}", temp_path.display()))?;
        drop(file);

        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

        tracing::debug!(key_hash = %record.key_hash, path = %path.display(), "Saved snapshot");
        Ok(path)
    }

    /// Lists every readable record, most recently updated first.
    ///
    /// Unreadable files are skipped.
    pub fn list_tracked(&self) -> Result<Vec<TrackedKey>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read data directory: {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let record = match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|c| {
                    serde_json::from_str::<CredentialRecord>(&c).map_err(|e| e.to_string())
                }) {
                Ok(record) => record,
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "Skipping unreadable snapshot");
                    continue;
                }
            };

            keys.push(TrackedKey {
                preview: record.key_preview,
                first_seen: record.first_seen,
                last_updated: record.last_updated,
                model_count: record.known_models.len(),
                spend_samples: record.spend_history.len(),
                key_hash: record.key_hash,
            });
        }

        keys.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(keys)
    }
}

#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
