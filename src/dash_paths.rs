//! Centralized home-based storage paths for all cborg-dash persistence.
//!
//! This module provides helpers for unified storage under `~/.cborg-dash/`:
//! - `data/<key-hash>.json` - One snapshot record per tracked API key
//! - `logs/dash.log` - Tracing output (stdout is reserved for the dashboard)
//! - `config.yaml` - Optional configuration file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// The name of the dashboard home directory.
const DASH_HOME_DIR: &str = ".cborg-dash";

/// Number of digest bytes kept for a key hash (16 hex characters).
const KEY_HASH_BYTES: usize = 8;

#[cfg(test)]
static HOME_OVERRIDE: std::sync::Mutex<Option<PathBuf>> = std::sync::Mutex::new(None);

/// Returns the home-based dashboard directory: `~/.cborg-dash/`
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn dash_home_dir() -> Result<PathBuf> {
    let home = home_dir().context("Could not determine home directory for dashboard storage")?;
    let dash_dir = home.join(DASH_HOME_DIR);
    create_private_dir(&dash_dir)?;
    Ok(dash_dir)
}

#[cfg(not(test))]
fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

#[cfg(test)]
fn home_dir() -> Option<PathBuf> {
    let guard = HOME_OVERRIDE.lock().ok()?;
    guard.clone().or_else(dirs::home_dir)
}

/// Returns the snapshot data directory: `~/.cborg-dash/data/`
///
/// Creates the directory if it doesn't exist.
pub fn data_dir() -> Result<PathBuf> {
    let dir = dash_home_dir()?.join("data");
    create_private_dir(&dir)?;
    Ok(dir)
}

/// Returns the logs directory: `~/.cborg-dash/logs/`
pub fn logs_dir() -> Result<PathBuf> {
    let dir = dash_home_dir()?.join("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the log file path: `~/.cborg-dash/logs/dash.log`
pub fn log_path() -> Result<PathBuf> {
    Ok(logs_dir()?.join("dash.log"))
}

/// Returns the default config file path: `~/.cborg-dash/config.yaml`
pub fn config_path() -> Result<PathBuf> {
    Ok(dash_home_dir()?.join("config.yaml"))
}

/// Creates a directory (and parents) readable only by the owner.
pub fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
            .with_context(|| format!("Failed to restrict permissions on {}", dir.display()))?;
    }
    Ok(())
}

/// Stable, one-way identifier of an API key.
///
/// SHA-256 of the raw key truncated to 16 hex characters. The raw key is
/// never stored; this is what names the snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyHash(pub String);

impl KeyHash {
    pub fn of(api_key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(api_key.as_bytes());
        let result = hasher.finalize();
        Self(hex_encode(&result[..KEY_HASH_BYTES]))
    }

    /// File name of the snapshot record for this key.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl std::fmt::Display for KeyHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Masked display form of an API key: first 8 and last 4 characters.
///
/// Keys too short to leave anything hidden are masked entirely.
pub fn key_preview(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars.iter().take(8).collect();
    let tail: String = chars.iter().skip(chars.len() - 4).collect();
    format!("{}...{}", head, tail)
}

/// Encodes bytes as lowercase hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Restores the previous home override when dropped.
#[cfg(test)]
pub struct HomeGuard {
    previous: Option<PathBuf>,
}

#[cfg(test)]
impl Drop for HomeGuard {
    fn drop(&mut self) {
        if let Ok(mut guard) = HOME_OVERRIDE.lock() {
            *guard = self.previous.take();
        }
    }
}

/// Points `dash_home_dir` at `home` until the returned guard is dropped.
///
/// Tests using this must be `#[serial]`.
#[cfg(test)]
pub fn set_home_for_test(home: PathBuf) -> HomeGuard {
    let mut guard = HOME_OVERRIDE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let previous = guard.replace(home);
    HomeGuard { previous }
}

#[cfg(test)]
#[path = "dash_paths_tests.rs"]
mod tests;
