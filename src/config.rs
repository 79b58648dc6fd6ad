use crate::dash_paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.cborg.lbl.gov";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "CBORG_API_KEY";

/// Dashboard configuration.
///
/// Read from `~/.cborg-dash/config.yaml` when present. Every field has a
/// default so an empty or missing file is valid.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DashConfig {
    /// Gateway root URL, without the `/v1` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where snapshot records live. Defaults to `~/.cborg-dash/data/`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Global timeout for each HTTP call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Model id prefix marking lab-hosted models.
    #[serde(default = "default_hosted_prefix")]
    pub hosted_prefix: String,
    /// Whether to emit colored output when stdout is a terminal.
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_hosted_prefix() -> String {
    "lbl/".to_string()
}

fn default_color() -> bool {
    true
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_dir: None,
            timeout_secs: default_timeout_secs(),
            hosted_prefix: default_hosted_prefix(),
            color: default_color(),
        }
    }
}

/// Values from the command line (or their env fallbacks) that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub no_color: bool,
}

impl DashConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads an explicit config file, or the default one if it exists.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = dash_paths::config_path()?;
        if default_path.exists() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(ref url) = overrides.base_url {
            self.base_url = url.clone();
        }
        if let Some(ref dir) = overrides.data_dir {
            self.data_dir = Some(dir.clone());
        }
        if overrides.no_color {
            self.color = false;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!(
                "base_url must start with http:// or https:// (got '{}')",
                self.base_url
            );
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.hosted_prefix.is_empty() {
            anyhow::bail!("hosted_prefix must not be empty");
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured data directory, or the home-based default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match self.data_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => dash_paths::data_dir(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
