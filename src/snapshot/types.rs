//! Data types for persisted key snapshots.

use crate::dash_paths::KeyHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum spend samples kept per key (roughly a year of daily checks).
pub const MAX_SPEND_HISTORY: usize = 365;

/// One timestamped reading of spend for a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendSample {
    pub timestamp: DateTime<Utc>,
    pub current_spend: f64,
    #[serde(default)]
    pub budget_limit: Option<f64>,
    #[serde(default)]
    pub remaining: Option<f64>,
    #[serde(default)]
    pub key_alias: Option<String>,
}

/// Key metadata last reported by the gateway.
///
/// Strings are kept exactly as the gateway sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyInfoSnapshot {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_used_at: Option<String>,
    #[serde(default)]
    pub budget_reset_at: Option<String>,
}

/// Persistent record for one API key, stored as `<key_hash>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub key_hash: KeyHash,
    pub key_preview: String,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Time of the last successful catalog check.
    #[serde(default)]
    pub last_model_check: Option<DateTime<Utc>>,
    /// Every model id ever observed for this key. Never shrinks.
    #[serde(default)]
    pub known_models: BTreeSet<String>,
    /// Models first seen by the latest successful check.
    #[serde(default)]
    pub new_models: BTreeSet<String>,
    /// Oldest first, at most `MAX_SPEND_HISTORY` entries.
    #[serde(default)]
    pub spend_history: Vec<SpendSample>,
    #[serde(default)]
    pub key_info: Option<KeyInfoSnapshot>,
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
