//! Data types returned by the gateway.

use crate::snapshot::{KeyInfoSnapshot, SpendSample};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Spend and key metadata from `/key/info`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendInfo {
    pub current_spend: f64,
    pub budget_limit: Option<f64>,
    pub remaining: Option<f64>,
    pub key_alias: Option<String>,
    /// Key status exactly as reported (e.g. "active", "cooldown", "blocked").
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub last_used_at: Option<String>,
    pub budget_reset_at: Option<String>,
    pub model_spend: BTreeMap<String, f64>,
}

impl SpendInfo {
    pub fn to_sample(&self, now: DateTime<Utc>) -> SpendSample {
        SpendSample {
            timestamp: now,
            current_spend: self.current_spend,
            budget_limit: self.budget_limit,
            remaining: self.remaining,
            key_alias: self.key_alias.clone(),
        }
    }

    pub fn key_info_snapshot(&self) -> KeyInfoSnapshot {
        KeyInfoSnapshot {
            status: self.status.clone(),
            created_at: self.created_at.clone(),
            last_used_at: self.last_used_at.clone(),
            budget_reset_at: self.budget_reset_at.clone(),
        }
    }

    /// Models with the highest spend, largest first.
    pub fn top_model_spend(&self, limit: usize) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .model_spend
            .iter()
            .filter(|(_, spend)| **spend > 0.0)
            .map(|(model, spend)| (model.as_str(), *spend))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
