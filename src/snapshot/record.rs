//! Pure state transitions on a `CredentialRecord`.
//!
//! Each operation takes the record by value and hands back the updated one,
//! so callers decide when (and whether) to persist.

use super::types::{CredentialRecord, SpendSample, MAX_SPEND_HISTORY};
use crate::dash_paths::{key_preview, KeyHash};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

impl CredentialRecord {
    /// Creates the empty record for a key that has never been seen.
    pub fn new(api_key: &str, now: DateTime<Utc>) -> Self {
        Self {
            key_hash: KeyHash::of(api_key),
            key_preview: key_preview(api_key),
            first_seen: now,
            last_updated: now,
            last_model_check: None,
            known_models: BTreeSet::new(),
            new_models: BTreeSet::new(),
            spend_history: Vec::new(),
            key_info: None,
        }
    }

    /// Merges a freshly fetched catalog into the known set.
    ///
    /// Returns the updated record and the models absent from the known set
    /// before this call.
    pub fn record_model_check(
        mut self,
        fetched: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> (Self, BTreeSet<String>) {
        let new_models: BTreeSet<String> =
            fetched.difference(&self.known_models).cloned().collect();

        self.known_models.extend(fetched.iter().cloned());
        self.new_models = new_models.clone();
        self.last_model_check = Some(now);
        self.last_updated = now;

        (self, new_models)
    }

    /// Appends a spend sample unless spend is unchanged since the last one.
    ///
    /// History is trimmed from the front to `MAX_SPEND_HISTORY` entries.
    pub fn append_spend_sample(mut self, sample: SpendSample) -> Self {
        let unchanged = self
            .spend_history
            .last()
            .is_some_and(|last| last.current_spend == sample.current_spend);
        if unchanged {
            return self;
        }

        self.spend_history.push(sample);
        if self.spend_history.len() > MAX_SPEND_HISTORY {
            let excess = self.spend_history.len() - MAX_SPEND_HISTORY;
            self.spend_history.drain(..excess);
        }
        self
    }

    pub fn latest_sample(&self) -> Option<&SpendSample> {
        self.spend_history.last()
    }

    /// Newest sample taken strictly before `at`.
    pub fn sample_before(&self, at: DateTime<Utc>) -> Option<&SpendSample> {
        self.spend_history.iter().rev().find(|s| s.timestamp < at)
    }
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
