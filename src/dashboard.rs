//! One dashboard run: fetch, merge into the snapshot, persist, report.
//!
//! Every recoverable failure becomes a `Notice` on the report instead of an
//! error, so the presentation layer always has something to show.

use crate::analysis::{aggregate_team, Member, TeamSummary};
use crate::dash_paths::KeyHash;
use crate::errors::DashError;
use crate::gateway::{GatewayApi, SpendInfo};
use crate::snapshot::{CredentialRecord, SnapshotStore};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Whether the displayed catalog came from this run or from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Live,
    Stale { reason: String },
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale { .. })
    }
}

/// Everything the single-key view needs.
#[derive(Debug, Clone)]
pub struct KeyReport {
    pub record: CredentialRecord,
    pub new_models: BTreeSet<String>,
    /// Live catalog, or the known set when the fetch failed.
    pub catalog: Vec<String>,
    /// Spend from this run; `None` if unsupported or unavailable.
    pub spend: Option<SpendInfo>,
    pub freshness: Freshness,
    /// Catalog check time before this run; `None` on the first check.
    pub previous_check: Option<DateTime<Utc>>,
    pub saved: bool,
    pub notices: Vec<Notice>,
}

/// Loads the stored record, starting fresh when absent or corrupt.
///
/// Returns the record and whether it came from disk.
fn load_or_new(
    store: &SnapshotStore,
    api_key: &str,
    now: DateTime<Utc>,
    notices: &mut Vec<Notice>,
) -> (CredentialRecord, bool) {
    let key_hash = KeyHash::of(api_key);
    match store.load(&key_hash) {
        Ok(Some(record)) => (record, true),
        Ok(None) => {
            tracing::info!(%key_hash, "No snapshot yet, treating as first run");
            (CredentialRecord::new(api_key, now), false)
        }
        Err(e) => {
            tracing::warn!(%key_hash, error = %e, "Snapshot unreadable, rebuilding");
            notices.push(Notice::warning(format!("{}; history was reset", e)));
            (CredentialRecord::new(api_key, now), false)
        }
    }
}

/// Refreshes one key against the gateway and persists the merged snapshot.
///
/// If the catalog fetch fails nothing is written and the stored record is
/// reported as stale.
pub fn refresh_key(
    store: &SnapshotStore,
    api: &dyn GatewayApi,
    api_key: &str,
    now: DateTime<Utc>,
) -> KeyReport {
    let mut notices = Vec::new();
    let (record, _) = load_or_new(store, api_key, now, &mut notices);
    let previous_check = record.last_model_check;

    let fetched = match api.list_models() {
        Ok(models) => models,
        Err(e) => return stale_report(record, previous_check, e, notices),
    };

    let fetched_set: BTreeSet<String> = fetched.iter().cloned().collect();
    let (mut record, new_models) = record.record_model_check(&fetched_set, now);
    if !new_models.is_empty() {
        tracing::info!(key_hash = %record.key_hash, count = new_models.len(), "New models found");
    }

    let spend = match api.key_info() {
        Ok(Some(info)) => {
            let before = record.spend_history.len();
            record = record.append_spend_sample(info.to_sample(now));
            if record.spend_history.len() == before {
                tracing::debug!(key_hash = %record.key_hash, "Spend unchanged, no sample added");
            }
            record.key_info = Some(info.key_info_snapshot());
            Some(info)
        }
        Ok(None) => {
            notices.push(Notice::info("Gateway does not report spend for this key"));
            None
        }
        Err(e) => {
            notices.push(Notice::warning(format!("Spending information unavailable: {}", e)));
            None
        }
    };

    let saved = match store.save(&record) {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(key_hash = %record.key_hash, error = %e, "Failed to save snapshot");
            notices.push(Notice::warning(format!(
                "Could not save snapshot ({:#}); new models will be reported again next run",
                e
            )));
            false
        }
    };

    KeyReport {
        record,
        new_models,
        catalog: fetched,
        spend,
        freshness: Freshness::Live,
        previous_check,
        saved,
        notices,
    }
}

fn stale_report(
    record: CredentialRecord,
    previous_check: Option<DateTime<Utc>>,
    error: DashError,
    mut notices: Vec<Notice>,
) -> KeyReport {
    tracing::warn!(key_hash = %record.key_hash, error = %error, "Catalog fetch failed, showing stored snapshot");
    let reason = error.to_string();
    notices.push(Notice::warning(match previous_check {
        Some(checked) => format!(
            "Showing stale data from {} ({})",
            checked.format("%Y-%m-%d %H:%M UTC"),
            reason
        ),
        None => format!("No stored data to fall back on ({})", reason),
    }));

    KeyReport {
        catalog: record.known_models.iter().cloned().collect(),
        new_models: record.new_models.clone(),
        record,
        spend: None,
        freshness: Freshness::Stale { reason },
        previous_check,
        saved: false,
        notices,
    }
}

/// Everything the team view needs.
#[derive(Debug, Clone)]
pub struct TeamReport {
    pub summary: TeamSummary,
    /// Members whose spend was fetched live this run.
    pub refreshed: usize,
    pub notices: Vec<Notice>,
}

/// Refreshes spend for every roster member, then aggregates.
///
/// `connect` builds a gateway client for one member's key. Members whose
/// fetch fails keep their stored snapshot and are marked stale.
pub fn refresh_team<A, F>(
    store: &SnapshotStore,
    roster: &[Member],
    connect: F,
    now: DateTime<Utc>,
) -> TeamReport
where
    A: GatewayApi,
    F: Fn(&str) -> A,
{
    let mut notices = Vec::new();
    let mut records = Vec::new();
    let mut stale = Vec::new();
    let mut refreshed = 0;

    for member in roster {
        if !member.has_key() {
            notices.push(Notice::warning(format!("{} has no API key in the roster", member.name)));
            continue;
        }
        let api_key = member.api_key.trim();
        let (mut record, stored) = load_or_new(store, api_key, now, &mut notices);

        match connect(api_key).key_info() {
            Ok(Some(info)) => {
                record = record.append_spend_sample(info.to_sample(now));
                record.key_info = Some(info.key_info_snapshot());
                record.last_updated = now;
                if let Err(e) = store.save(&record) {
                    tracing::error!(key_hash = %record.key_hash, error = %e, "Failed to save snapshot");
                    notices.push(Notice::warning(format!(
                        "Could not save snapshot for {}: {:#}",
                        member.name, e
                    )));
                }
                refreshed += 1;
                records.push(record);
            }
            Ok(None) => {
                notices.push(Notice::info(format!(
                    "Gateway does not report spend for {}",
                    member.name
                )));
                if stored {
                    records.push(record);
                }
            }
            Err(e) => {
                tracing::warn!(member = %member.name, error = %e, "Spend fetch failed");
                notices.push(Notice::warning(format!("{}: {}", member.name, e)));
                stale.push(record.key_hash.clone());
                if stored {
                    records.push(record);
                }
            }
        }
    }

    let mut summary = aggregate_team(&records, roster, now);
    for key_hash in &stale {
        summary.mark_stale(key_hash);
    }

    TeamReport {
        summary,
        refreshed,
        notices,
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
