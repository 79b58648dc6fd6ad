//! Team roster loading and per-member spend aggregation.

use super::activity::{classify_activity, last_activity, Activity};
use crate::dash_paths::{key_preview, KeyHash};
use crate::snapshot::CredentialRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Role that always sorts to the top of the team view.
pub const PI_ROLE: &str = "PI";

/// A roster entry mapping a person to their API key.
#[derive(Clone, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub role: Option<String>,
}

// Hand-written so the key never reaches logs or panic messages.
impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("api_key", &key_preview(&self.api_key))
            .field("role", &self.role)
            .finish()
    }
}

impl Member {
    pub fn is_pi(&self) -> bool {
        self.role.as_deref() == Some(PI_ROLE)
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Hash of the member's key, or `None` when the roster gives no key.
    pub fn key_hash(&self) -> Option<KeyHash> {
        self.has_key().then(|| KeyHash::of(self.api_key.trim()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RosterFile {
    List(Vec<Member>),
    Wrapped { members: Vec<Member> },
}

/// Parses a roster in YAML or JSON, as a bare list or under `members:`.
pub fn parse_roster(content: &str) -> Result<Vec<Member>> {
    let roster: RosterFile =
        serde_yaml::from_str(content).context("Roster must be a list of members")?;
    let members = match roster {
        RosterFile::List(members) => members,
        RosterFile::Wrapped { members } => members,
    };
    if members.is_empty() {
        anyhow::bail!("Roster has no members");
    }
    if let Some(blank) = members.iter().position(|m| m.name.trim().is_empty()) {
        anyhow::bail!("Roster member #{} has an empty name", blank + 1);
    }
    Ok(members)
}

pub fn load_roster(path: &Path) -> Result<Vec<Member>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
    parse_roster(&content).with_context(|| format!("Invalid roster file: {}", path.display()))
}

/// One line of the team view.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRow {
    pub name: String,
    pub role: Option<String>,
    pub is_pi: bool,
    pub key_hash: Option<KeyHash>,
    /// Masked key, shown when the gateway reports no alias.
    pub key_preview: Option<String>,
    /// Whether a stored snapshot was found for the member's key.
    pub resolved: bool,
    pub current_spend: Option<f64>,
    pub budget_limit: Option<f64>,
    pub remaining: Option<f64>,
    pub key_alias: Option<String>,
    /// Gateway status, verbatim.
    pub status: Option<String>,
    pub activity: Activity,
    /// Set when this run could not refresh the member's data.
    pub stale: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamTotals {
    pub current_spend: f64,
    pub budget_limit: f64,
    pub remaining: f64,
    /// Members contributing at least one spend sample to the totals.
    pub members_with_data: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    /// PI first, then by descending spend.
    pub rows: Vec<MemberRow>,
    pub totals: TeamTotals,
}

impl TeamSummary {
    pub fn inactive_count(&self) -> usize {
        self.rows.iter().filter(|r| r.activity.inactive).count()
    }

    pub fn mark_stale(&mut self, key_hash: &KeyHash) {
        for row in &mut self.rows {
            if row.key_hash.as_ref() == Some(key_hash) {
                row.stale = true;
            }
        }
    }
}

/// Joins roster members to their snapshots and totals their spend.
///
/// Members without a resolvable snapshot are kept with absent values.
pub fn aggregate_team(
    records: &[CredentialRecord],
    roster: &[Member],
    now: DateTime<Utc>,
) -> TeamSummary {
    let by_hash: HashMap<&KeyHash, &CredentialRecord> =
        records.iter().map(|r| (&r.key_hash, r)).collect();

    let mut totals = TeamTotals::default();
    let mut rows: Vec<MemberRow> = roster
        .iter()
        .map(|member| {
            let key_hash = member.key_hash();
            let record = key_hash.as_ref().and_then(|h| by_hash.get(h).copied());
            let sample = record.and_then(|r| r.latest_sample());

            if let Some(sample) = sample {
                totals.current_spend += sample.current_spend;
                totals.budget_limit += sample.budget_limit.unwrap_or(0.0);
                totals.remaining += sample.remaining.unwrap_or(0.0);
                totals.members_with_data += 1;
            }

            MemberRow {
                name: member.name.clone(),
                role: member.role.clone(),
                is_pi: member.is_pi(),
                key_preview: member.has_key().then(|| key_preview(member.api_key.trim())),
                key_hash,
                resolved: record.is_some(),
                current_spend: sample.map(|s| s.current_spend),
                budget_limit: sample.and_then(|s| s.budget_limit),
                remaining: sample.and_then(|s| s.remaining),
                key_alias: sample.and_then(|s| s.key_alias.clone()),
                status: record
                    .and_then(|r| r.key_info.as_ref())
                    .and_then(|info| info.status.clone()),
                activity: classify_activity(record.and_then(last_activity), now),
                stale: false,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.is_pi
            .cmp(&a.is_pi)
            .then_with(|| {
                let spend_a = a.current_spend.unwrap_or(0.0);
                let spend_b = b.current_spend.unwrap_or(0.0);
                spend_b.total_cmp(&spend_a)
            })
            .then_with(|| a.name.cmp(&b.name))
    });

    TeamSummary { rows, totals }
}

#[cfg(test)]
#[path = "tests/team_tests.rs"]
mod tests;
