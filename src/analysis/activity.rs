//! Relative-age labels and inactivity detection.

use crate::snapshot::CredentialRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Keys idle for longer than this are flagged inactive.
pub const INACTIVE_AFTER_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub label: String,
    pub inactive: bool,
}

/// Buckets the time since `last_active` into a label and an inactive flag.
///
/// No timestamp at all counts as inactive.
pub fn classify_activity(last_active: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Activity {
    match last_active {
        Some(then) => Activity {
            label: format_relative_time(then, now),
            inactive: (now - then).num_seconds() > INACTIVE_AFTER_DAYS * 86_400,
        },
        None => Activity {
            label: "never".to_string(),
            inactive: true,
        },
    }
}

/// Formats `then` relative to `now` ("3 hours ago").
///
/// Timestamps in the future read as "just now".
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - then;
    let days = diff.num_days();
    let hours = diff.num_hours();
    let minutes = diff.num_minutes();

    if days > 0 {
        format!("{} day{} ago", days, plural(days))
    } else if hours > 0 {
        format!("{} hour{} ago", hours, plural(hours))
    } else if minutes > 0 {
        format!("{} minute{} ago", minutes, plural(minutes))
    } else {
        "just now".to_string()
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Parses gateway timestamps: RFC 3339, naive ISO 8601 (taken as UTC), or a bare date.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Best known time the key was last used.
///
/// Prefers the gateway's `last_used_at`; falls back to the newest spend
/// sample, since spend only moves when the key is used.
pub fn last_activity(record: &CredentialRecord) -> Option<DateTime<Utc>> {
    record
        .key_info
        .as_ref()
        .and_then(|info| info.last_used_at.as_deref())
        .and_then(parse_timestamp)
        .or_else(|| record.latest_sample().map(|s| s.timestamp))
}

#[cfg(test)]
#[path = "tests/activity_tests.rs"]
mod tests;
