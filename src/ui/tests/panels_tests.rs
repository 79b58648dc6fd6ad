use super::*;
use crate::analysis::{aggregate_team, Member};
use crate::dash_paths::KeyHash;
use crate::snapshot::SpendSample;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ratatui::style::Color;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap()
}

fn ctx() -> ViewContext<'static> {
    ViewContext {
        base_url: "https://api.cborg.lbl.gov",
        hosted_prefix: "lbl/",
        now: now(),
        theme: Theme::default(),
    }
}

fn text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

fn find_span<'a>(lines: &'a [Line<'static>], needle: &str) -> &'a Span<'static> {
    lines
        .iter()
        .flat_map(|l| l.spans.iter())
        .find(|s| s.content.contains(needle))
        .unwrap_or_else(|| panic!("no span containing {:?}", needle))
}

fn report(catalog: &[&str], new: &[&str], spend: Option<SpendInfo>) -> KeyReport {
    let record = CredentialRecord::new("sk-panels-test-key-0001", now() - Duration::days(3));
    KeyReport {
        record,
        new_models: new.iter().map(|s| s.to_string()).collect(),
        catalog: catalog.iter().map(|s| s.to_string()).collect(),
        spend,
        freshness: Freshness::Live,
        previous_check: Some(now() - Duration::hours(2)),
        saved: true,
        notices: Vec::new(),
    }
}

fn spend(current: f64, budget: Option<f64>) -> SpendInfo {
    SpendInfo {
        current_spend: current,
        budget_limit: budget,
        remaining: budget.map(|b| b - current),
        ..SpendInfo::default()
    }
}

#[test]
fn test_all_models_colors_hosted_green_and_commercial_cyan() {
    let report = report(&["openai/gpt-4o", "lbl/llama", "anthropic/claude"], &["lbl/llama"], None);
    let lines = build_all_models(&report, &ctx());

    assert_eq!(find_span(&lines, "lbl/llama").style.fg, Some(Color::Green));
    assert_eq!(find_span(&lines, "openai/gpt-4o").style.fg, Some(Color::Cyan));
    assert_eq!(find_span(&lines, "(new)").style.fg, Some(Color::Yellow));

    let rendered: Vec<String> = lines.iter().map(text).collect();
    let hosted = rendered.iter().position(|l| l.contains("lbl/llama")).unwrap();
    let commercial = rendered.iter().position(|l| l.contains("anthropic/claude")).unwrap();
    assert!(hosted < commercial);
}

#[test]
fn test_model_summary_counts_and_first_check() {
    let mut report = report(&["lbl/a", "lbl/b", "openai/c"], &["openai/c"], None);
    let lines: Vec<String> = build_model_summary(&report, &ctx()).iter().map(text).collect();
    assert!(lines.iter().any(|l| l.contains("Total: 3") && l.contains("New: 1")));
    assert!(lines.iter().any(|l| l.contains("Lab-hosted: 2") && l.contains("Commercial: 1")));
    assert!(lines.iter().any(|l| l.contains("2 hours ago")));

    report.previous_check = None;
    let lines: Vec<String> = build_model_summary(&report, &ctx()).iter().map(text).collect();
    assert!(lines.iter().any(|l| l.contains("First check")));
}

#[test]
fn test_model_summary_flags_unsaved_snapshot() {
    let mut report = report(&["lbl/a"], &["lbl/a"], None);
    let lines = build_model_summary(&report, &ctx());
    assert!(!lines.iter().map(text).any(|l| l.contains("not saved")));

    report.saved = false;
    let lines = build_model_summary(&report, &ctx());
    let last = lines.iter().map(text).find(|l| l.contains("Last check")).unwrap();
    assert!(last.contains("2 hours ago (not saved, delta will repeat)"));
    assert_eq!(find_span(&lines, "not saved").style.fg, Some(Color::Yellow));

    report.freshness = Freshness::Stale {
        reason: "offline".to_string(),
    };
    let lines = build_model_summary(&report, &ctx());
    assert!(!lines.iter().map(text).any(|l| l.contains("not saved")));
}

#[test]
fn test_new_models_empty_message() {
    let lines = build_new_models(&BTreeSet::new(), &Freshness::Live, &Theme::default());
    assert_eq!(lines.len(), 1);
    assert!(text(&lines[0]).contains("No new models since last check"));
}

#[test]
fn test_new_models_are_yellow() {
    let new: BTreeSet<String> = ["lbl/new-model".to_string()].into();
    let lines = build_new_models(&new, &Freshness::Live, &Theme::default());
    assert_eq!(find_span(&lines, "lbl/new-model").style.fg, Some(Color::Yellow));

    let stale = Freshness::Stale {
        reason: "offline".to_string(),
    };
    let lines = build_new_models(&new, &stale, &Theme::default());
    assert!(text(&lines[0]).contains("as of last successful check"));
}

#[test]
fn test_usage_percent_thresholds_in_spend_panel() {
    for (current, color) in [(95.0, Color::Red), (80.0, Color::Yellow), (10.0, Color::Green)] {
        let report = report(&["lbl/a"], &[], Some(spend(current, Some(100.0))));
        let lines = build_spend_panel(&report, &ctx());
        let usage = find_span(&lines, "%");
        assert_eq!(usage.style.fg, Some(color), "usage {}", current);
    }
}

#[test]
fn test_spend_panel_without_budget_has_no_usage() {
    let report = report(&["lbl/a"], &[], Some(spend(3.0, None)));
    let lines: Vec<String> = build_spend_panel(&report, &ctx()).iter().map(text).collect();
    assert!(lines.iter().any(|l| l.contains("no limit")));
    assert!(!lines.iter().any(|l| l.contains("Usage")));
}

#[test]
fn test_spend_panel_unavailable_is_yellow() {
    let report = report(&["lbl/a"], &[], None);
    let lines = build_spend_panel(&report, &ctx());
    let span = find_span(&lines, "Unable to retrieve spending information");
    assert_eq!(span.style.fg, Some(Color::Yellow));
}

#[test]
fn test_spend_panel_shows_change_and_top_models() {
    let mut info = spend(12.0, Some(100.0));
    info.model_spend = [("lbl/a".to_string(), 2.0), ("openai/b".to_string(), 10.0)].into();
    info.status = Some("active".to_string());
    info.budget_reset_at = Some("2026-10-01T00:00:00Z".to_string());
    let mut report = report(&["lbl/a"], &[], Some(info));
    report.record = report
        .record
        .append_spend_sample(SpendSample {
            timestamp: now() - Duration::days(1),
            current_spend: 9.5,
            budget_limit: Some(100.0),
            remaining: Some(90.5),
            key_alias: None,
        })
        .append_spend_sample(SpendSample {
            timestamp: now(),
            current_spend: 12.0,
            budget_limit: Some(100.0),
            remaining: Some(88.0),
            key_alias: None,
        });

    let lines: Vec<String> = build_spend_panel(&report, &ctx()).iter().map(text).collect();
    assert!(lines.iter().any(|l| l.contains("+$2.50") && l.contains("1 day ago")));
    assert!(lines.iter().any(|l| l.contains("Budget resets: 2026-10-01")));
    assert!(lines.iter().any(|l| l.contains("Status: active")));

    let top = lines.iter().position(|l| l.contains("Top models")).unwrap();
    assert!(lines[top + 1].contains("openai/b"));
    assert!(lines[top + 2].contains("lbl/a"));
}

#[test]
fn test_connection_line_flags_stale() {
    let stale = Freshness::Stale {
        reason: "gateway unavailable: timeout".to_string(),
    };
    let line = build_connection(&stale, &ctx());
    assert!(text(&line).contains("STALE DATA"));
    assert!(text(&line).contains("timeout"));

    let live = build_connection(&Freshness::Live, &ctx());
    assert!(text(&live).contains("Connected to https://api.cborg.lbl.gov"));
}

#[test]
fn test_notices_color_by_level() {
    let lines = build_notices(
        &[Notice::info("fyi"), Notice::warning("careful")],
        &Theme::default(),
    );
    assert_eq!(find_span(&lines, "fyi").style.fg, Some(Color::Cyan));
    assert_eq!(find_span(&lines, "careful").style.fg, Some(Color::Yellow));
}

fn member(name: &str, key: &str, role: Option<&str>) -> Member {
    Member {
        name: name.to_string(),
        email: None,
        api_key: key.to_string(),
        role: role.map(String::from),
    }
}

fn record_with_spend(key: &str, spend: f64, age: Duration) -> CredentialRecord {
    CredentialRecord::new(key, now() - Duration::days(30)).append_spend_sample(SpendSample {
        timestamp: now() - age,
        current_spend: spend,
        budget_limit: Some(100.0),
        remaining: Some(100.0 - spend),
        key_alias: None,
    })
}

#[test]
fn test_team_table_marks_pi_inactive_stale_and_unresolved() {
    let roster = vec![
        member("Pat", "sk-pat-key-0000000000", Some("PI")),
        member("Old", "sk-old-key-0000000000", None),
        member("Ghost", "sk-ghost-key-00000000", None),
    ];
    let records = vec![
        record_with_spend("sk-pat-key-0000000000", 10.0, Duration::hours(1)),
        record_with_spend("sk-old-key-0000000000", 20.0, Duration::days(10)),
    ];
    let mut summary = aggregate_team(&records, &roster, now());
    summary.mark_stale(&KeyHash::of("sk-old-key-0000000000"));

    let lines = build_team_table(&summary, &Theme::default());
    let rendered: Vec<String> = lines.iter().map(text).collect();

    let pat = rendered.iter().position(|l| l.contains("Pat ★")).unwrap();
    let old = rendered.iter().position(|l| l.contains("Old")).unwrap();
    assert!(pat < old);
    assert!(rendered[old].contains("[inactive]"));
    assert!(rendered[old].contains("[stale]"));
    assert_eq!(lines[old].spans[0].style.fg, Some(Color::DarkGray));

    let ghost = rendered.iter().find(|l| l.contains("Ghost")).unwrap();
    assert!(ghost.contains('-'));
    assert!(ghost.contains("[no data]"));

    let total = rendered.iter().find(|l| l.contains("Total")).unwrap();
    assert!(total.contains("$30.00"));
    assert!(total.contains("$200.00"));
    assert!(rendered.last().unwrap().contains("3 members, 2 with spend data"));
}

#[test]
fn test_team_table_columns_align() {
    let roster = vec![
        member("Alexandria", "sk-alex-key-000000000", None),
        member("Bo", "sk-bo-key-00000000000", None),
    ];
    let records = vec![
        record_with_spend("sk-alex-key-000000000", 1.0, Duration::hours(1)),
        record_with_spend("sk-bo-key-00000000000", 1234.5, Duration::hours(1)),
    ];
    let summary = aggregate_team(&records, &roster, now());
    let lines: Vec<String> = build_team_table(&summary, &Theme::default())
        .iter()
        .map(text)
        .collect();

    let header = &lines[1];
    let bo = lines.iter().find(|l| l.contains("Bo ")).unwrap();
    assert_eq!(header.find("Role"), bo.find('-'));
}

#[test]
fn test_team_table_key_column_prefers_alias() {
    let roster = vec![
        member("Ann", "sk-ann-key-0000000000", None),
        member("Bob", "sk-bob-key-0000000000", None),
        member("Cy", "", None),
    ];
    let records = vec![
        CredentialRecord::new("sk-ann-key-0000000000", now() - Duration::days(2)).append_spend_sample(
            SpendSample {
                timestamp: now() - Duration::hours(1),
                current_spend: 4.0,
                budget_limit: None,
                remaining: None,
                key_alias: Some("ann-laptop".to_string()),
            },
        ),
        record_with_spend("sk-bob-key-0000000000", 2.0, Duration::hours(1)),
    ];
    let summary = aggregate_team(&records, &roster, now());
    let lines: Vec<String> = build_team_table(&summary, &Theme::default())
        .iter()
        .map(text)
        .collect();

    let header = &lines[1];
    let column = header.find("Key").unwrap();
    let ann = lines.iter().find(|l| l.contains("Ann")).unwrap();
    let bob = lines.iter().find(|l| l.contains("Bob")).unwrap();
    assert_eq!(ann.find("ann-laptop"), Some(column));
    assert!(!ann.contains("sk-ann-k"));
    assert_eq!(bob.find("sk-bob-k...0000"), Some(column));
}

#[test]
fn test_keys_list() {
    let lines: Vec<String> = build_keys_list(&[], &ctx()).iter().map(text).collect();
    assert!(lines.iter().any(|l| l.contains("No tracked keys yet")));

    let key = TrackedKey {
        key_hash: KeyHash::of("sk-listed-key-00000001"),
        preview: "sk-liste...0001".to_string(),
        first_seen: now() - Duration::days(40),
        last_updated: now() - Duration::minutes(5),
        model_count: 12,
        spend_samples: 3,
    };
    let lines: Vec<String> = build_keys_list(&[key], &ctx()).iter().map(text).collect();
    assert!(lines[1].contains("sk-liste...0001"));
    assert!(lines[2].contains("12 models"));
    assert!(lines[2].contains("5 minutes ago"));
}
