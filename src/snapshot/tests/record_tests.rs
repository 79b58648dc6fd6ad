use super::*;
use chrono::{Duration, TimeZone};
use proptest::prelude::*;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
}

fn models(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn sample(spend: f64) -> SpendSample {
    SpendSample {
        timestamp: at(0),
        current_spend: spend,
        budget_limit: Some(100.0),
        remaining: Some(100.0 - spend),
        key_alias: None,
    }
}

#[test]
fn test_new_record_is_empty() {
    let record = CredentialRecord::new("sk-abcdefghijklmnop1234", at(1));
    assert_eq!(record.key_hash, KeyHash::of("sk-abcdefghijklmnop1234"));
    assert_eq!(record.key_preview, "sk-abcde...1234");
    assert_eq!(record.first_seen, at(1));
    assert!(record.known_models.is_empty());
    assert!(record.spend_history.is_empty());
    assert_eq!(record.last_model_check, None);
}

#[test]
fn test_first_run_everything_is_new() {
    let record = CredentialRecord::new("sk-first-run-key-0000", at(1));
    let (record, new_models) = record.record_model_check(&models(&["a", "b"]), at(2));

    assert_eq!(new_models, models(&["a", "b"]));
    assert_eq!(record.known_models, models(&["a", "b"]));
    assert_eq!(record.new_models, models(&["a", "b"]));
    assert_eq!(record.last_model_check, Some(at(2)));
    assert_eq!(record.last_updated, at(2));
    assert_eq!(record.first_seen, at(1));
}

#[test]
fn test_second_run_reports_only_delta() {
    let record = CredentialRecord::new("sk-second-run-key-000", at(1));
    let (record, _) = record.record_model_check(&models(&["a", "b"]), at(2));
    let (record, new_models) = record.record_model_check(&models(&["b", "c"]), at(3));

    assert_eq!(new_models, models(&["c"]));
    assert_eq!(record.known_models, models(&["a", "b", "c"]));
    assert_eq!(record.new_models, models(&["c"]));
}

#[test]
fn test_vanished_models_stay_known() {
    let record = CredentialRecord::new("sk-vanish-key-0000000", at(1));
    let (record, _) = record.record_model_check(&models(&["a", "lbl/llama"]), at(2));
    let (record, new_models) = record.record_model_check(&models(&["a"]), at(3));

    assert!(new_models.is_empty());
    assert!(record.known_models.contains("lbl/llama"));
}

#[test]
fn test_append_sample_dedups_unchanged_spend() {
    let record = CredentialRecord::new("sk-dedup-key-00000000", at(1))
        .append_spend_sample(sample(1.5))
        .append_spend_sample(sample(1.5));
    assert_eq!(record.spend_history.len(), 1);

    let record = record.append_spend_sample(sample(2.0));
    assert_eq!(record.spend_history.len(), 2);
    assert_eq!(record.latest_sample().unwrap().current_spend, 2.0);
}

#[test]
fn test_append_sample_only_compares_with_latest() {
    let record = CredentialRecord::new("sk-aba-key-0000000000", at(1))
        .append_spend_sample(sample(1.0))
        .append_spend_sample(sample(2.0))
        .append_spend_sample(sample(1.0));
    assert_eq!(record.spend_history.len(), 3);
}

#[test]
fn test_history_cap_keeps_most_recent() {
    let mut record = CredentialRecord::new("sk-cap-key-0000000000", at(1));
    for i in 0..400 {
        let mut s = sample(i as f64);
        s.timestamp = at(0) + Duration::minutes(i);
        record = record.append_spend_sample(s);
    }

    assert_eq!(record.spend_history.len(), MAX_SPEND_HISTORY);
    assert_eq!(record.spend_history[0].current_spend, 35.0);
    assert_eq!(record.latest_sample().unwrap().current_spend, 399.0);
    let spends: Vec<f64> = record.spend_history.iter().map(|s| s.current_spend).collect();
    let expected: Vec<f64> = (35..400).map(|i| i as f64).collect();
    assert_eq!(spends, expected);
}

#[test]
fn test_sample_before_skips_current_run() {
    let record = CredentialRecord::new("sk-prev-key-000000000", at(1));
    assert!(record.sample_before(at(5)).is_none());

    let mut first = sample(3.0);
    first.timestamp = at(2);
    let mut second = sample(4.0);
    second.timestamp = at(5);
    let record = record.append_spend_sample(first).append_spend_sample(second);

    assert_eq!(record.sample_before(at(5)).unwrap().current_spend, 3.0);
    assert_eq!(record.sample_before(at(6)).unwrap().current_spend, 4.0);
    assert!(record.sample_before(at(2)).is_none());
}

fn model_set() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("(lbl/)?[a-c]{1,3}", 0..16)
}

proptest! {
    #[test]
    fn prop_delta_is_set_difference_and_known_is_union(a in model_set(), b in model_set()) {
        let mut record = CredentialRecord::new("sk-prop-key-000000000", at(1));
        record.known_models = a.clone();

        let (record, new_models) = record.record_model_check(&b, at(2));

        let expected_new: BTreeSet<String> = b.difference(&a).cloned().collect();
        let expected_known: BTreeSet<String> = a.union(&b).cloned().collect();
        prop_assert_eq!(&new_models, &expected_new);
        prop_assert_eq!(&record.known_models, &expected_known);
        prop_assert!(new_models.is_subset(&b));
        prop_assert!(new_models.is_disjoint(&a));
    }

    #[test]
    fn prop_model_check_is_idempotent(a in model_set(), b in model_set()) {
        let mut record = CredentialRecord::new("sk-prop-key-000000000", at(1));
        record.known_models = a;

        let (record, _) = record.record_model_check(&b, at(2));
        let known_after_first = record.known_models.clone();
        let (record, new_models) = record.record_model_check(&b, at(3));

        prop_assert!(new_models.is_empty());
        prop_assert_eq!(record.known_models, known_after_first);
    }

    #[test]
    fn prop_history_never_exceeds_cap(spends in proptest::collection::vec(0u32..50, 0..500)) {
        let mut record = CredentialRecord::new("sk-prop-key-000000000", at(1));
        for spend in spends {
            record = record.append_spend_sample(sample(f64::from(spend)));
        }
        prop_assert!(record.spend_history.len() <= MAX_SPEND_HISTORY);
        for pair in record.spend_history.windows(2) {
            prop_assert_ne!(pair[0].current_spend, pair[1].current_spend);
        }
    }
}
