//! Unit tests for record-key derivation and the keyed record collection.

use super::{RecordError, Records, RecordKey};
use eyre::ensure;
use rstest::rstest;

#[rstest]
fn derivation_is_deterministic() {
    let first = RecordKey::derive("task", &[b"owner-a", b"7"]);
    let second = RecordKey::derive("task", &[b"owner-a", b"7"]);
    assert_eq!(first, second);
}

#[rstest]
#[case("task", "bid")]
#[case("escrow", "review")]
fn domain_tags_separate_key_families(#[case] left: &str, #[case] right: &str) {
    let seeds: &[&[u8]] = &[b"owner-a", b"7"];
    assert_ne!(RecordKey::derive(left, seeds), RecordKey::derive(right, seeds));
}

#[rstest]
fn different_seeds_produce_different_keys() {
    assert_ne!(
        RecordKey::derive("task", &[b"owner-a", b"7"]),
        RecordKey::derive("task", &[b"owner-a", b"8"])
    );
}

#[rstest]
fn display_renders_lowercase_hex() {
    let rendered = RecordKey::derive("task", &[b"owner-a"]).to_string();
    assert_eq!(rendered.len(), 64);
    assert!(rendered.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[rstest]
fn create_then_fetch_round_trips() -> eyre::Result<()> {
    let mut records: Records<RecordKey, u64> = Records::new();
    let key = RecordKey::derive("test", &[b"record-1"]);

    records.create(key, 41)?;
    *records.fetch_mut(key)? += 1;

    ensure!(records.fetch(key)? == &42);
    ensure!(records.contains(key));
    ensure!(records.len() == 1);
    Ok(())
}

#[rstest]
fn create_rejects_occupied_key() -> eyre::Result<()> {
    let mut records: Records<RecordKey, u64> = Records::new();
    let key = RecordKey::derive("test", &[b"record-1"]);
    records.create(key, 1)?;

    let result = records.create(key, 2);

    ensure!(result == Err(RecordError::Duplicate(key)));
    ensure!(records.fetch(key)? == &1);
    Ok(())
}

#[rstest]
fn fetch_reports_missing_key() {
    let records: Records<RecordKey, u64> = Records::new();
    let key = RecordKey::derive("test", &[b"absent"]);

    assert_eq!(records.fetch(key), Err(RecordError::NotFound(key)));
    assert!(records.get(key).is_none());
    assert!(records.is_empty());
}
