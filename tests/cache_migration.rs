use std::fs;

use astrowatch::cache::{LEGACY_SOURCE, LEGACY_UNCERTAINTY_S};
use astrowatch::{EquinoxCache, FixedClock, Precision};
use chrono::{TimeZone, Utc};

#[test]
fn legacy_file_migrates_on_first_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("equinox_cache.json");
    fs::write(&path, r#"{"schema":1, "entries": {"2024": "2024-03-20T03:06:14Z"}}"#).unwrap();

    let stamp = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
    let cache = EquinoxCache::new(&path).with_clock(FixedClock(stamp));

    let entry = cache.get(2024).expect("migrated entry");
    assert_eq!(entry.precision, Precision::Approx);
    assert_eq!(entry.uncertainty_s, LEGACY_UNCERTAINTY_S);
    assert_eq!(entry.source, LEGACY_SOURCE);
    assert_eq!(entry.legacy_approx.as_deref(), Some("2024-03-20T03:06:14Z"));
    assert_eq!(entry.retrieved_at, stamp);

    // A second cache over the same file sees schema 2 and keeps the stamp.
    let later = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
    let reopened = EquinoxCache::new(&path).with_clock(FixedClock(later));
    assert_eq!(reopened.get(2024), Some(entry));
    assert_eq!(reopened.stats().migrated_entries, 1);
}

#[test]
fn garbage_file_is_an_empty_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("equinox_cache.json");
    fs::write(&path, b"\xff\xfe not utf8 at all").unwrap();

    let cache = EquinoxCache::new(&path);
    assert_eq!(cache.get(2024), None);
    assert_eq!(cache.stats().total_entries, 0);
}
