// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Equinox Cache
//!
//! A JSON file mapping years to equinox entries:
//!
//! ```json
//! {"schema": 2, "entries": {"2025": {"utc": "2025-03-20T09:01:25Z", ...}}}
//! ```
//!
//! Schema 1 files (or files without a `schema` tag) map years to bare
//! timestamp strings. They decode to [`CacheV1`] and are migrated to
//! [`CacheV2`] on the first read, which also writes the migrated file back.
//! The write-back is skipped while any legacy value is unreadable.
//! A file with an unknown schema is reset to an empty schema 2 cache.
//! A missing, unreadable or malformed file reads as empty.
//!
//! Each load→mutate→save cycle runs under one lock owned by the
//! [`EquinoxCache`]. Other processes writing the same file are not
//! coordinated with; the last writer wins.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};

pub const CACHE_FILE_NAME: &str = "equinox_cache.json";
pub const CURRENT_SCHEMA: u64 = 2;
pub const LEGACY_SCHEMA: u64 = 1;

/// Uncertainty assigned to migrated schema 1 entries (3 h).
pub const LEGACY_UNCERTAINTY_S: f64 = 10_800.0;
/// Source tag of migrated schema 1 entries and the approximate tier.
pub const LEGACY_SOURCE: &str = "legacy_approximation";

/// Precision tier that produced an equinox instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Internet,
    Analytic,
    Approx,
}

impl Precision {
    pub const ALL: [Precision; 3] = [Precision::Internet, Precision::Analytic, Precision::Approx];

    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Internet => "internet",
            Precision::Analytic => "analytic",
            Precision::Approx => "approx",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "internet" => Ok(Precision::Internet),
            "analytic" => Ok(Precision::Analytic),
            "approx" => Ok(Precision::Approx),
            other => Err(Error::invalid_input(format!(
                "unknown precision tier '{other}', expected internet, analytic or approx"
            ))),
        }
    }
}

/// One cached equinox, as stored in schema 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquinoxEntry {
    pub utc: DateTime<Utc>,
    pub precision: Precision,
    pub uncertainty_s: f64,
    pub source: String,
    /// When the value was computed or fetched.
    pub retrieved_at: DateTime<Utc>,
    /// Original schema 1 value, for migrated entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_approx: Option<String>,
}

/// A schema 1 value: the raw string plus its parsed instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEntry {
    raw: String,
    utc: DateTime<Utc>,
}

impl LegacyEntry {
    /// Accepts RFC 3339, or an offset-less ISO timestamp read as UTC.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let utc = parse_legacy_timestamp(&raw)?;
        Some(Self { raw, utc })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn utc(&self) -> DateTime<Utc> {
        self.utc
    }
}

fn parse_legacy_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Schema 1 cache: year → timestamp string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheV1 {
    pub entries: BTreeMap<i32, LegacyEntry>,
    /// Keys whose value could not be read as a legacy entry.
    pub unreadable: Vec<String>,
}

impl CacheV1 {
    /// Convert every legacy value into an approximate schema 2 entry.
    pub fn migrate(self, retrieved_at: DateTime<Utc>) -> CacheV2 {
        let entries = self
            .entries
            .into_iter()
            .map(|(year, legacy)| {
                let entry = EquinoxEntry {
                    utc: legacy.utc,
                    precision: Precision::Approx,
                    uncertainty_s: LEGACY_UNCERTAINTY_S,
                    source: LEGACY_SOURCE.to_string(),
                    retrieved_at,
                    legacy_approx: Some(legacy.raw),
                };
                (year, entry)
            })
            .collect();
        CacheV2 { entries }
    }
}

/// Schema 2 cache: year → [`EquinoxEntry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheV2 {
    pub entries: BTreeMap<i32, EquinoxEntry>,
}

#[derive(Serialize)]
struct CacheFile<'a> {
    schema: u64,
    entries: &'a BTreeMap<i32, EquinoxEntry>,
}

impl CacheV2 {
    pub fn to_json(&self) -> Result<String> {
        let file = CacheFile {
            schema: CURRENT_SCHEMA,
            entries: &self.entries,
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

/// A decoded cache document of either schema.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRecord {
    V1(CacheV1),
    V2(CacheV2),
}

impl CacheRecord {
    /// Decode a parsed document.
    ///
    /// Returns `None` when the root is not an object or the schema tag is
    /// neither 1 nor 2. Schema 2 entries that do not fit are skipped; schema 1
    /// keys that do not fit are listed in [`CacheV1::unreadable`].
    pub fn from_json(value: &Value) -> Option<Self> {
        let root = value.as_object()?;
        let schema = match root.get("schema") {
            None | Some(Value::Null) => LEGACY_SCHEMA,
            Some(v) => v.as_u64()?,
        };
        let empty = serde_json::Map::new();
        let entries = root.get("entries").and_then(Value::as_object).unwrap_or(&empty);

        match schema {
            LEGACY_SCHEMA => {
                let mut v1 = CacheV1::default();
                for (key, value) in entries {
                    let legacy = value.as_str().and_then(LegacyEntry::parse);
                    match (key.parse::<i32>(), legacy) {
                        (Ok(year), Some(legacy)) => {
                            v1.entries.insert(year, legacy);
                        }
                        _ => v1.unreadable.push(key.clone()),
                    }
                }
                Some(CacheRecord::V1(v1))
            }
            CURRENT_SCHEMA => {
                let mut v2 = CacheV2::default();
                for (key, value) in entries {
                    let entry = serde_json::from_value::<EquinoxEntry>(value.clone());
                    match (key.parse::<i32>(), entry) {
                        (Ok(year), Ok(entry)) => {
                            v2.entries.insert(year, entry);
                        }
                        _ => warn!("Skipping malformed cache entry {key:?}"),
                    }
                }
                Some(CacheRecord::V2(v2))
            }
            _ => None,
        }
    }
}

/// Summary of the cache contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub schema_version: u64,
    pub total_entries: usize,
    pub precision_counts: BTreeMap<Precision, usize>,
    /// Entries carrying a `legacy_approx` value.
    pub migrated_entries: usize,
    pub cache_file: PathBuf,
}

/// File-backed equinox cache.
pub struct EquinoxCache {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl fmt::Debug for EquinoxCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquinoxCache").field("path", &self.path).finish()
    }
}

impl EquinoxCache {
    /// Cache stored at `path`, stamped with the system clock.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            clock: Arc::new(SystemClock),
            lock: Mutex::new(()),
        }
    }

    /// Cache stored as [`CACHE_FILE_NAME`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CACHE_FILE_NAME))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// A new entry stamped with the cache clock.
    pub fn entry(
        &self,
        utc: DateTime<Utc>,
        precision: Precision,
        uncertainty_s: f64,
        source: impl Into<String>,
    ) -> EquinoxEntry {
        EquinoxEntry {
            utc,
            precision,
            uncertainty_s,
            source: source.into(),
            retrieved_at: self.now(),
            legacy_approx: None,
        }
    }

    /// Cached entry for `year`.
    pub fn get(&self, year: i32) -> Option<EquinoxEntry> {
        let _guard = self.lock.lock();
        let entry = self.load_locked().entries.remove(&year);
        if entry.is_some() {
            debug!("Cache hit for {year}");
        }
        entry
    }

    /// Store `entry` for `year`, replacing any previous one.
    pub fn set(&self, year: i32, entry: EquinoxEntry) -> Result<()> {
        let _guard = self.lock.lock();
        let mut cache = self.load_locked();
        cache.entries.insert(year, entry);
        self.save_locked(&cache)
    }

    /// Remove every entry.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        self.save_locked(&CacheV2::default())
    }

    /// Snapshot of the current contents.
    pub fn load(&self) -> CacheV2 {
        let _guard = self.lock.lock();
        self.load_locked()
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.load();
        let mut precision_counts = BTreeMap::new();
        for entry in cache.entries.values() {
            *precision_counts.entry(entry.precision).or_insert(0) += 1;
        }
        CacheStats {
            schema_version: CURRENT_SCHEMA,
            total_entries: cache.entries.len(),
            precision_counts,
            migrated_entries: cache
                .entries
                .values()
                .filter(|e| e.legacy_approx.is_some())
                .count(),
            cache_file: self.path.clone(),
        }
    }

    fn load_locked(&self) -> CacheV2 {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return CacheV2::default(),
            Err(err) => {
                warn!("Cannot read cache {}: {}", self.path.display(), err);
                return CacheV2::default();
            }
        };
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                warn!("Ignoring invalid cache {}: {}", self.path.display(), err);
                return CacheV2::default();
            }
        };

        let (cache, rewrite) = match CacheRecord::from_json(&value) {
            Some(CacheRecord::V2(v2)) => (v2, false),
            Some(CacheRecord::V1(v1)) if !v1.unreadable.is_empty() => {
                // Writing back would drop the unreadable values; keep the file.
                warn!(
                    "Cache {} has unreadable legacy entries {:?}, not migrating on disk",
                    self.path.display(),
                    v1.unreadable
                );
                (v1.migrate(self.now()), false)
            }
            Some(CacheRecord::V1(v1)) => {
                let count = v1.entries.len();
                let v2 = v1.migrate(self.now());
                info!(
                    "Migrated {} legacy cache entries in {} to schema {}",
                    count,
                    self.path.display(),
                    CURRENT_SCHEMA
                );
                (v2, true)
            }
            None if value.is_object() => {
                warn!("Unknown cache schema in {}, resetting", self.path.display());
                (CacheV2::default(), true)
            }
            None => {
                warn!("Ignoring invalid cache {}: root is not an object", self.path.display());
                (CacheV2::default(), false)
            }
        };

        if rewrite {
            if let Err(err) = self.save_locked(&cache) {
                warn!("Failed to write back cache {}: {}", self.path.display(), err);
            }
        }
        cache
    }

    fn save_locked(&self, cache: &CacheV2) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, cache.to_json()?)?;
        Ok(())
    }
}
