// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Coefficient tables beyond the built-in one.
//!
//! Higher-precision tables are generated offline as `vsop87d_earth_*.py`
//! files. Each declares its conservative longitude error in a header line
//!
//! ```text
//! Conservative error bound (longitude): 0.512 arcseconds
//! ```
//!
//! followed by eighteen term lists (`L0 = [ (A, B, C), ... ]` through `R5`).
//!
//! Discovery ([`CoefficientCatalog`]), selection ([`CoefficientProvider::select`])
//! and parsing ([`load_table`]) are separate steps so that selection stays a
//! pure function of the requested budget and the enumerated candidates.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use qtty::*;

use super::series::{Bands, CoefficientSet, Term};
use crate::error::{Error, Result};

const FILE_PREFIX: &str = "vsop87d_earth_";
const FILE_SUFFIX: &str = ".py";
const BOUND_MARKER: &str = "Conservative error bound";

/// A coefficient file on disk and the error bound it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCandidate {
    pub path: PathBuf,
    pub error_bound: Arcseconds,
}

/// Where the orbital series coefficients come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CoefficientProvider {
    /// The truncated table compiled into the crate.
    BuiltinDefault,
    /// A generated table file with its declared error bound.
    FromTable { path: PathBuf, error_bound: Arcseconds },
}

impl CoefficientProvider {
    /// Choose the most precise candidate that meets `target`.
    ///
    /// Among tables whose declared bound is `≤ target` the one with the
    /// smallest bound wins (ties broken by path, so the choice does not
    /// depend on enumeration order). No target, or no qualifying table,
    /// selects the built-in default.
    pub fn select(target: Option<Arcseconds>, candidates: &[TableCandidate]) -> Self {
        let Some(target) = target else {
            return Self::BuiltinDefault;
        };

        candidates
            .iter()
            .filter(|c| c.error_bound.value() <= target.value())
            .min_by(|a, b| {
                a.error_bound
                    .value()
                    .total_cmp(&b.error_bound.value())
                    .then_with(|| a.path.cmp(&b.path))
            })
            .map(|c| Self::FromTable {
                path: c.path.clone(),
                error_bound: c.error_bound,
            })
            .unwrap_or(Self::BuiltinDefault)
    }
}

/// Enumerates coefficient tables available for selection.
pub trait CoefficientCatalog: Send + Sync {
    fn enumerate(&self) -> Vec<TableCandidate>;
}

/// A fixed list of candidates.
impl CoefficientCatalog for Vec<TableCandidate> {
    fn enumerate(&self) -> Vec<TableCandidate> {
        self.clone()
    }
}

/// Scans one directory for `vsop87d_earth_*.py` files.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    dir: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CoefficientCatalog for DirectoryCatalog {
    fn enumerate(&self) -> Vec<TableCandidate> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Coefficient directory {} not readable: {}", self.dir.display(), err);
                return Vec::new();
            }
        };

        let mut candidates = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_table = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX));
            if !is_table {
                continue;
            }
            match fs::read_to_string(&path).ok().and_then(|t| parse_error_bound(&t)) {
                Some(error_bound) => candidates.push(TableCandidate { path, error_bound }),
                None => debug!("Skipping {}: no error bound declared", path.display()),
            }
        }
        candidates
    }
}

/// Extract the declared longitude error bound from a table's header.
pub fn parse_error_bound(text: &str) -> Option<Arcseconds> {
    let line = text
        .lines()
        .find(|l| l.contains(BOUND_MARKER) && l.contains("arcseconds"))?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let idx = tokens.iter().position(|t| t.starts_with("arcseconds"))?;
    let value = tokens.get(idx.checked_sub(1)?)?.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then(|| Arcseconds::new(value))
}

/// Read and parse a table file.
pub fn load_table(path: &Path) -> Result<CoefficientSet> {
    let text = fs::read_to_string(path).map_err(|e| table_error(path, e.to_string()))?;
    parse_table(&text, path)
}

/// Parse the term lists of a table file.
///
/// Missing series are empty; `L0` must be present and non-empty.
pub fn parse_table(text: &str, path: &Path) -> Result<CoefficientSet> {
    let mut series: [[Vec<Term>; 6]; 3] = Default::default();
    let mut current: Option<(usize, usize)> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();

        if let Some((coord, power)) = current {
            if line.starts_with(']') {
                current = None;
            } else if !line.is_empty() {
                let term = parse_term(line).ok_or_else(|| {
                    table_error(path, format!("line {}: malformed term '{}'", lineno + 1, line))
                })?;
                series[coord][power].push(term);
            }
            continue;
        }

        if let Some((coord, power, rest)) = series_header(line) {
            if rest.starts_with("[]") || rest == "[ ]" {
                continue;
            }
            current = Some((coord, power));
        }
    }

    if current.is_some() {
        return Err(table_error(path, "unterminated term list".into()));
    }
    if series[0][0].is_empty() {
        return Err(table_error(path, "missing L0 series".into()));
    }

    let [l, b, r] = series;
    Ok(CoefficientSet::new(owned(l), owned(b), owned(r)))
}

/// `"L3 = ["` → `(0, 3, "[")`
fn series_header(line: &str) -> Option<(usize, usize, &str)> {
    let (name, rest) = line.split_once('=')?;
    let rest = rest.trim();
    if !rest.starts_with('[') {
        return None;
    }
    let mut chars = name.trim().chars();
    let coord = match chars.next()? {
        'L' => 0,
        'B' => 1,
        'R' => 2,
        _ => return None,
    };
    let power = chars.next()?.to_digit(10)? as usize;
    if power > 5 || chars.next().is_some() {
        return None;
    }
    Some((coord, power, rest))
}

/// `"(A, B, C),"` → `(A, B, C)`
fn parse_term(line: &str) -> Option<Term> {
    let inner = line
        .trim_end_matches(',')
        .trim()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<f64>());
    let a = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    let c = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((a, b, c))
}

fn owned(bands: [Vec<Term>; 6]) -> Bands {
    bands.map(Cow::Owned)
}

fn table_error(path: &Path, reason: String) -> Error {
    Error::CoefficientTable {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#""""
VSOP87D Earth coefficients
Amplitude threshold: 1.00e+02
Conservative error bound (longitude): 2.500 arcseconds

Units:
- L (longitude): 10^-8 radians
"""

import math

L0 = [
    (175347046.0, 0.0, 0.0),
    (3341656.0, 4.6692568, 6283.07585),
]

L1 = [
    (628331966747.0, 0.0, 0.0),
]

L2 = [
]

B0 = [
    (280.0, 3.199, 84334.662),
]

R0 = [
    (100013989.0, 0, 0),
]

def _t(jd):
    return (jd - 2451545.0) / 365250.0

CONSERVATIVE_ERROR_ARCSEC = 2.500000
"#;

    fn candidate(name: &str, bound: f64) -> TableCandidate {
        TableCandidate {
            path: PathBuf::from(name),
            error_bound: Arcseconds::new(bound),
        }
    }

    #[test]
    fn parses_error_bound_header() {
        let bound = parse_error_bound(SAMPLE).unwrap();
        assert!((bound.value() - 2.5).abs() < 1e-12);
        assert!(parse_error_bound("no header here").is_none());
    }

    #[test]
    fn parses_term_lists() {
        let set = parse_table(SAMPLE, Path::new("sample.py")).unwrap();
        assert_eq!(set.l[0].len(), 2);
        assert_eq!(set.l[1].len(), 1);
        assert!(set.l[2].is_empty());
        assert_eq!(set.b[0][0], (280.0, 3.199, 84334.662));
        assert_eq!(set.r[0][0], (100013989.0, 0.0, 0.0));
        assert_eq!(set.term_count(), 5);
    }

    #[test]
    fn rejects_malformed_term() {
        let text = "L0 = [\n    (1.0, oops, 2.0),\n]\n";
        let err = parse_table(text, Path::new("bad.py")).unwrap_err();
        assert!(matches!(err, Error::CoefficientTable { ref reason, .. } if reason.contains("line 2")));
    }

    #[test]
    fn rejects_table_without_l0() {
        let text = "B0 = [\n    (1.0, 0.0, 0.0),\n]\n";
        assert!(parse_table(text, Path::new("bad.py")).is_err());
        let unterminated = "L0 = [\n    (1.0, 0.0, 0.0),\n";
        assert!(parse_table(unterminated, Path::new("bad.py")).is_err());
    }

    #[test]
    fn select_without_target_is_builtin() {
        let candidates = vec![candidate("a.py", 0.1)];
        assert_eq!(
            CoefficientProvider::select(None, &candidates),
            CoefficientProvider::BuiltinDefault
        );
    }

    #[test]
    fn select_picks_tightest_qualifying_table() {
        let candidates = vec![
            candidate("coarse.py", 5.0),
            candidate("fine.py", 0.5),
            candidate("finest.py", 0.05),
        ];
        let chosen = CoefficientProvider::select(Some(Arcseconds::new(1.0)), &candidates);
        assert_eq!(
            chosen,
            CoefficientProvider::FromTable {
                path: PathBuf::from("finest.py"),
                error_bound: Arcseconds::new(0.05),
            }
        );
    }

    #[test]
    fn select_falls_back_when_nothing_qualifies() {
        let candidates = vec![candidate("coarse.py", 5.0)];
        assert_eq!(
            CoefficientProvider::select(Some(Arcseconds::new(1.0)), &candidates),
            CoefficientProvider::BuiltinDefault
        );
    }

    #[test]
    fn directory_catalog_finds_generated_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vsop87d_earth_2p5.py"), SAMPLE).unwrap();
        fs::write(dir.path().join("vsop87d_earth_nobound.py"), "L0 = [\n]\n").unwrap();
        fs::write(dir.path().join("unrelated.py"), SAMPLE).unwrap();

        let found = DirectoryCatalog::new(dir.path()).enumerate();
        assert_eq!(found.len(), 1);
        assert!(found[0].path.ends_with("vsop87d_earth_2p5.py"));
        assert!((found[0].error_bound.value() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn missing_directory_enumerates_nothing() {
        let catalog = DirectoryCatalog::new("/definitely/not/here");
        assert!(catalog.enumerate().is_empty());
    }
}
