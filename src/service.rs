// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Equinox Precision Service
//!
//! Resolves the vernal equinox of a year through precision tiers tried in a
//! preference order, caching the first success:
//!
//! | tier       | how                                   | uncertainty |
//! |------------|---------------------------------------|-------------|
//! | `internet` | remote JSON source, validated to 0.1° | 5 s         |
//! | `analytic` | Brent root finding, validated to 0.01°| 10 s        |
//! | `approx`   | coarse step search on the Meeus Sun   | 3 h         |
//!
//! A cached year is returned as is, without re-validation. A tier that
//! fails is skipped; only when every tier in the order fails does the call
//! return [`Error::AllTiersFailed`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};
use qtty::*;
use serde::Serialize;

use crate::cache::{CacheStats, EquinoxCache, EquinoxEntry, Precision, LEGACY_SOURCE, LEGACY_UNCERTAINTY_S};
use crate::config::{Config, DEFAULT_PREFER_ORDER};
use crate::equinox::{EquinoxFinder, SolveMethod, SolverOptions};
use crate::error::{Error, Result, TierError};
use crate::frame::AstroYear;
use crate::net::{validate_equinox_timestamp, EquinoxSource, HttpEquinoxSource};
use crate::solar::{MeeusSun, SolarModel};

pub const UNCERTAINTY_INTERNET_S: f64 = 5.0;
pub const UNCERTAINTY_ANALYTIC_S: f64 = 10.0;
pub const UNCERTAINTY_APPROX_S: f64 = LEGACY_UNCERTAINTY_S;

pub const SOURCE_REMOTE: &str = "remote_fetch";
pub const SOURCE_ANALYTIC: &str = "meeus_root_finding";

/// Two tiers closer than this are reported as agreeing.
pub const AGREEMENT_SECONDS: f64 = 30.0;

const ANALYTIC_TOLERANCE: Seconds = Seconds::new(2.0);
const ANALYTIC_VALIDATION: Degrees = Degrees::new(0.01);
const INTERNET_VALIDATION: Degrees = Degrees::new(0.1);
const ANALYTIC_ERROR_BUDGET: Arcseconds = Arcseconds::new(1.0);

/// Nominal uncertainty of a tier, in seconds.
pub fn tier_uncertainty_s(tier: Precision) -> f64 {
    match tier {
        Precision::Internet => UNCERTAINTY_INTERNET_S,
        Precision::Analytic => UNCERTAINTY_ANALYTIC_S,
        Precision::Approx => UNCERTAINTY_APPROX_S,
    }
}

/// Source tag recorded for a tier.
pub fn tier_source(tier: Precision) -> &'static str {
    match tier {
        Precision::Internet => SOURCE_REMOTE,
        Precision::Analytic => SOURCE_ANALYTIC,
        Precision::Approx => LEGACY_SOURCE,
    }
}

/// A resolved equinox.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquinoxResult {
    pub utc: DateTime<Utc>,
    pub precision: Precision,
    pub uncertainty_s: f64,
    pub source: String,
    /// Whether the value came from the cache.
    pub cached: bool,
    pub retrieved_at: DateTime<Utc>,
}

impl EquinoxResult {
    fn from_entry(entry: EquinoxEntry, cached: bool) -> Self {
        Self {
            utc: entry.utc,
            precision: entry.precision,
            uncertainty_s: entry.uncertainty_s,
            source: entry.source,
            cached,
            retrieved_at: entry.retrieved_at,
        }
    }
}

/// Configuration and cache summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub available_tiers: Vec<Precision>,
    pub default_prefer_order: Vec<Precision>,
    pub prefer_order: Vec<Precision>,
    pub internet_configured: bool,
    pub internet_source: Option<String>,
    pub uncertainty_estimates: BTreeMap<Precision, f64>,
    pub cache: CacheStats,
}

/// Outcome of one tier in [`EquinoxService::compare_tiers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCheck {
    pub tier: Precision,
    pub utc: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Difference between two successful tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierDifference {
    pub first: Precision,
    pub second: Precision,
    pub difference_seconds: f64,
    /// `difference_seconds ≤ AGREEMENT_SECONDS`
    pub within_tolerance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierComparison {
    pub year: i32,
    pub checks: Vec<TierCheck>,
    pub differences: Vec<TierDifference>,
}

impl TierComparison {
    pub fn successful(&self) -> usize {
        self.checks.iter().filter(|c| c.utc.is_some()).count()
    }
}

/// Tiered equinox resolver over a shared [`EquinoxCache`].
pub struct EquinoxService {
    cache: Arc<EquinoxCache>,
    source: Option<Box<dyn EquinoxSource>>,
    finder: EquinoxFinder<SolarModel>,
    prefer_order: Vec<Precision>,
}

impl fmt::Debug for EquinoxService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquinoxService")
            .field("cache", &self.cache)
            .field("source", &self.source.as_ref().map(|s| s.describe()))
            .field("prefer_order", &self.prefer_order)
            .finish()
    }
}

impl EquinoxService {
    /// Service with no remote source and the built-in solar model.
    pub fn new(cache: Arc<EquinoxCache>) -> Self {
        Self {
            cache,
            source: None,
            finder: analytic_finder(SolarModel::new()),
            prefer_order: DEFAULT_PREFER_ORDER.to_vec(),
        }
    }

    /// Build from a [`Config`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the configured URL is unusable.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = Arc::new(EquinoxCache::new(config.cache_file()));
        let solar = match &config.coefficient_dir {
            Some(dir) => SolarModel::with_coefficient_dir(dir.clone()).with_error_budget(ANALYTIC_ERROR_BUDGET),
            None => SolarModel::new(),
        };
        let mut service = Self::new(cache)
            .with_solar_model(solar)
            .with_prefer_order(config.prefer_order.clone());
        if let Some(url) = &config.equinox_url {
            service = service.with_source(HttpEquinoxSource::new(url, config.fetch_timeout)?);
        }
        Ok(service)
    }

    /// Shorthand for [`Config::from_env`] followed by [`Self::from_config`].
    pub fn from_env() -> Result<Self> {
        Self::from_config(&Config::from_env()?)
    }

    /// Enable the internet tier with `source`.
    pub fn with_source(mut self, source: impl EquinoxSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Solar model used by the analytic tier and by validation.
    pub fn with_solar_model(mut self, solar: SolarModel) -> Self {
        self.finder = analytic_finder(solar);
        self
    }

    pub fn with_prefer_order(mut self, order: Vec<Precision>) -> Self {
        self.prefer_order = order;
        self
    }

    pub fn cache(&self) -> &EquinoxCache {
        &self.cache
    }

    pub fn prefer_order(&self) -> &[Precision] {
        &self.prefer_order
    }

    /// Vernal equinox of `year`.
    ///
    /// `prefer_order` overrides the configured tier order for this call.
    ///
    /// # Errors
    /// [`Error::AllTiersFailed`] with one `"tier: reason"` line per tier.
    pub fn get_vernal_equinox(&self, year: i32, prefer_order: Option<&[Precision]>) -> Result<EquinoxResult> {
        if let Some(entry) = self.cache.get(year) {
            return Ok(EquinoxResult::from_entry(entry, true));
        }

        let order = prefer_order.unwrap_or(self.prefer_order.as_slice());
        let mut reasons = Vec::with_capacity(order.len());

        for &tier in order {
            match self.run_tier(tier, year) {
                Ok(utc) => {
                    info!("Equinox {} resolved by {} tier: {}", year, tier, utc);
                    let entry = self
                        .cache
                        .entry(utc, tier, tier_uncertainty_s(tier), tier_source(tier));
                    if let Err(err) = self.cache.set(year, entry.clone()) {
                        warn!("Failed to cache equinox {}: {}", year, err);
                    }
                    return Ok(EquinoxResult::from_entry(entry, false));
                }
                Err(err) => {
                    debug!("{} tier unavailable for {}: {}", tier, year, err);
                    reasons.push(format!("{tier}: {err}"));
                }
            }
        }

        Err(Error::AllTiersFailed { year, reasons })
    }

    /// Like [`Self::get_vernal_equinox`] with the configured order, instant only.
    pub fn vernal_equinox_utc(&self, year: i32) -> Result<DateTime<Utc>> {
        self.get_vernal_equinox(year, None).map(|r| r.utc)
    }

    /// The astronomical year containing `t`, with both equinoxes resolved.
    pub fn astro_year(&self, t: DateTime<Utc>) -> Result<AstroYear> {
        AstroYear::containing(t, |year| self.vernal_equinox_utc(year))
    }

    /// Run a single tier without touching the cache.
    pub fn run_tier(&self, tier: Precision, year: i32) -> std::result::Result<DateTime<Utc>, TierError> {
        match tier {
            Precision::Internet => self.internet(year),
            Precision::Analytic => self.analytic(year),
            Precision::Approx => approximate(year),
        }
    }

    fn internet(&self, year: i32) -> std::result::Result<DateTime<Utc>, TierError> {
        let source = self.source.as_ref().ok_or(TierError::NotConfigured)?;
        let t = source.fetch(year).inspect_err(|err| {
            if matches!(err, TierError::Rejected(_)) {
                warn!("Rejected equinox from {}: {}", source.describe(), err);
            }
        })?;
        if !validate_equinox_timestamp(&t, year) {
            warn!("Rejected equinox {} from {}: not in March 18-22 of {}", t, source.describe(), year);
            return Err(TierError::Rejected(format!("{t} is not in March 18-22 of {year}")));
        }
        if !self.finder.validate(t, INTERNET_VALIDATION) {
            warn!("Rejected equinox {} from {}: fails {}", t, source.describe(), INTERNET_VALIDATION);
            return Err(TierError::Rejected(format!(
                "{t} is not within {INTERNET_VALIDATION} of the equinox"
            )));
        }
        Ok(t)
    }

    fn analytic(&self, year: i32) -> std::result::Result<DateTime<Utc>, TierError> {
        let t = self
            .finder
            .solve(year)
            .map_err(|e| TierError::Solver(e.to_string()))?;
        if !self.finder.validate(t, ANALYTIC_VALIDATION) {
            return Err(TierError::Rejected(format!(
                "{t} is not within {ANALYTIC_VALIDATION} of the equinox"
            )));
        }
        Ok(t)
    }

    /// Every tier's answer for `year`, uncached, with pairwise differences.
    pub fn compare_tiers(&self, year: i32) -> TierComparison {
        let checks: Vec<TierCheck> = Precision::ALL
            .iter()
            .map(|&tier| match self.run_tier(tier, year) {
                Ok(utc) => TierCheck { tier, utc: Some(utc), error: None },
                Err(err) => TierCheck { tier, utc: None, error: Some(err.to_string()) },
            })
            .collect();

        let ok: Vec<(Precision, DateTime<Utc>)> =
            checks.iter().filter_map(|c| c.utc.map(|t| (c.tier, t))).collect();
        let mut differences = Vec::new();
        for (i, &(first, a)) in ok.iter().enumerate() {
            for &(second, b) in &ok[i + 1..] {
                let difference_seconds = (a - b).num_milliseconds().unsigned_abs() as f64 / 1000.0;
                differences.push(TierDifference {
                    first,
                    second,
                    difference_seconds,
                    within_tolerance: difference_seconds <= AGREEMENT_SECONDS,
                });
            }
        }

        TierComparison { year, checks, differences }
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            available_tiers: Precision::ALL.to_vec(),
            default_prefer_order: DEFAULT_PREFER_ORDER.to_vec(),
            prefer_order: self.prefer_order.clone(),
            internet_configured: self.source.is_some(),
            internet_source: self.source.as_ref().map(|s| s.describe()),
            uncertainty_estimates: Precision::ALL
                .iter()
                .map(|&tier| (tier, tier_uncertainty_s(tier)))
                .collect(),
            cache: self.cache.stats(),
        }
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }
}

fn analytic_finder(solar: SolarModel) -> EquinoxFinder<SolarModel> {
    EquinoxFinder::new(solar)
        .with_options(SolverOptions::for_method(SolveMethod::Brent).with_tolerance(ANALYTIC_TOLERANCE))
}

/// Coarse search on the Meeus Sun, or March 20 09:00 UTC if that fails.
fn approximate(year: i32) -> std::result::Result<DateTime<Utc>, TierError> {
    let coarse = EquinoxFinder::new(MeeusSun).with_options(SolverOptions::for_method(SolveMethod::Coarse));
    match coarse.solve(year) {
        Ok(t) => Ok(t),
        Err(err) => {
            debug!("Coarse equinox search failed for {}: {}, using fixed date", year, err);
            Utc.with_ymd_and_hms(year, 3, 20, 9, 0, 0)
                .single()
                .ok_or_else(|| TierError::Solver(format!("year {year} is out of range")))
        }
    }
}
