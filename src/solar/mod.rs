// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Solar Position Model
//!
//! Apparent geocentric ecliptic longitude of the Sun from a truncated
//! VSOP87D Earth series:
//!
//! ```text
//! L, B, R (heliocentric, of date)
//!   └─► λ_geo = L + π
//!         └─► λ = λ_geo + Δψ·cos ε₀ − 20.4898″/R
//! ```
//!
//! [`SolarModel`] owns the coefficient tables. Given an error budget it
//! selects a generated table through [`CoefficientProvider::select`], loads
//! it once, and keeps using the same table for that budget for the life of
//! the model. Load failures are logged and fall back to the built-in table.
//!
//! [`MeeusSun`] is a cheaper analytic theory behind the same
//! [`SolarLongitude`] trait.

mod builtin;
pub mod coefficients;
mod meeus;
mod nutation;
mod series;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;
use qtty::*;

use crate::instant::Time;
use crate::scales::JD;

pub use builtin::{builtin_coefficients, BUILTIN_ERROR_BOUND_ARCSEC};
pub use coefficients::{CoefficientCatalog, CoefficientProvider, DirectoryCatalog, TableCandidate};
pub use meeus::MeeusSun;
pub use nutation::{mean_obliquity, nutation, Nutation};
pub use series::{Bands, CoefficientSet, HeliocentricPosition, Term};

/// Annual aberration constant.
pub(super) const ABERRATION_ARCSEC: f64 = 20.4898;

/// A solar theory usable by the equinox root finder.
pub trait SolarLongitude {
    /// Apparent geocentric ecliptic longitude in `[0, 2π)` at `jd` (TT axis).
    fn apparent_longitude(&self, jd: Time<JD>) -> Radians;
}

impl<T: SolarLongitude + ?Sized> SolarLongitude for &T {
    fn apparent_longitude(&self, jd: Time<JD>) -> Radians {
        (**self).apparent_longitude(jd)
    }
}

impl<T: SolarLongitude + ?Sized> SolarLongitude for Arc<T> {
    fn apparent_longitude(&self, jd: Time<JD>) -> Radians {
        (**self).apparent_longitude(jd)
    }
}

/// Apparent longitude together with the Sun–Earth distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentSun {
    pub longitude: Radians,
    pub distance: AstronomicalUnits,
}

/// Series-based solar model with per-budget coefficient selection.
pub struct SolarModel {
    catalog: Option<Box<dyn CoefficientCatalog>>,
    budget: Option<Arcseconds>,
    builtin: Arc<CoefficientSet>,
    tables: Mutex<HashMap<PathBuf, Arc<CoefficientSet>>>,
    chosen: Mutex<HashMap<u64, Arc<CoefficientSet>>>,
}

impl std::fmt::Debug for SolarModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolarModel")
            .field("has_catalog", &self.catalog.is_some())
            .field("budget", &self.budget)
            .field("loaded_tables", &self.tables.lock().len())
            .finish()
    }
}

impl Default for SolarModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SolarModel {
    /// Model using only the built-in table.
    pub fn new() -> Self {
        Self {
            catalog: None,
            budget: None,
            builtin: Arc::new(builtin_coefficients()),
            tables: Mutex::new(HashMap::new()),
            chosen: Mutex::new(HashMap::new()),
        }
    }

    /// Model that may select tables enumerated by `catalog`.
    pub fn with_catalog(catalog: impl CoefficientCatalog + 'static) -> Self {
        Self {
            catalog: Some(Box::new(catalog)),
            ..Self::new()
        }
    }

    /// Shorthand for a [`DirectoryCatalog`] over `dir`.
    pub fn with_coefficient_dir(dir: impl Into<PathBuf>) -> Self {
        Self::with_catalog(DirectoryCatalog::new(dir))
    }

    /// Error budget used by the [`SolarLongitude`] impl.
    pub fn with_error_budget(mut self, max_error: Arcseconds) -> Self {
        self.budget = Some(max_error);
        self
    }

    /// Which provider a given budget selects right now.
    pub fn provider_for(&self, max_error: Option<Arcseconds>) -> CoefficientProvider {
        match (&self.catalog, max_error) {
            (Some(catalog), Some(_)) => CoefficientProvider::select(max_error, &catalog.enumerate()),
            _ => CoefficientProvider::BuiltinDefault,
        }
    }

    /// Coefficient table for `max_error`.
    ///
    /// The first call for a budget selects and loads a table; later calls
    /// with the same budget return that same table.
    pub fn coefficients(&self, max_error: Option<Arcseconds>) -> Arc<CoefficientSet> {
        let Some(budget) = max_error else {
            return Arc::clone(&self.builtin);
        };
        if self.catalog.is_none() {
            return Arc::clone(&self.builtin);
        }

        let key = budget.value().to_bits();
        if let Some(set) = self.chosen.lock().get(&key) {
            return Arc::clone(set);
        }

        let set = match self.provider_for(max_error) {
            CoefficientProvider::BuiltinDefault => Arc::clone(&self.builtin),
            CoefficientProvider::FromTable { path, error_bound } => {
                debug!(
                    "Budget {}″ selects {} (bound {}″)",
                    budget.value(),
                    path.display(),
                    error_bound.value()
                );
                self.load(path)
            }
        };

        Arc::clone(self.chosen.lock().entry(key).or_insert(set))
    }

    fn load(&self, path: PathBuf) -> Arc<CoefficientSet> {
        if let Some(set) = self.tables.lock().get(&path) {
            return Arc::clone(set);
        }
        match coefficients::load_table(&path) {
            Ok(set) => {
                let set = Arc::new(set);
                self.tables.lock().insert(path, Arc::clone(&set));
                set
            }
            Err(err) => {
                warn!("Failed to load coefficient table, using built-in: {}", err);
                Arc::clone(&self.builtin)
            }
        }
    }

    /// Earth's heliocentric position at `jd`.
    pub fn heliocentric(&self, jd: Time<JD>, max_error: Option<Arcseconds>) -> HeliocentricPosition {
        self.coefficients(max_error).heliocentric(jd)
    }

    /// Apparent longitude and distance of the Sun at `jd`.
    pub fn apparent(&self, jd: Time<JD>, max_error: Option<Arcseconds>) -> ApparentSun {
        apparent_from(&self.heliocentric(jd, max_error), jd)
    }

    /// Apparent geocentric solar longitude in `[0, 2π)` at `jd`.
    pub fn apparent_solar_longitude(&self, jd: Time<JD>, max_error: Option<Arcseconds>) -> Radians {
        self.apparent(jd, max_error).longitude
    }
}

impl SolarLongitude for SolarModel {
    fn apparent_longitude(&self, jd: Time<JD>) -> Radians {
        self.apparent_solar_longitude(jd, self.budget)
    }
}

/// Apparent solar longitude from the built-in table.
pub fn apparent_solar_longitude(jd: Time<JD>) -> Radians {
    apparent_from(&builtin_coefficients().heliocentric(jd), jd).longitude
}

fn apparent_from(pos: &HeliocentricPosition, jd: Time<JD>) -> ApparentSun {
    let geocentric = (pos.longitude + Radians::HALF_TURN).wrap_pos();
    let nut = nutation(jd);
    let nutation_term = nut.dpsi.to::<Radian>() * nut.mean_obliquity.cos();
    let aberration = Arcseconds::new(-ABERRATION_ARCSEC / pos.radius.value()).to::<Radian>();
    ApparentSun {
        longitude: (geocentric + nutation_term + aberration).wrap_pos(),
        distance: pos.radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TABLE: &str = "Conservative error bound (longitude): 0.500 arcseconds\n\
        L0 = [\n    (175347046.0, 0.0, 0.0),\n]\n\
        L1 = [\n    (628331966747.0, 0.0, 0.0),\n]\n\
        R0 = [\n    (100000000.0, 0.0, 0.0),\n]\n";

    #[test]
    fn meeus_example_25b_apparent() {
        // 1992-10-13.0 TD: apparent λ = 199.906061°
        let lambda = apparent_solar_longitude(Time::<JD>::new(2_448_908.5))
            .to::<Degree>()
            .value();
        assert!((lambda - 199.906_061).abs() < 0.003, "λ = {lambda}");
    }

    #[test]
    fn series_and_meeus_agree_closely() {
        for jd in [2_451_545.0, 2_455_000.5, 2_460_389.5, 2_462_000.25] {
            let jd = Time::<JD>::new(jd);
            let series = apparent_solar_longitude(jd);
            let meeus = MeeusSun.apparent_longitude(jd);
            let diff = (series - meeus).wrap_signed().abs().to::<Degree>().value();
            assert!(diff < 0.015, "diff {diff}° at {jd}");
        }
    }

    #[test]
    fn model_without_catalog_uses_builtin() {
        let model = SolarModel::new();
        let jd = Time::<JD>::new(2_460_000.5);
        assert_eq!(
            model.provider_for(Some(Arcseconds::new(0.1))),
            CoefficientProvider::BuiltinDefault
        );
        assert_eq!(
            model.apparent_solar_longitude(jd, Some(Arcseconds::new(0.1))),
            apparent_solar_longitude(jd)
        );
    }

    #[test]
    fn budget_selects_generated_table_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vsop87d_earth_fine.py");
        fs::write(&path, TABLE).unwrap();

        let model = SolarModel::with_coefficient_dir(dir.path());
        let budget = Some(Arcseconds::new(1.0));
        let first = model.coefficients(budget);
        assert_eq!(first.term_count(), 3);

        // Removing the file must not change the table chosen for this budget.
        fs::remove_file(&path).unwrap();
        let second = model.coefficients(budget);
        assert!(Arc::ptr_eq(&first, &second));

        // A budget the table cannot meet uses the built-in table.
        let coarse = model.coefficients(Some(Arcseconds::new(0.1)));
        assert_eq!(coarse.term_count(), builtin_coefficients().term_count());
    }

    #[test]
    fn unloadable_table_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("vsop87d_earth_broken.py"),
            "Conservative error bound (longitude): 0.200 arcseconds\nL0 = [\n    (oops),\n]\n",
        )
        .unwrap();

        let model = SolarModel::with_coefficient_dir(dir.path());
        let jd = Time::<JD>::new(2_460_389.5);
        let lambda = model.apparent_solar_longitude(jd, Some(Arcseconds::new(1.0)));
        assert_eq!(lambda, apparent_solar_longitude(jd));
    }

    #[test]
    fn trait_uses_configured_budget() {
        let model = SolarModel::new().with_error_budget(Arcseconds::new(5.0));
        let jd = Time::<JD>::new(2_451_545.0);
        assert_eq!(model.apparent_longitude(jd), apparent_solar_longitude(jd));
        let by_ref: &dyn SolarLongitude = &model;
        assert_eq!(by_ref.apparent_longitude(jd), apparent_solar_longitude(jd));
    }
}
