// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Vernal equinox search over a solar theory.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use qtty::*;
use serde::{Deserialize, Serialize};

use super::solver::{self, RootEstimate};
use crate::error::{Error, Result};
use crate::instant::{Time, UNIX_EPOCH_JD};
use crate::scales::{JD, UT};
use crate::solar::{SolarLongitude, SolarModel};
use crate::timescales::DAY_SECONDS;

/// Mean motion of the Sun in ecliptic longitude, degrees per day.
const MEAN_SOLAR_RATE_DEG_PER_DAY: f64 = 0.985_647_36;

const COARSE_STEP_HOURS: i64 = 6;
const COARSE_STEP_HALVINGS: usize = 10;

/// Signed difference `a − b` normalized into `(−π, π]`.
#[inline]
pub fn angle_difference(a: Radians, b: Radians) -> Radians {
    (a - b).wrap_signed()
}

/// Root-finding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveMethod {
    /// Plain interval halving.
    Bisection,
    /// Brent's guarded inverse-quadratic method.
    #[default]
    Brent,
    /// Step search around March 20 12:00 followed by linear corrections at
    /// the mean solar rate. No bracket required.
    Coarse,
}

impl SolveMethod {
    /// Tolerance used when the caller does not give one.
    pub fn default_tolerance(self) -> Seconds {
        match self {
            SolveMethod::Bisection | SolveMethod::Brent => Seconds::new(1.0),
            SolveMethod::Coarse => Seconds::new(10.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolveMethod::Bisection => "bisection",
            SolveMethod::Brent => "brent",
            SolveMethod::Coarse => "coarse",
        }
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolveMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bisection" => Ok(SolveMethod::Bisection),
            "brent" => Ok(SolveMethod::Brent),
            "coarse" => Ok(SolveMethod::Coarse),
            other => Err(Error::invalid_input(format!(
                "unknown solve method '{other}' (expected bisection, brent or coarse)"
            ))),
        }
    }
}

/// Solver configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    pub method: SolveMethod,
    /// Convergence tolerance on the instant.
    pub tolerance: Seconds,
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self::for_method(SolveMethod::default())
    }
}

impl SolverOptions {
    /// Defaults for `method`: its default tolerance and 30 iterations
    /// (10 corrections for the coarse search).
    pub fn for_method(method: SolveMethod) -> Self {
        Self {
            method,
            tolerance: method.default_tolerance(),
            max_iterations: match method {
                SolveMethod::Coarse => 10,
                _ => 30,
            },
        }
    }

    pub fn with_tolerance(mut self, tolerance: Seconds) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Diagnostics of one equinox solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveStats {
    pub year: i32,
    pub method: SolveMethod,
    pub instant: DateTime<Utc>,
    /// Objective evaluations, bracketing included.
    pub evaluations: usize,
    pub iterations: usize,
    pub converged: bool,
    /// Objective value at `instant`.
    pub residual: Radians,
    /// Sign-change bracket the solver worked in; `None` for the coarse search.
    pub bracket: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl SolveStats {
    pub fn residual_degrees(&self) -> Degrees {
        self.residual.to::<Degree>()
    }

    pub fn bracket_width(&self) -> Option<Seconds> {
        self.bracket
            .map(|(a, b)| Seconds::new((b - a).num_milliseconds() as f64 / 1e3))
    }
}

/// Locates the instant the apparent solar longitude crosses 0°.
#[derive(Debug, Clone)]
pub struct EquinoxFinder<S: SolarLongitude> {
    solar: S,
    options: SolverOptions,
}

impl Default for EquinoxFinder<SolarModel> {
    fn default() -> Self {
        Self::new(SolarModel::new())
    }
}

impl<S: SolarLongitude> EquinoxFinder<S> {
    pub fn new(solar: S) -> Self {
        Self {
            solar,
            options: SolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn solar(&self) -> &S {
        &self.solar
    }

    /// `angle_difference(λ(t), 0)` for a UTC instant.
    pub fn objective(&self, t: DateTime<Utc>) -> Radians {
        angle_difference(self.solar.apparent_longitude(Time::<JD>::from_utc(t)), Radians::new(0.0))
    }

    /// Objective in radians at a Unix timestamp (UTC seconds).
    fn objective_at(&self, unix_seconds: f64) -> f64 {
        let jd_ut = Time::<UT>::new(UNIX_EPOCH_JD + unix_seconds / DAY_SECONDS);
        angle_difference(self.solar.apparent_longitude(jd_ut.to::<JD>()), Radians::new(0.0)).value()
    }

    /// A window around March 20 across which the objective changes sign.
    ///
    /// Tries March 18–22 first, then March 16–24.
    pub fn find_march_bracket(&self, year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        for (first, last) in [(18, 22), (16, 24)] {
            let start = march_midnight(year, first)?;
            let end = march_midnight(year, last)?;
            let f_start = self.objective_at(start.timestamp() as f64);
            let f_end = self.objective_at(end.timestamp() as f64);
            if f_start * f_end <= 0.0 {
                debug!("Equinox {} bracketed by March {}–{}", year, first, last);
                return Ok((start, end));
            }
            debug!("No sign change over March {}–{} {}, widening", first, last, year);
        }
        Err(Error::NoSignChangeFound { year })
    }

    /// Equinox instant for `year`.
    pub fn solve(&self, year: i32) -> Result<DateTime<Utc>> {
        self.solve_with_stats(year).map(|stats| stats.instant)
    }

    /// Equinox instant for `year` with solver diagnostics.
    pub fn solve_with_stats(&self, year: i32) -> Result<SolveStats> {
        let tolerance = self.options.tolerance.value();
        let max_iter = self.options.max_iterations;

        let (estimate, bracket, extra_evaluations) = match self.options.method {
            SolveMethod::Coarse => (self.coarse(year)?, None, 0),
            method => {
                let (start, end) = self.find_march_bracket(year)?;
                let a = start.timestamp() as f64;
                let b = end.timestamp() as f64;
                let f = |x: f64| self.objective_at(x);
                let estimate = match method {
                    SolveMethod::Bisection => solver::bisection(f, a, b, tolerance, max_iter),
                    _ => solver::brent(f, a, b, tolerance, max_iter),
                };
                (estimate, Some((start, end)), 2)
            }
        };

        if !estimate.converged {
            debug!(
                "Equinox {} not converged after {} iterations, returning best estimate",
                year, estimate.iterations
            );
        }

        let instant = datetime_from_unix(estimate.x).ok_or_else(|| {
            Error::invalid_input(format!("equinox estimate {} s is out of range", estimate.x))
        })?;

        Ok(SolveStats {
            year,
            method: self.options.method,
            instant,
            evaluations: estimate.evaluations + extra_evaluations,
            iterations: estimate.iterations,
            converged: estimate.converged,
            residual: Radians::new(estimate.fx),
            bracket,
        })
    }

    /// Step search from March 20 12:00 UTC with a halving 6 h step, then
    /// Newton-style corrections at the mean solar rate.
    fn coarse(&self, year: i32) -> Result<RootEstimate> {
        let guess = Utc
            .with_ymd_and_hms(year, 3, 20, 12, 0, 0)
            .single()
            .ok_or_else(|| Error::invalid_input(format!("year {year} is out of range")))?;

        let mut evaluations = 1;
        let mut best = guess.timestamp() as f64;
        let mut best_value = self.objective_at(best);
        let mut step = (COARSE_STEP_HOURS * 3600) as f64;

        for _ in 0..COARSE_STEP_HALVINGS {
            for candidate in [best - step, best + step] {
                let value = self.objective_at(candidate);
                evaluations += 1;
                if value == 0.0 {
                    return Ok(RootEstimate { x: candidate, fx: 0.0, iterations: 0, evaluations, converged: true });
                }
                if value.abs() < best_value.abs() {
                    best = candidate;
                    best_value = value;
                }
            }
            step /= 2.0;
        }

        let rate = Degrees::new(MEAN_SOLAR_RATE_DEG_PER_DAY).to::<Radian>().value() / DAY_SECONDS;
        let tolerance = self.options.tolerance.value();
        let mut current = best;
        let mut value = best_value;

        for iteration in 1..=self.options.max_iterations {
            let correction = value / rate;
            current -= correction;
            value = self.objective_at(current);
            evaluations += 1;
            if correction.abs() < tolerance {
                return Ok(RootEstimate { x: current, fx: value, iterations: iteration, evaluations, converged: true });
            }
        }

        Ok(RootEstimate {
            x: current,
            fx: value,
            iterations: self.options.max_iterations,
            evaluations,
            converged: false,
        })
    }

    /// `|objective(t)| ≤ tolerance`.
    pub fn validate(&self, t: DateTime<Utc>, tolerance: Degrees) -> bool {
        self.objective(t).abs().value() <= tolerance.to::<Radian>().value()
    }
}

fn march_midnight(year: i32, day: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 3, day, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::invalid_input(format!("year {year} is out of range")))
}

fn datetime_from_unix(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(secs as i64, nanos)
}

/// Vernal equinox of `year` with the built-in solar model.
///
/// `tolerance` defaults to the method's default tolerance and `method` to
/// Brent.
pub fn compute_vernal_equinox(
    year: i32,
    tolerance: Option<Seconds>,
    method: Option<SolveMethod>,
) -> Result<DateTime<Utc>> {
    let method = method.unwrap_or_default();
    let mut options = SolverOptions::for_method(method);
    if let Some(tolerance) = tolerance {
        options = options.with_tolerance(tolerance);
    }
    EquinoxFinder::new(SolarModel::new()).with_options(options).solve(year)
}

/// Whether `t` is within `tolerance` of the equinox under the built-in model.
pub fn validate_equinox_solution(t: DateTime<Utc>, tolerance: Degrees) -> bool {
    EquinoxFinder::new(SolarModel::new()).validate(t, tolerance)
}
