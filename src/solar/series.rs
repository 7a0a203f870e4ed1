// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! VSOP87-style periodic series for Earth's heliocentric position.
//!
//! Each coordinate (L, B, R) is a polynomial in `t` (Julian millennia since
//! J2000.0 TT) whose six coefficients are themselves sums of
//! `A·cos(B + C·t)` terms. Amplitudes are stored in units of 1e-8 rad (L, B)
//! or 1e-8 AU (R).

use std::borrow::Cow;

use qtty::*;

use crate::instant::Time;
use crate::scales::JD;

/// One periodic term `(amplitude, phase, frequency)`.
pub type Term = (f64, f64, f64);

/// Six power-of-`t` bands of periodic terms.
pub type Bands = [Cow<'static, [Term]>; 6];

const SERIES_SCALE: f64 = 1e8;

/// Earth's heliocentric ecliptic position of date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeliocentricPosition {
    /// Longitude in `[0, 2π)`.
    pub longitude: Radians,
    pub latitude: Radians,
    pub radius: AstronomicalUnits,
}

/// A complete L/B/R coefficient table.
///
/// The built-in table borrows static slices; tables read from disk own their
/// terms.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    pub(crate) l: Bands,
    pub(crate) b: Bands,
    pub(crate) r: Bands,
}

impl CoefficientSet {
    pub fn new(l: Bands, b: Bands, r: Bands) -> Self {
        Self { l, b, r }
    }

    /// Total number of periodic terms across all eighteen bands.
    pub fn term_count(&self) -> usize {
        [&self.l, &self.b, &self.r]
            .iter()
            .flat_map(|bands| bands.iter())
            .map(|band| band.len())
            .sum()
    }

    /// Heliocentric longitude, latitude and radius at `jd` (TT axis).
    pub fn heliocentric(&self, jd: Time<JD>) -> HeliocentricPosition {
        let t = jd.julian_millennias().value();
        HeliocentricPosition {
            longitude: Radians::new(evaluate(&self.l, t) / SERIES_SCALE).wrap_pos(),
            latitude: Radians::new(evaluate(&self.b, t) / SERIES_SCALE),
            radius: AstronomicalUnits::new(evaluate(&self.r, t) / SERIES_SCALE),
        }
    }
}

#[inline]
fn sum_terms(terms: &[Term], t: f64) -> f64 {
    terms
        .iter()
        .map(|&(a, b, c)| a * (b + c * t).cos())
        .sum()
}

/// `Σₙ (Σ A·cos(B + C·t)) · tⁿ`
fn evaluate(bands: &Bands, t: f64) -> f64 {
    let mut power = 1.0;
    let mut total = 0.0;
    for band in bands.iter() {
        total += sum_terms(band, t) * power;
        power *= t;
    }
    total
}
