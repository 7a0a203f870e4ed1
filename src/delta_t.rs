// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # ΔT (Delta T) — UTC↔TT Correction Layer
//!
//! Piecewise polynomial model for **ΔT = TT − UTC** from Espenak & Meeus,
//! *Five Millennium Canon of Solar Eclipses* (NASA TP-2006-214141).
//!
//! Each segment is evaluated on a locally shifted time variable
//! `τ = year − anchor` (centuries for the two oldest segments). Segment
//! break-points are 948, 1600, 1700, 1800, 1860, 1900, 1920, 1941, 1961,
//! 1986, 2005 and 2050; past 2050 the long-term parabola
//! `ΔT = −20 + 32·u²`, `u = (year − 1820)/100` takes over.
//!
//! The polynomials are only approximately continuous at the break-points.
//! The small jumps are a property of the published model and are kept.
//!
//! ## Integration with Time Scales
//!
//! The [`UT`](super::UT) marker applies this model automatically when
//! converting to any TT-based scale, and [`time_scales`](super::time_scales)
//! reports the value it used.

/// **Years < 948 CE**
#[inline]
fn delta_t_ancient(y: f64) -> f64 {
    let u = (y - 2000.0) / 100.0;
    2177.0 + 497.0 * u + 44.1 * u * u
}

/// **Years 948–1600 CE**
#[inline]
fn delta_t_medieval(y: f64) -> f64 {
    let u = (y - 2000.0) / 100.0;
    102.0 + 102.0 * u + 25.3 * u * u
}

/// **Years 1600–1700**
#[inline]
fn delta_t_1600(y: f64) -> f64 {
    let t = y - 1600.0;
    120.0 - 0.9808 * t - 0.01532 * t.powi(2) + t.powi(3) / 7129.0
}

/// **Years 1700–1800**
#[inline]
fn delta_t_1700(y: f64) -> f64 {
    let t = y - 1700.0;
    8.83 + 0.1603 * t - 0.005_928_5 * t.powi(2) + 0.000_133_36 * t.powi(3)
        - t.powi(4) / 1_174_000.0
}

/// **Years 1800–1860**
#[inline]
fn delta_t_1800(y: f64) -> f64 {
    let t = y - 1800.0;
    13.72 - 0.332_447 * t + 0.006_861_2 * t.powi(2) + 0.004_111_6 * t.powi(3)
        - 0.000_374_36 * t.powi(4)
        + 0.000_012_127_2 * t.powi(5)
        - 0.000_000_169_9 * t.powi(6)
        + 0.000_000_000_875 * t.powi(7)
}

/// **Years 1860–1900**
#[inline]
fn delta_t_1860(y: f64) -> f64 {
    let t = y - 1860.0;
    7.62 + 0.5737 * t - 0.251_754 * t.powi(2) + 0.016_806_68 * t.powi(3)
        - 0.000_447_362_4 * t.powi(4)
        + t.powi(5) / 233_174.0
}

/// **Years 1900–1920**
#[inline]
fn delta_t_1900(y: f64) -> f64 {
    let t = y - 1900.0;
    -2.79 + 1.494_119 * t - 0.059_893_9 * t.powi(2) + 0.006_196_6 * t.powi(3)
        - 0.000_197 * t.powi(4)
}

/// **Years 1920–1941**
#[inline]
fn delta_t_1920(y: f64) -> f64 {
    let t = y - 1920.0;
    21.20 + 0.844_93 * t - 0.076_100 * t.powi(2) + 0.002_093_6 * t.powi(3)
}

/// **Years 1941–1961** (anchored at 1950)
#[inline]
fn delta_t_1941(y: f64) -> f64 {
    let t = y - 1950.0;
    29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
}

/// **Years 1961–1986** (anchored at 1975)
#[inline]
fn delta_t_1961(y: f64) -> f64 {
    let t = y - 1975.0;
    45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
}

/// **Years 1986–2005** (anchored at 2000)
#[inline]
fn delta_t_1986(y: f64) -> f64 {
    let t = y - 2000.0;
    63.86 + 0.3345 * t - 0.060_374 * t.powi(2)
        + 0.001_727_5 * t.powi(3)
        + 0.000_651_814 * t.powi(4)
        + 0.000_023_735_99 * t.powi(5)
}

/// **Years 2005–2050** (anchored at 2000)
#[inline]
fn delta_t_2005(y: f64) -> f64 {
    let t = y - 2000.0;
    62.92 + 0.322_17 * t + 0.005_589 * t.powi(2)
}

/// **Years > 2050** — long-term parabola.
#[inline]
fn delta_t_extrapolated(y: f64) -> f64 {
    let u = (y - 1820.0) / 100.0;
    -20.0 + 32.0 * u * u
}

/// Returns **ΔT** in seconds for a decimal year (e.g. `2024.5`).
///
/// Pure and total over `f64`; 2050.0 itself still belongs to the 2005–2050
/// segment.
pub fn delta_t_seconds(decimal_year: f64) -> f64 {
    match decimal_year {
        y if y < 948.0 => delta_t_ancient(y),
        y if y < 1600.0 => delta_t_medieval(y),
        y if y < 1700.0 => delta_t_1600(y),
        y if y < 1800.0 => delta_t_1700(y),
        y if y < 1860.0 => delta_t_1800(y),
        y if y < 1900.0 => delta_t_1860(y),
        y if y < 1920.0 => delta_t_1900(y),
        y if y < 1941.0 => delta_t_1920(y),
        y if y < 1961.0 => delta_t_1941(y),
        y if y < 1986.0 => delta_t_1961(y),
        y if y < 2005.0 => delta_t_1986(y),
        y if y <= 2050.0 => delta_t_2005(y),
        y => delta_t_extrapolated(y),
    }
}

/// ΔT for a Julian day on the UT axis, using the Julian-year decimal year
/// `2000 + (jd − J2000)/365.25`.
#[inline]
pub(crate) fn delta_t_from_jd_ut(jd_ut: f64) -> f64 {
    const J2000: f64 = 2_451_545.0;
    delta_t_seconds(2000.0 + (jd_ut - J2000) / 365.25)
}
