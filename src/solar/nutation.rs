// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Low-precision nutation and the mean obliquity of the ecliptic.
//!
//! Four-term nutation from Meeus ch. 22 (good to ~0.5″ in longitude and
//! ~0.1″ in obliquity). It is evaluated the same way whatever coefficient
//! table the orbital series uses.

use qtty::*;

use crate::instant::Time;
use crate::scales::JD;

/// Nutation angles and the mean obliquity at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nutation {
    /// Nutation in longitude Δψ.
    pub dpsi: Arcseconds,
    /// Nutation in obliquity Δε.
    pub deps: Arcseconds,
    /// Mean obliquity ε₀.
    pub mean_obliquity: Radians,
}

impl Nutation {
    /// True obliquity ε = ε₀ + Δε.
    pub fn true_obliquity(&self) -> Radians {
        self.mean_obliquity + self.deps.to::<Radian>()
    }
}

/// Mean obliquity of the ecliptic (Laskar 1986).
pub fn mean_obliquity(jd: Time<JD>) -> Radians {
    let t = jd.julian_centuries().value();
    let seconds = 84_381.406 - 46.836_769 * t - 0.000_183_1 * t.powi(2)
        + 0.002_003_40 * t.powi(3)
        - 5.76e-7 * t.powi(4)
        - 4.34e-8 * t.powi(5);
    Arcseconds::new(seconds).to::<Radian>()
}

/// Nutation in longitude and obliquity from the node of the lunar orbit and
/// the mean longitudes of Sun and Moon.
pub fn nutation(jd: Time<JD>) -> Nutation {
    let t = jd.julian_centuries().value();
    let omega = Degrees::new(125.044_52 - 1_934.136_261 * t).wrap_pos();
    let sun = Degrees::new(280.4665 + 36_000.7698 * t).wrap_pos();
    let moon = Degrees::new(218.3165 + 481_267.8813 * t).wrap_pos();

    let dpsi = -17.20 * omega.sin() - 1.32 * (sun * 2.0).sin() - 0.23 * (moon * 2.0).sin()
        + 0.21 * (omega * 2.0).sin();
    let deps = 9.20 * omega.cos() + 0.57 * (sun * 2.0).cos() + 0.10 * (moon * 2.0).cos()
        - 0.09 * (omega * 2.0).cos();

    Nutation {
        dpsi: Arcseconds::new(dpsi),
        deps: Arcseconds::new(deps),
        mean_obliquity: mean_obliquity(jd),
    }
}
