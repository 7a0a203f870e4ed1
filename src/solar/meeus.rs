// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Low-precision Sun (Meeus ch. 25): geometric mean longitude plus the
//! equation of the centre, corrected for aberration and the dominant
//! nutation term. Accurate to about 0.01°.

use qtty::*;

use super::{ApparentSun, SolarLongitude, ABERRATION_ARCSEC};
use crate::instant::Time;
use crate::scales::JD;

/// Analytic low-precision solar theory.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MeeusSun;

impl MeeusSun {
    /// Apparent longitude and Sun–Earth distance at `jd` (TT axis).
    pub fn apparent(&self, jd: Time<JD>) -> ApparentSun {
        let t = jd.julian_centuries().value();

        let mean_longitude = Degrees::new(280.466_46 + t * (36_000.769_83 + t * 0.000_303_2));
        let mean_anomaly = Degrees::new(357.529_11 + t * (35_999.050_29 - t * 0.000_153_7));
        let eccentricity = 0.016_708_634 - t * (0.000_042_037 + t * 0.000_000_126_7);

        let centre = (1.914_602 - t * (0.004_817 + 0.000_014 * t)) * mean_anomaly.sin()
            + (0.019_993 - 0.000_101 * t) * (mean_anomaly * 2.0).sin()
            + 0.000_289 * (mean_anomaly * 3.0).sin();

        let true_longitude = mean_longitude + Degrees::new(centre);
        let true_anomaly = mean_anomaly + Degrees::new(centre);
        let radius = 1.000_001_018 * (1.0 - eccentricity * eccentricity)
            / (1.0 + eccentricity * true_anomaly.cos());

        let node = Degrees::new(125.044_52 - 1_934.136_261 * t + 0.002_070_8 * t * t + t.powi(3) / 450_000.0);
        let dpsi = Arcseconds::new(-17.20 * node.sin());
        let aberration = Arcseconds::new(-ABERRATION_ARCSEC / radius);

        let longitude = (true_longitude.to::<Radian>()
            + dpsi.to::<Radian>()
            + aberration.to::<Radian>())
        .wrap_pos();

        ApparentSun {
            longitude,
            distance: AstronomicalUnits::new(radius),
        }
    }
}

impl SolarLongitude for MeeusSun {
    fn apparent_longitude(&self, jd: Time<JD>) -> Radians {
        self.apparent(jd).longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeus_example_25a() {
        // 1992-10-13.0 TD: apparent λ = 199.90895° (low-precision method), R = 0.99766 AU
        let sun = MeeusSun.apparent(Time::<JD>::new(2_448_908.5));
        let lambda = sun.longitude.to::<Degree>().value();
        assert!((lambda - 199.908_95).abs() < 0.002, "λ = {lambda}");
        assert!((sun.distance.value() - 0.997_66).abs() < 1e-4);
    }

    #[test]
    fn longitude_advances_about_one_degree_per_day() {
        let a = MeeusSun.apparent_longitude(Time::<JD>::new(2_460_000.5));
        let b = MeeusSun.apparent_longitude(Time::<JD>::new(2_460_001.5));
        let rate = (b - a).wrap_signed().to::<Degree>().value();
        assert!((rate - 0.9856).abs() < 0.05, "rate = {rate}");
    }
}
