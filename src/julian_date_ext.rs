// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Julian Date (`Time<JD>`) specific extensions.

use qtty::*;

use super::instant::Time;
use super::scales::JD;

impl Time<JD> {
    /// J2000.0 epoch: 2000-01-01T12:00:00 TT  (JD 2 451 545.0).
    pub const J2000: Self = Self::new(2_451_545.0);

    /// One Julian century expressed in days.
    pub const JULIAN_CENTURY: Days = Days::new(36_525.0);

    /// One Julian millennium expressed in days.
    pub const JULIAN_MILLENNIUM: Days = Days::new(365_250.0);

    /// Julian millennia since J2000.0 (the VSOP87 time argument).
    #[inline]
    pub fn julian_millennias(&self) -> Millennia {
        Millennia::new(
            ((*self - Self::J2000) / Self::JULIAN_MILLENNIUM)
                .simplify()
                .value(),
        )
    }

    /// Julian centuries since J2000.0 (nutation, obliquity, Meeus Sun).
    #[inline]
    pub fn julian_centuries(&self) -> Centuries {
        Centuries::new(
            ((*self - Self::J2000) / Self::JULIAN_CENTURY)
                .simplify()
                .value(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn j2000_has_zero_arguments() {
        assert_eq!(Time::<JD>::J2000.julian_centuries().value(), 0.0);
        assert_eq!(Time::<JD>::J2000.julian_millennias().value(), 0.0);
    }

    #[test]
    fn one_millennium_is_ten_centuries() {
        let jd = Time::<JD>::J2000 + Time::<JD>::JULIAN_MILLENNIUM;
        assert!((jd.julian_millennias().value() - 1.0).abs() < 1e-15);
        assert!((jd.julian_centuries().value() - 10.0).abs() < 1e-12);
    }
}
