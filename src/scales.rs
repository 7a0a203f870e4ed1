// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time-scale marker types.
//!
//! | Marker | Axis |
//! |--------|------|
//! | [`JD`] | Julian Date on the TT axis (what the solar series consume) |
//! | [`TT`] | Terrestrial Time, numerically identical to [`JD`] |
//! | [`UT`] | Julian Date on the civil (UTC) axis; `TT = UT + ΔT` |

use super::instant::TimeScale;
use qtty::Days;

/// Julian Date on the TT axis — the identity scale.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct JD;

impl TimeScale for JD {
    const LABEL: &'static str = "Julian Day:";

    #[inline(always)]
    fn to_jd_tt(value: Days) -> Days {
        value
    }

    #[inline(always)]
    fn from_jd_tt(jd_tt: Days) -> Days {
        jd_tt
    }
}

/// Terrestrial Time.
///
/// A semantic label for the same axis as [`JD`].
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct TT;

impl TimeScale for TT {
    const LABEL: &'static str = "TT";

    #[inline(always)]
    fn to_jd_tt(value: Days) -> Days {
        value
    }

    #[inline(always)]
    fn from_jd_tt(jd_tt: Days) -> Days {
        jd_tt
    }
}

/// Universal Time — the civil scale tied to Earth's rotation.
///
/// `UT → JD(TT)` adds the Espenak & Meeus ΔT evaluated at the decimal year
/// of the UT value. The inverse solves `ut + ΔT(ut) = tt` by fixed-point
/// iteration; ΔT changes by well under a second per day, so three steps
/// leave a sub-microsecond residual.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct UT;

impl TimeScale for UT {
    const LABEL: &'static str = "UT";

    #[inline]
    fn to_jd_tt(ut_value: Days) -> Days {
        let dt_secs = super::delta_t::delta_t_from_jd_ut(ut_value.value());
        ut_value + Days::new(dt_secs / super::timescales::DAY_SECONDS)
    }

    #[inline]
    fn from_jd_tt(jd_tt: Days) -> Days {
        let mut ut = jd_tt;
        for _ in 0..3 {
            let dt_secs = super::delta_t::delta_t_from_jd_ut(ut.value());
            ut = jd_tt - Days::new(dt_secs / super::timescales::DAY_SECONDS);
        }
        ut
    }
}

/// Generate pairwise `From<Time<A>> for Time<B>` implementations.
macro_rules! impl_time_conversions {
    ($single:ty) => {};

    ($first:ty, $($rest:ty),+ $(,)?) => {
        $(
            impl From<super::instant::Time<$first>> for super::instant::Time<$rest> {
                #[inline]
                fn from(t: super::instant::Time<$first>) -> Self {
                    t.to::<$rest>()
                }
            }

            impl From<super::instant::Time<$rest>> for super::instant::Time<$first> {
                #[inline]
                fn from(t: super::instant::Time<$rest>) -> Self {
                    t.to::<$first>()
                }
            }
        )+

        impl_time_conversions!($($rest),+);
    };
}

impl_time_conversions!(JD, TT, UT);
