// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Scale-tagged Julian day instant.
//!
//! [`Time<S>`] stores a scalar quantity in [`Days`] whose meaning is fixed by
//! the compile-time marker `S: TimeScale`. The solar model only ever sees
//! `Time<JD>` (a Julian day on the TT axis); civil instants enter through
//! [`Time::from_utc`], which routes through the [`UT`](super::UT) scale and
//! therefore picks up ΔT automatically.

use chrono::{DateTime, Utc};
use qtty::*;
use std::marker::PhantomData;
use std::ops::{Add, Sub};

/// JD of the Unix epoch (1970-01-01T00:00:00Z) on the UT axis.
pub(crate) const UNIX_EPOCH_JD: f64 = 2_440_587.5;

// ═══════════════════════════════════════════════════════════════════════════
// TimeScale trait
// ═══════════════════════════════════════════════════════════════════════════

/// Marker trait for time scales.
///
/// A scale provides a display label and the two conversions between its
/// native quantity (in [`Days`]) and the canonical **JD(TT)**.
pub trait TimeScale: Copy + Clone + std::fmt::Debug + PartialEq + PartialOrd + 'static {
    /// Display label used by [`Time`] formatting.
    const LABEL: &'static str;

    /// Convert a quantity in this scale's native unit to an absolute JD(TT).
    fn to_jd_tt(value: Days) -> Days;

    /// Convert an absolute JD(TT) back to this scale's native quantity.
    fn from_jd_tt(jd_tt: Days) -> Days;
}

// ═══════════════════════════════════════════════════════════════════════════
// Time<S>
// ═══════════════════════════════════════════════════════════════════════════

/// A point on time scale `S`, layout-identical to a single `f64`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Time<S: TimeScale> {
    quantity: Days,
    _scale: PhantomData<S>,
}

impl<S: TimeScale> Time<S> {
    /// Create from a raw scalar (days since the scale's epoch).
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self {
            quantity: Days::new(value),
            _scale: PhantomData,
        }
    }

    /// Create from a [`Days`] quantity.
    #[inline]
    pub const fn from_days(days: Days) -> Self {
        Self {
            quantity: days,
            _scale: PhantomData,
        }
    }

    /// The underlying quantity in days.
    #[inline]
    pub const fn quantity(&self) -> Days {
        self.quantity
    }

    /// The underlying scalar value in days.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.quantity.value()
    }

    /// Convert this instant to another time scale through JD(TT).
    #[inline]
    pub fn to<T: TimeScale>(&self) -> Time<T> {
        Time::<T>::from_days(T::from_jd_tt(S::to_jd_tt(self.quantity)))
    }

    /// Convert to a `chrono::DateTime<Utc>`, undoing the ΔT correction.
    ///
    /// Returns `None` if the value falls outside chrono's representable range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        use super::scales::UT;
        let jd_ut = self.to::<UT>().quantity();
        let seconds_since_epoch = (jd_ut - Days::new(UNIX_EPOCH_JD)).to::<Second>().value();
        let secs = seconds_since_epoch.floor() as i64;
        let nanos = ((seconds_since_epoch - secs as f64) * 1e9) as u32;
        DateTime::<Utc>::from_timestamp(secs, nanos.min(999_999_999))
    }

    /// Build an instant from a UTC timestamp.
    ///
    /// The timestamp is placed on the [`UT`](super::UT) axis and converted to
    /// `S`, so ΔT is applied for every TT-based target.
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        use super::scales::UT;
        let seconds_since_epoch = Seconds::new(datetime.timestamp() as f64);
        let nanos = Seconds::new(datetime.timestamp_subsec_nanos() as f64 / 1e9);
        let jd_ut = Days::new(UNIX_EPOCH_JD) + (seconds_since_epoch + nanos).to::<Day>();
        Time::<UT>::from_days(jd_ut).to::<S>()
    }
}

impl<S: TimeScale> std::fmt::Display for Time<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", S::LABEL, self.quantity)
    }
}

impl<S: TimeScale> Add<Days> for Time<S> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Days) -> Self::Output {
        Self::from_days(self.quantity + rhs)
    }
}

impl<S: TimeScale> Sub<Days> for Time<S> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Days) -> Self::Output {
        Self::from_days(self.quantity - rhs)
    }
}

impl<S: TimeScale> Sub for Time<S> {
    type Output = Days;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.quantity - rhs.quantity
    }
}

impl<S: TimeScale> From<Days> for Time<S> {
    #[inline]
    fn from(days: Days) -> Self {
        Self::from_days(days)
    }
}

impl<S: TimeScale> From<Time<S>> for Days {
    #[inline]
    fn from(time: Time<S>) -> Self {
        time.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::super::scales::{JD, UT};
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn utc_roundtrip_through_tt() {
        let datetime = Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 14).unwrap();
        let jd = Time::<JD>::from_utc(datetime);
        let back = jd.to_utc().expect("to_utc");
        let delta_ns =
            back.timestamp_nanos_opt().unwrap() - datetime.timestamp_nanos_opt().unwrap();
        assert!(delta_ns.abs() < 1_000, "roundtrip error: {} ns", delta_ns);
    }

    #[test]
    fn from_utc_applies_delta_t() {
        // 2000-01-01 12:00:00 UTC → JD(UT)=2451545.0; Espenak & Meeus ΔT(2000.0)=63.86 s
        let datetime = DateTime::from_timestamp(946_728_000, 0).unwrap();
        let jd = Time::<JD>::from_utc(datetime);
        let delta_t_secs = (jd.quantity() - Days::new(2_451_545.0)).to::<Second>();
        assert!(
            (delta_t_secs - Seconds::new(63.86)).abs() < Seconds::new(0.5),
            "ΔT correction = {} s",
            delta_t_secs
        );
    }

    #[test]
    fn ut_axis_has_no_offset_from_unix_epoch() {
        let epoch = DateTime::from_timestamp(0, 0).unwrap();
        let ut = Time::<UT>::from_utc(epoch);
        assert!((ut.quantity() - Days::new(UNIX_EPOCH_JD)).abs() < Days::new(1e-12));
    }

    #[test]
    fn arithmetic() {
        let jd = Time::<JD>::new(2_451_545.0) + Days::new(1.0);
        assert_eq!(jd.quantity(), Days::new(2_451_546.0));
        assert_eq!((jd - Days::new(0.5)).quantity(), Days::new(2_451_545.5));

        let a = Time::<JD>::new(10.0);
        let b = Time::<JD>::new(14.0);
        assert_eq!(b - a, Days::new(4.0));
    }

    #[test]
    fn display_carries_label() {
        let ut = Time::<UT>::new(2_451_545.0);
        assert!(format!("{ut}").starts_with("UT"));
    }
}
