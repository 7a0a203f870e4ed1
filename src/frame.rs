// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Astro Time Frame
//!
//! Maps UTC instants to `(dies, milidies)` readings.
//!
//! Every day boundary is the mean solar noon of the reference meridian
//! 168°58′30″ W, which falls at the same UTC clock time every day:
//!
//! ```text
//! 12h − (−168.975° / 15) = 23.265 h  →  23:15:54 UTC
//! ```
//!
//! `dies` counts boundaries since the current vernal equinox. The stretch
//! between the equinox and the first boundary is day 0, which can be shorter
//! or longer than 24 h. `milidies` is the thousandth of a day elapsed since
//! the last boundary and never depends on the equinox.
//!
//! Internally every sub-day quantity is computed in integer nanoseconds so
//! that instants built from whole milidies map back exactly.

use std::fmt;

use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reference meridian in arcseconds of longitude, West negative.
pub const REFERENCE_LONGITUDE_ARCSEC: i64 = -608_310;

/// Reference meridian in degrees, West negative.
pub const REFERENCE_LONGITUDE_DEG: f64 = REFERENCE_LONGITUDE_ARCSEC as f64 / 3600.0;

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const MILIDIES_PER_DAY: i64 = 1_000;
pub const MIKRODIES_PER_MILIDIES: i64 = 1_000;
pub const SECONDS_PER_MILIDIES: f64 = 86.4;
pub const SECONDS_PER_MIKRODIES: f64 = 0.0864;

/// UTC second-of-day of the daily boundary (83 754 s, i.e. 23:15:54).
///
/// One arcsecond of longitude is 1/15 s of time.
pub const BOUNDARY_SECONDS_OF_DAY: i64 =
    (SECONDS_PER_DAY / 2 - REFERENCE_LONGITUDE_ARCSEC / 15).rem_euclid(SECONDS_PER_DAY);

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_DAY: i64 = SECONDS_PER_DAY * NANOS_PER_SECOND;
const NANOS_PER_MILIDIES: i64 = NANOS_PER_DAY / MILIDIES_PER_DAY;
const NANOS_PER_MIKRODIES: i64 = NANOS_PER_MILIDIES / MIKRODIES_PER_MILIDIES;

/// Nanoseconds elapsed since the most recent boundary at or before `t`.
fn nanos_since_boundary(t: &DateTime<Utc>) -> i64 {
    let secs = (t.timestamp() - BOUNDARY_SECONDS_OF_DAY).rem_euclid(SECONDS_PER_DAY);
    secs * NANOS_PER_SECOND + i64::from(t.timestamp_subsec_nanos())
}

/// The most recent daily boundary `≤ t`.
pub fn last_noon_before_or_at(t: DateTime<Utc>) -> DateTime<Utc> {
    t - TimeDelta::nanoseconds(nanos_since_boundary(&t))
}

/// The earliest daily boundary `≥ t`; `t` itself when it lies on a boundary.
pub fn first_noon_after(t: DateTime<Utc>) -> DateTime<Utc> {
    let last = last_noon_before_or_at(t);
    if last == t {
        t
    } else {
        last + TimeDelta::days(1)
    }
}

/// One reading of the astronomical clock. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AstroReading {
    pub utc: DateTime<Utc>,
    /// Day index since the current equinox; `-1` before the current cycle.
    pub dies: i64,
    /// Thousandth of the current day, in `[0, 999]`.
    pub milidies: u32,
    /// `milidies / 1000`.
    pub fraction: f64,
    /// Thousandth of the current milidies, when enabled on the [`AstroYear`].
    pub mikrodies: Option<u32>,
    /// Position inside the current mikrodies, in `[0, 1)`.
    pub mikrodies_fraction: Option<f64>,
}

impl AstroReading {
    /// Whether the instant precedes the current equinox.
    pub fn is_before_cycle(&self) -> bool {
        self.dies < 0
    }

    /// `DDD.mmm`
    pub fn timestamp(&self) -> String {
        format!("{:03}.{:03}", self.dies, self.milidies)
    }

    /// `DDD.mmm.µµµ`, with `000` when mikrodies are disabled.
    pub fn timestamp_full(&self) -> String {
        format!(
            "{:03}.{:03}.{:03}",
            self.dies,
            self.milidies,
            self.mikrodies.unwrap_or(0)
        )
    }

    /// RFC 3339 timestamp with a `Z` suffix.
    pub fn iso(&self) -> String {
        self.utc.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
    }
}

impl fmt::Display for AstroReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.timestamp())
    }
}

/// One astronomical year, from `current_equinox` to `next_equinox`.
///
/// [`AstroYear::reading`] rolls the year forward in place once an instant
/// reaches `next_equinox`; share across threads only behind a lock.
#[derive(Debug, Clone, PartialEq)]
pub struct AstroYear {
    current_equinox: DateTime<Utc>,
    next_equinox: Option<DateTime<Utc>>,
    first_noon_after_equinox: DateTime<Utc>,
    mikrodies: bool,
}

impl AstroYear {
    /// Year starting at `current_equinox`; `next_equinox` must be later.
    pub fn new(current_equinox: DateTime<Utc>, next_equinox: Option<DateTime<Utc>>) -> Result<Self> {
        if let Some(next) = next_equinox {
            check_order(current_equinox, next)?;
        }
        Ok(Self {
            current_equinox,
            next_equinox,
            first_noon_after_equinox: first_noon_after(current_equinox),
            mikrodies: false,
        })
    }

    /// The year containing `t`, resolving equinoxes through `equinox_for`.
    ///
    /// Uses the equinox of `t`'s calendar year, or the previous one when `t`
    /// falls before it, and fills in the following equinox.
    pub fn containing<F>(t: DateTime<Utc>, mut equinox_for: F) -> Result<Self>
    where
        F: FnMut(i32) -> Result<DateTime<Utc>>,
    {
        let mut year = t.year();
        let mut current = equinox_for(year)?;
        if t < current {
            year -= 1;
            current = equinox_for(year)?;
        }
        let next = equinox_for(year + 1)?;
        Self::new(current, Some(next))
    }

    /// Enable or disable the mikrodies subdivision in readings.
    pub fn with_mikrodies(mut self, enabled: bool) -> Self {
        self.mikrodies = enabled;
        self
    }

    pub fn current_equinox(&self) -> DateTime<Utc> {
        self.current_equinox
    }

    pub fn next_equinox(&self) -> Option<DateTime<Utc>> {
        self.next_equinox
    }

    /// Earliest daily boundary at or after the current equinox.
    pub fn first_noon_after_equinox(&self) -> DateTime<Utc> {
        self.first_noon_after_equinox
    }

    /// Set the next equinox once it is known.
    pub fn update_next_equinox(&mut self, next_equinox: DateTime<Utc>) -> Result<()> {
        check_order(self.current_equinox, next_equinox)?;
        self.next_equinox = Some(next_equinox);
        Ok(())
    }

    fn maybe_rollover(&mut self, t: DateTime<Utc>) -> bool {
        match self.next_equinox {
            Some(next) if t >= next => {
                self.current_equinox = next;
                self.next_equinox = None;
                self.first_noon_after_equinox = first_noon_after(next);
                true
            }
            _ => false,
        }
    }

    /// Reading at `t`, rolling the year over first if `t ≥ next_equinox`.
    pub fn reading<Tz: TimeZone>(&mut self, t: DateTime<Tz>) -> AstroReading {
        let t = t.with_timezone(&Utc);
        self.maybe_rollover(t);

        let since = nanos_since_boundary(&t);
        let milidies = (since / NANOS_PER_MILIDIES).min(MILIDIES_PER_DAY - 1) as u32;

        let dies = if t < self.current_equinox {
            -1
        } else if t < self.first_noon_after_equinox {
            0
        } else {
            1 + (t - self.first_noon_after_equinox)
                .num_seconds()
                .div_euclid(SECONDS_PER_DAY)
        };

        let (mikrodies, mikrodies_fraction) = if self.mikrodies {
            let whole = since / NANOS_PER_MIKRODIES;
            let rest = since % NANOS_PER_MIKRODIES;
            (
                Some((whole % MIKRODIES_PER_MILIDIES) as u32),
                Some(rest as f64 / NANOS_PER_MIKRODIES as f64),
            )
        } else {
            (None, None)
        };

        AstroReading {
            utc: t,
            dies,
            milidies,
            fraction: f64::from(milidies) / MILIDIES_PER_DAY as f64,
            mikrodies,
            mikrodies_fraction,
        }
    }

    /// Approximate UTC instant of `(dies, milidies)`.
    ///
    /// For `dies ≥ 1` this is exact: the start of that day plus
    /// `milidies · 86.4 s`. Day 0 starts at the equinox rather than at a
    /// boundary, so for `dies == 0` the result is anchored at the equinox
    /// instant itself and does not invert [`AstroYear::reading`].
    pub fn approximate_utc_from(&self, dies: i64, milidies: i64) -> Result<DateTime<Utc>> {
        if dies < 0 {
            return Err(Error::invalid_input(format!("dies must be >= 0, got {dies}")));
        }
        if !(0..MILIDIES_PER_DAY).contains(&milidies) {
            return Err(Error::invalid_input(format!(
                "milidies must be in [0, 999], got {milidies}"
            )));
        }
        let offset = TimeDelta::nanoseconds(milidies * NANOS_PER_MILIDIES);
        if dies == 0 {
            return Ok(self.current_equinox + offset);
        }
        let day_start = TimeDelta::try_days(dies - 1)
            .and_then(|d| self.first_noon_after_equinox.checked_add_signed(d))
            .ok_or_else(|| Error::invalid_input(format!("dies {dies} is out of range")))?;
        Ok(day_start + offset)
    }

    /// Like [`AstroYear::approximate_utc_from`], but at the centre of the
    /// milidies interval.
    pub fn approximate_utc_center(&self, dies: i64, milidies: i64) -> Result<DateTime<Utc>> {
        self.approximate_utc_from(dies, milidies)
            .map(|t| t + TimeDelta::nanoseconds(NANOS_PER_MILIDIES / 2))
    }
}

fn check_order(current: DateTime<Utc>, next: DateTime<Utc>) -> Result<()> {
    if next <= current {
        return Err(Error::invalid_input(format!(
            "next equinox {next} must be after current equinox {current}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn year_2025() -> AstroYear {
        AstroYear::new(utc(2025, 3, 20, 9, 1, 25), Some(utc(2026, 3, 20, 14, 46, 0))).unwrap()
    }

    #[test]
    fn boundary_is_23_15_54() {
        assert_eq!(BOUNDARY_SECONDS_OF_DAY, 23 * 3600 + 15 * 60 + 54);
        assert!((REFERENCE_LONGITUDE_DEG + 168.975).abs() < 1e-12);
    }

    #[test]
    fn last_noon_helpers() {
        let t = utc(2025, 3, 21, 10, 0, 0);
        assert_eq!(last_noon_before_or_at(t), utc(2025, 3, 20, 23, 15, 54));
        let after = utc(2025, 3, 21, 23, 30, 0);
        assert_eq!(last_noon_before_or_at(after), utc(2025, 3, 21, 23, 15, 54));
        let on = utc(2025, 3, 21, 23, 15, 54);
        assert_eq!(last_noon_before_or_at(on), on);
        assert_eq!(first_noon_after(on), on);
        assert_eq!(first_noon_after(t), utc(2025, 3, 21, 23, 15, 54));
    }

    #[test]
    fn first_noon_after_equinox_is_same_day_boundary() {
        assert_eq!(year_2025().first_noon_after_equinox(), utc(2025, 3, 20, 23, 15, 54));
    }

    #[test]
    fn day_zero_then_day_one() {
        let mut year = year_2025();
        let before = year.reading(utc(2025, 3, 20, 8, 0, 0));
        assert_eq!(before.dies, -1);
        assert!(before.is_before_cycle());

        let day0 = year.reading(utc(2025, 3, 20, 12, 0, 0));
        assert_eq!(day0.dies, 0);
        // 12:00 is 45 846 s after 23:15:54 of the previous day.
        assert_eq!(day0.milidies, 530);

        let day1 = year.reading(utc(2025, 3, 20, 23, 15, 54));
        assert_eq!(day1.dies, 1);
        assert_eq!(day1.milidies, 0);

        let day2 = year.reading(utc(2025, 3, 22, 0, 0, 0));
        assert_eq!(day2.dies, 2);
    }

    #[test]
    fn last_milidies_before_boundary() {
        let mut year = year_2025();
        let boundary = utc(2025, 4, 1, 23, 15, 54);
        let t1 = year.reading(boundary - TimeDelta::milliseconds(86_400));
        let t2 = year.reading(boundary);
        assert_eq!(t1.milidies, 999);
        assert_eq!(t2.milidies, 0);
        assert_eq!(t2.dies, t1.dies + 1);

        let edge = year.reading(boundary - TimeDelta::nanoseconds(1));
        assert_eq!(edge.milidies, 999);
    }

    #[test]
    fn rollover_at_next_equinox() {
        let mut year = year_2025();
        let e2 = utc(2026, 3, 20, 14, 46, 0);
        let r = year.reading(e2);
        assert_eq!(r.dies, 0);
        assert_eq!(year.current_equinox(), e2);
        assert_eq!(year.next_equinox(), None);
        assert_eq!(year.first_noon_after_equinox(), utc(2026, 3, 20, 23, 15, 54));
        assert_eq!(year.reading(e2).dies, 0);
    }

    #[test]
    fn inverse_mapping_roundtrips_for_whole_days() {
        let mut year = year_2025();
        for (dies, milidies) in [(1, 0), (1, 999), (17, 500), (300, 123)] {
            let t = year.approximate_utc_from(dies, milidies).unwrap();
            let r = year.reading(t);
            assert_eq!((r.dies, i64::from(r.milidies)), (dies, milidies));
        }
    }

    #[test]
    fn inverse_mapping_day_zero_is_anchored_at_equinox() {
        let year = year_2025();
        let t = year.approximate_utc_from(0, 10).unwrap();
        assert_eq!(t, year.current_equinox() + TimeDelta::seconds(864));
    }

    #[test]
    fn inverse_mapping_rejects_out_of_range() {
        let year = year_2025();
        assert!(matches!(year.approximate_utc_from(-1, 0), Err(Error::InvalidInput(_))));
        assert!(matches!(year.approximate_utc_from(1, 1000), Err(Error::InvalidInput(_))));
        assert!(matches!(year.approximate_utc_from(1, -1), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn centered_inverse_adds_half_a_milidies() {
        let year = year_2025();
        let start = year.approximate_utc_from(3, 7).unwrap();
        let centre = year.approximate_utc_center(3, 7).unwrap();
        assert_eq!(centre - start, TimeDelta::milliseconds(43_200));
    }

    #[test]
    fn update_next_equinox_validates_order() {
        let mut year = AstroYear::new(utc(2025, 3, 20, 9, 1, 25), None).unwrap();
        assert!(year.update_next_equinox(utc(2024, 3, 20, 3, 6, 0)).is_err());
        year.update_next_equinox(utc(2026, 3, 20, 14, 46, 0)).unwrap();
        assert!(year.next_equinox().is_some());
        assert!(AstroYear::new(utc(2025, 3, 20, 0, 0, 0), Some(utc(2025, 3, 20, 0, 0, 0))).is_err());
    }

    #[test]
    fn mikrodies_are_opt_in() {
        let t = utc(2025, 3, 25, 6, 0, 0);
        let plain = year_2025().reading(t);
        assert_eq!(plain.mikrodies, None);
        assert_eq!(plain.timestamp_full(), format!("{}.000", plain.timestamp()));

        let mut year = year_2025().with_mikrodies(true);
        let fine = year.reading(t + TimeDelta::milliseconds(43));
        let mikro = fine.mikrodies.unwrap();
        assert!(mikro < 1000);
        let frac = fine.mikrodies_fraction.unwrap();
        assert!((0.0..1.0).contains(&frac));
    }

    #[test]
    fn formatting() {
        let mut year = year_2025().with_mikrodies(true);
        let r = year.reading(utc(2025, 3, 21, 23, 15, 54) + TimeDelta::milliseconds(86_400 * 5 + 86 * 3));
        assert_eq!(r.timestamp(), "002.005");
        assert_eq!(r.timestamp_full(), "002.005.002");
        assert_eq!(r.to_string(), "002.005");
        assert!(r.iso().ends_with('Z'));
    }

    #[test]
    fn offset_aware_input_is_normalized() {
        let tz = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
        let local = tz.with_ymd_and_hms(2025, 3, 25, 1, 0, 0).unwrap();
        let mut a = year_2025();
        let mut b = year_2025();
        assert_eq!(a.reading(local), b.reading(local.with_timezone(&Utc)));
    }
}
