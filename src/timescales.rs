// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Civil timestamp ⇄ Julian Day ⇄ Terrestrial Time
//!
//! Free functions over offset-aware `chrono` instants. Any `DateTime<Tz>` is
//! first normalized to UTC; that conversion is the only normalization this
//! module performs. Naive timestamps are not representable as `DateTime<Tz>`,
//! and string input goes through [`parse_utc`], which rejects them.
//!
//! ```text
//! DateTime<Tz> ──► UTC ──► JD(UTC) ──(+ ΔT/86400)──► JD(TT)
//! ```

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::delta_t::delta_t_seconds;
use crate::error::{Error, Result};

/// Seconds in one civil day.
pub const DAY_SECONDS: f64 = 86_400.0;

/// The four numbers describing one instant on the civil and dynamical axes.
///
/// Invariant: `jd_tt == jd_utc + delta_t / 86400`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScales {
    pub jd_utc: f64,
    pub jd_tt: f64,
    /// ΔT = TT − UTC in seconds.
    pub delta_t: f64,
    pub decimal_year: f64,
}

/// Gregorian calendar → Julian Day (Meeus, *Astronomical Algorithms*, ch. 7).
///
/// The day argument carries the time of day as a fraction, so the result is
/// exact to floating-point resolution.
pub fn datetime_to_jd<Tz: TimeZone>(datetime: &DateTime<Tz>) -> f64 {
    let utc = datetime.with_timezone(&Utc);
    let mut year = utc.year() as i64;
    let mut month = utc.month() as i64;
    let seconds_of_day = utc.num_seconds_from_midnight() as f64
        + utc.timestamp_subsec_nanos() as f64 / 1e9;
    let day = utc.day() as f64 + seconds_of_day / DAY_SECONDS;

    if month <= 2 {
        year -= 1;
        month += 12;
    }

    let a = year.div_euclid(100);
    let b = 2 - a + a.div_euclid(4);

    (365.25 * (year + 4716) as f64).floor() + (30.6001 * (month + 1) as f64).floor() + day
        + b as f64
        - 1524.5
}

/// Calendar year plus the elapsed fraction of that year, in UTC.
pub fn decimal_year<Tz: TimeZone>(datetime: &DateTime<Tz>) -> f64 {
    let utc = datetime.with_timezone(&Utc);
    let year = utc.year();
    let start = year_start(year);
    let end = year_start(year + 1);
    let elapsed = (utc - start).num_milliseconds() as f64 / 1e3;
    let span = (end - start).num_milliseconds() as f64 / 1e3;
    year as f64 + elapsed / span
}

fn year_start(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// `jd_tt = jd_utc + ΔT(decimal_year) / 86400`.
#[inline]
pub fn utc_to_tt(jd_utc: f64, decimal_year: f64) -> f64 {
    jd_utc + delta_t_seconds(decimal_year) / DAY_SECONDS
}

/// All time scales for one instant.
pub fn time_scales<Tz: TimeZone>(datetime: &DateTime<Tz>) -> TimeScales {
    let jd_utc = datetime_to_jd(datetime);
    let decimal_year = decimal_year(datetime);
    let delta_t = delta_t_seconds(decimal_year);
    TimeScales {
        jd_utc,
        jd_tt: jd_utc + delta_t / DAY_SECONDS,
        delta_t,
        decimal_year,
    }
}

/// Parse an RFC 3339 timestamp that carries an explicit offset (`Z` or
/// `±hh:mm`) and normalize it to UTC.
///
/// A timestamp without offset information is rejected rather than assumed
/// to be UTC.
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    match DateTime::parse_from_rfc3339(text) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(err) => {
            let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"));
            if naive.is_ok() {
                Err(Error::invalid_input(format!(
                    "timestamp '{text}' has no UTC offset"
                )))
            } else {
                Err(Error::invalid_input(format!(
                    "timestamp '{text}' is not RFC 3339: {err}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn j2000_noon_is_2451545() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((datetime_to_jd(&dt) - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn meeus_example_7a() {
        // Sputnik launch, 1957-10-04.81 → JD 2436116.31
        let dt = Utc.with_ymd_and_hms(1957, 10, 4, 19, 26, 24).unwrap();
        assert!((datetime_to_jd(&dt) - 2_436_116.31).abs() < 1e-6);
    }

    #[test]
    fn january_and_february_use_shifted_year() {
        let dt = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert!((datetime_to_jd(&next) - datetime_to_jd(&dt) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn offset_aware_input_normalizes_to_utc() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = tz.with_ymd_and_hms(2000, 1, 1, 14, 0, 0).unwrap();
        assert!((datetime_to_jd(&local) - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn decimal_year_midpoint() {
        let dt = Utc.with_ymd_and_hms(2023, 7, 2, 12, 0, 0).unwrap();
        assert!((decimal_year(&dt) - 2023.5).abs() < 1e-9);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(decimal_year(&start), 2024.0);
    }

    #[test]
    fn time_scales_invariant_holds() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 20, 9, 1, 0).unwrap();
        let ts = time_scales(&dt);
        assert!((ts.jd_tt - (ts.jd_utc + ts.delta_t / DAY_SECONDS)).abs() < 1e-12);
        assert!(ts.delta_t > 70.0 && ts.delta_t < 80.0);
        assert!((utc_to_tt(ts.jd_utc, ts.decimal_year) - ts.jd_tt).abs() < 1e-12);
    }

    #[test]
    fn parse_utc_accepts_offsets() {
        let z = parse_utc("2024-03-20T03:06:14Z").unwrap();
        let off = parse_utc("2024-03-20T05:06:14+02:00").unwrap();
        assert_eq!(z, off);
    }

    #[test]
    fn parse_utc_rejects_naive_timestamp() {
        let err = parse_utc("2024-03-20T03:06:14").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("no UTC offset")));
        assert!(matches!(
            parse_utc("not a date"),
            Err(Error::InvalidInput(_))
        ));
    }
}
