use astrowatch::frame::{first_noon_after, BOUNDARY_SECONDS_OF_DAY};
use astrowatch::AstroYear;
use chrono::{DateTime, TimeDelta, TimeZone, Timelike, Utc};
use proptest::prelude::*;

fn e1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 20, 9, 1, 25).unwrap()
}

fn e2() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 20, 14, 46, 0).unwrap()
}

fn year() -> AstroYear {
    AstroYear::new(e1(), Some(e2())).unwrap().with_mikrodies(true)
}

const YEAR_MS: i64 = 365 * 86_400_000;

#[test]
fn first_noon_is_on_the_boundary_clock() {
    let noon = first_noon_after(e1());
    assert_eq!(noon.num_seconds_from_midnight() as i64, BOUNDARY_SECONDS_OF_DAY);
    assert!(noon >= e1());
    assert!(noon - e1() < TimeDelta::days(1));
}

#[test]
fn rollover_then_day_zero_again() {
    let mut y = year();
    let at_e2 = y.reading(e2());
    assert_eq!(at_e2.dies, 0);
    assert_eq!(y.current_equinox(), e2());
    assert_eq!(y.reading(e2()).dies, 0);
    assert_eq!(y.reading(first_noon_after(e2())).dies, 1);
}

proptest! {
    #[test]
    fn subdivisions_stay_in_range(offset_ms in 0..YEAR_MS) {
        let t = e1() + TimeDelta::milliseconds(offset_ms);
        let r = year().reading(t);
        prop_assert!(r.dies >= 0);
        prop_assert!(r.milidies <= 999);
        prop_assert!(r.mikrodies.unwrap() <= 999);
        let frac = r.mikrodies_fraction.unwrap();
        prop_assert!((0.0..1.0).contains(&frac));
        prop_assert!((r.fraction - f64::from(r.milidies) / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn milidies_monotone_within_a_day(offset_ms in 0..YEAR_MS, step_ms in 0i64..86_400_000) {
        let mut y = year();
        let t1 = e1() + TimeDelta::milliseconds(offset_ms);
        let t2 = t1 + TimeDelta::milliseconds(step_ms);
        prop_assume!(t2 < e2());
        let a = y.reading(t1);
        let b = y.reading(t2);
        if a.dies == b.dies {
            prop_assert!(b.milidies >= a.milidies);
        } else {
            prop_assert_eq!(b.dies, a.dies + 1);
        }
    }

    #[test]
    fn boundary_resets_milidies(day in 1i64..364) {
        let mut y = year();
        let boundary = y.first_noon_after_equinox() + TimeDelta::days(day);
        let before = y.reading(boundary - TimeDelta::milliseconds(86_400));
        let at = y.reading(boundary);
        prop_assert_eq!(before.milidies, 999);
        prop_assert_eq!(at.milidies, 0);
        prop_assert_eq!(at.dies, before.dies + 1);
    }

    #[test]
    fn inverse_mapping_roundtrips(dies in 1i64..=364, milidies in 0i64..1000) {
        let mut y = year();
        let t = y.approximate_utc_from(dies, milidies).unwrap();
        let r = y.reading(t);
        prop_assert_eq!(r.dies, dies);
        prop_assert_eq!(i64::from(r.milidies), milidies);
    }
}
