//! Property-based tests for calendar conversion.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use super::convert::{max_supported_date, min_supported_date, to_bs, to_gregorian};
use super::date::BsDate;
use super::fiscal_year::{fiscal_year_bounds, fiscal_year_name};
use super::table::{MAX_YEAR, MIN_YEAR, days_in_month};

/// Number of Gregorian days covered by the table (2080-01-01 to 2090-12-31).
const SUPPORTED_DAYS: u64 = 4018;

/// Strategy to generate any Gregorian date inside the supported range.
fn supported_date() -> impl Strategy<Value = NaiveDate> {
    (0..SUPPORTED_DAYS).prop_map(|offset| {
        min_supported_date()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

/// Strategy to generate a valid Bikram Sambat date (never the end marker).
fn valid_bs_date() -> impl Strategy<Value = BsDate> {
    (MIN_YEAR..=MAX_YEAR, 1u8..=12).prop_flat_map(|(year, month)| {
        let max = days_in_month(year, month).unwrap();
        (1..=max).prop_map(move |day| BsDate::new(year, month, day).unwrap())
    })
}

#[test]
fn test_supported_day_count_matches_range() {
    let span = max_supported_date()
        .unwrap()
        .signed_duration_since(min_supported_date())
        .num_days();
    assert_eq!(u64::try_from(span).unwrap() + 1, SUPPORTED_DAYS);
}

#[test]
fn test_every_supported_day_round_trips_in_table_order() {
    let max = max_supported_date().unwrap();
    let table_days = (MIN_YEAR..=MAX_YEAR).flat_map(|year| {
        (1u8..=12).flat_map(move |month| {
            (1..=days_in_month(year, month).unwrap())
                .map(move |day| BsDate::new(year, month, day).unwrap())
        })
    });

    let mut walked = 0u64;
    for (date, bs) in min_supported_date().iter_days().zip(table_days) {
        assert_eq!(to_bs(date).unwrap(), bs, "{date}");
        assert_eq!(to_gregorian(bs).unwrap(), date, "{bs:?}");
        walked += 1;
        if date == max {
            break;
        }
    }
    assert_eq!(walked, SUPPORTED_DAYS);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// **Property 1: Gregorian round trip**
    ///
    /// *For any* supported Gregorian date, converting to BS and back yields
    /// the same date.
    #[test]
    fn prop_gregorian_round_trip(date in supported_date()) {
        let bs = to_bs(date).unwrap();
        prop_assert_eq!(to_gregorian(bs).unwrap(), date);
    }

    /// **Property 2: BS round trip**
    ///
    /// *For any* valid BS date, converting to Gregorian and back yields the
    /// same date.
    #[test]
    fn prop_bs_round_trip(bs in valid_bs_date()) {
        let date = to_gregorian(bs).unwrap();
        prop_assert_eq!(to_bs(date).unwrap(), bs);
    }

    /// **Property 3: Conversion preserves order**
    #[test]
    fn prop_next_day_is_next_bs_day(date in supported_date()) {
        prop_assume!(date < max_supported_date().unwrap());
        let today = to_bs(date).unwrap();
        let tomorrow = to_bs(date.succ_opt().unwrap()).unwrap();
        prop_assert!(tomorrow > today);
    }

    /// **Property 4: A date lies inside its own fiscal year**
    #[test]
    fn prop_date_within_named_fiscal_year(date in supported_date()) {
        let name = fiscal_year_name(to_bs(date).unwrap());
        // the first and last partial fiscal years reach outside the table
        if let Ok(bounds) = fiscal_year_bounds(&name) {
            prop_assert!(bounds.start_date <= date && date <= bounds.end_date);
        }
    }
}
