//! Conversion between Gregorian dates and Bikram Sambat dates.
//!
//! Both directions count whole days from [`ANCHOR_AD`], the Gregorian date of
//! the first table day, and walk the month-length table.

use chrono::{Days, Local, NaiveDate};

use super::date::BsDate;
use super::error::CalendarError;
use super::table::{ANCHOR_AD, MAX_YEAR, MIN_YEAR, days_in_month, total_days_in_year};

/// Converts a Gregorian date to the Bikram Sambat calendar.
///
/// # Errors
///
/// [`CalendarError::OutOfRange`] if the date falls outside the table.
pub fn to_bs(date: NaiveDate) -> Result<BsDate, CalendarError> {
    let out_of_range = || CalendarError::OutOfRange(date);
    let mut remaining =
        u32::try_from(date.signed_duration_since(ANCHOR_AD).num_days()).map_err(|_| out_of_range())?;

    let mut year = MIN_YEAR;
    loop {
        let year_days = total_days_in_year(year).map_err(|_| out_of_range())?;
        if remaining < year_days {
            break;
        }
        remaining -= year_days;
        year += 1;
    }

    let mut month = 1;
    loop {
        let month_days = u32::from(days_in_month(year, month)?);
        if remaining < month_days {
            break;
        }
        remaining -= month_days;
        month += 1;
    }

    let day = u8::try_from(remaining + 1).map_err(|_| out_of_range())?;
    BsDate::new(year, month, day)
}

/// Converts a Bikram Sambat date to the Gregorian calendar.
///
/// The fiscal-year end marker (Ashad 32) resolves to the last real day of
/// Ashad in that year.
///
/// # Errors
///
/// Only if the date refers to a year outside the table, which a validated
/// [`BsDate`] never does.
pub fn to_gregorian(date: BsDate) -> Result<NaiveDate, CalendarError> {
    let mut offset: u64 = 0;
    for year in MIN_YEAR..date.year() {
        offset += u64::from(total_days_in_year(year)?);
    }
    for month in 1..date.month() {
        offset += u64::from(days_in_month(date.year(), month)?);
    }
    offset += u64::from(date.resolved_day()?) - 1;

    ANCHOR_AD
        .checked_add_days(Days::new(offset))
        .ok_or(CalendarError::UnsupportedYear(date.year()))
}

/// First Gregorian date the converter supports.
#[must_use]
pub const fn min_supported_date() -> NaiveDate {
    ANCHOR_AD
}

/// Last Gregorian date the converter supports.
///
/// # Errors
///
/// Never in practice; the table is static.
pub fn max_supported_date() -> Result<NaiveDate, CalendarError> {
    let last_month_days = days_in_month(MAX_YEAR, 12)?;
    to_gregorian(BsDate::new(MAX_YEAR, 12, last_month_days)?)
}

/// Today's date in the Bikram Sambat calendar, using the local time zone.
///
/// # Errors
///
/// [`CalendarError::OutOfRange`] once the clock passes the table.
pub fn today_bs() -> Result<BsDate, CalendarError> {
    to_bs(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ad(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bs(y: i32, m: u8, d: u8) -> BsDate {
        BsDate::new(y, m, d).unwrap()
    }

    #[rstest]
    #[case(ad(2023, 4, 14), bs(2080, 1, 1))]
    #[case(ad(2024, 1, 1), bs(2080, 9, 17))]
    #[case(ad(2024, 4, 12), bs(2080, 12, 30))]
    #[case(ad(2024, 4, 13), bs(2081, 1, 1))]
    #[case(ad(2025, 7, 15), bs(2082, 3, 31))]
    #[case(ad(2025, 7, 16), bs(2082, 4, 1))]
    #[case(ad(2025, 7, 17), bs(2082, 4, 2))]
    #[case(ad(2026, 10, 16), bs(2083, 6, 30))]
    #[case(ad(2034, 4, 13), bs(2090, 12, 31))]
    fn test_known_conversions(#[case] gregorian: NaiveDate, #[case] expected: BsDate) {
        assert_eq!(to_bs(gregorian).unwrap(), expected);
        assert_eq!(to_gregorian(expected).unwrap(), gregorian);
    }

    #[test]
    fn test_dates_outside_table_are_rejected() {
        assert_eq!(
            to_bs(ad(2023, 4, 13)),
            Err(CalendarError::OutOfRange(ad(2023, 4, 13)))
        );
        assert_eq!(
            to_bs(ad(2034, 4, 14)),
            Err(CalendarError::OutOfRange(ad(2034, 4, 14)))
        );
    }

    #[test]
    fn test_end_marker_resolves_to_last_day_of_ashad() {
        // Ashad 2083 has 31 days, Ashad 2084 has 32
        assert_eq!(
            to_gregorian(BsDate::fiscal_year_end(2083).unwrap()).unwrap(),
            ad(2026, 7, 15)
        );
        assert_eq!(
            to_gregorian(BsDate::fiscal_year_end(2084).unwrap()).unwrap(),
            ad(2027, 7, 16)
        );
    }

    #[test]
    fn test_supported_range() {
        assert_eq!(min_supported_date(), ad(2023, 4, 14));
        assert_eq!(max_supported_date().unwrap(), ad(2034, 4, 13));
    }
}
