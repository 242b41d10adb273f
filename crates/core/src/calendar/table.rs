//! Month-length table for the Bikram Sambat years the engine supports.

use chrono::NaiveDate;

use super::error::CalendarError;

/// First Bikram Sambat year covered by the table.
pub const MIN_YEAR: i32 = 2080;

/// Last Bikram Sambat year covered by the table.
pub const MAX_YEAR: i32 = 2090;

/// Gregorian date of 2080-01-01 BS, the first day of the table.
pub const ANCHOR_AD: NaiveDate = match NaiveDate::from_ymd_opt(2023, 4, 14) {
    Some(date) => date,
    None => panic!("anchor date must be valid"),
};

const MONTH_DAYS: [[u8; 12]; 11] = [
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2080
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2081
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2082
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2083
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2084
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2085
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2086
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2087
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2088
    [31, 31, 32, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2089
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2090
];

fn year_row(year: i32) -> Result<&'static [u8; 12], CalendarError> {
    usize::try_from(year - MIN_YEAR)
        .ok()
        .and_then(|index| MONTH_DAYS.get(index))
        .ok_or(CalendarError::UnsupportedYear(year))
}

/// Returns true if `year` is covered by the table.
#[must_use]
pub const fn is_supported_year(year: i32) -> bool {
    year >= MIN_YEAR && year <= MAX_YEAR
}

/// Number of days in `month` (1-12) of `year`.
///
/// # Errors
///
/// [`CalendarError::UnsupportedYear`] outside the table and
/// [`CalendarError::InvalidMonth`] for a month outside 1-12.
pub fn days_in_month(year: i32, month: u8) -> Result<u8, CalendarError> {
    let row = year_row(year)?;
    month
        .checked_sub(1)
        .and_then(|index| row.get(usize::from(index)))
        .copied()
        .ok_or(CalendarError::InvalidMonth(month))
}

/// Number of days in `year`.
///
/// # Errors
///
/// [`CalendarError::UnsupportedYear`] outside the table.
pub fn total_days_in_year(year: i32) -> Result<u32, CalendarError> {
    Ok(year_row(year)?.iter().map(|&days| u32::from(days)).sum())
}
