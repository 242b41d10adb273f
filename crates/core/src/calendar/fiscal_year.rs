//! Fiscal years named `YYYY/YY`, running Shrawan 1 to the end of Ashad.

use chrono::NaiveDate;
use serde::Serialize;

use super::convert::to_gregorian;
use super::date::{BsDate, FISCAL_YEAR_END_MONTH};
use super::error::CalendarError;

/// Dual-calendar boundaries of a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiscalYearBounds {
    /// Name in `YYYY/YY` form.
    pub name: String,
    /// Shrawan 1 of the starting year.
    pub start_bs: BsDate,
    /// Ashad 32 end marker of the following year.
    pub end_bs: BsDate,
    /// Gregorian start date.
    pub start_date: NaiveDate,
    /// Gregorian end date (last real day of Ashad).
    pub end_date: NaiveDate,
}

/// Parses a `YYYY/YY` name and returns the starting year.
///
/// The suffix must be the last two digits of the following year.
///
/// # Errors
///
/// [`CalendarError::InvalidFiscalYearName`] for anything else.
pub fn parse_fiscal_year_name(name: &str) -> Result<i32, CalendarError> {
    let invalid = || CalendarError::InvalidFiscalYearName(name.to_string());
    let (start, suffix) = name.split_once('/').ok_or_else(invalid)?;
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if start.len() != 4 || suffix.len() != 2 || !is_digits(start) || !is_digits(suffix) {
        return Err(invalid());
    }
    let year: i32 = start.parse().map_err(|_| invalid())?;
    let suffix: i32 = suffix.parse().map_err(|_| invalid())?;
    if (year + 1) % 100 != suffix {
        return Err(invalid());
    }
    Ok(year)
}

/// Resolves the boundaries of the fiscal year called `name`.
///
/// # Errors
///
/// Fails for malformed names and for years whose end falls outside the
/// calendar table.
pub fn fiscal_year_bounds(name: &str) -> Result<FiscalYearBounds, CalendarError> {
    let year = parse_fiscal_year_name(name)?;
    let start_bs = BsDate::fiscal_year_start(year)?;
    let end_bs = BsDate::fiscal_year_end(year + 1)?;
    Ok(FiscalYearBounds {
        name: name.to_string(),
        start_bs,
        end_bs,
        start_date: to_gregorian(start_bs)?,
        end_date: to_gregorian(end_bs)?,
    })
}

/// Name of the fiscal year containing `date`.
#[must_use]
pub fn fiscal_year_name(date: BsDate) -> String {
    let start_year = if date.month() > FISCAL_YEAR_END_MONTH {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{start_year}/{:02}", (start_year + 1) % 100)
}
