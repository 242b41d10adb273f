//! Calendar conversion errors.

use chrono::NaiveDate;
use lekha_shared::{AppError, ErrorKind};
use thiserror::Error;

use super::table::{MAX_YEAR, MIN_YEAR};

/// Errors raised while validating or converting calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// Year is outside the month-length table.
    #[error(
        "Unsupported calendar year {0}: supported years are {min}-{max}",
        min = MIN_YEAR,
        max = MAX_YEAR
    )]
    UnsupportedYear(i32),

    /// Month is outside 1-12.
    #[error("Invalid month: {0}")]
    InvalidMonth(u8),

    /// Day does not exist in the given month.
    #[error("Invalid day {day} for {year}-{month:02} (max: {max})")]
    InvalidDay {
        /// Calendar year.
        year: i32,
        /// Calendar month.
        month: u8,
        /// Requested day.
        day: u8,
        /// Days in that month.
        max: u8,
    },

    /// Gregorian date has no counterpart in the supported range.
    #[error("Date {0} is outside the supported calendar range")]
    OutOfRange(NaiveDate),

    /// Text is not a `YYYY-MM-DD` date.
    #[error("Invalid date format: {0}")]
    InvalidFormat(String),

    /// Text is not a `YYYY/YY` fiscal year name.
    #[error("Invalid fiscal year name: {0}")]
    InvalidFiscalYearName(String),
}

impl CalendarError {
    /// Returns the taxonomy kind. Every calendar error is a validation failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedYear(_) => "UNSUPPORTED_CALENDAR_YEAR",
            Self::InvalidMonth(_) => "INVALID_MONTH",
            Self::InvalidDay { .. } => "INVALID_DAY",
            Self::OutOfRange(_) => "DATE_OUT_OF_RANGE",
            Self::InvalidFormat(_) => "INVALID_DATE_FORMAT",
            Self::InvalidFiscalYearName(_) => "INVALID_FISCAL_YEAR_NAME",
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}
