//! Bikram Sambat calendar support.
//!
//! Table-driven conversion between Gregorian dates and the Bikram Sambat
//! calendar for BS years 2080-2090, plus the fiscal-year naming and boundary
//! rules built on it. Years outside the table are rejected rather than
//! approximated.

pub mod convert;
pub mod date;
pub mod error;
pub mod fiscal_year;
pub mod table;

#[cfg(test)]
mod convert_props;

pub use convert::{max_supported_date, min_supported_date, to_bs, to_gregorian, today_bs};
pub use date::{BsDate, BsMonth, DateFormat};
pub use error::CalendarError;
pub use fiscal_year::{FiscalYearBounds, fiscal_year_bounds, fiscal_year_name, parse_fiscal_year_name};
pub use table::{MAX_YEAR, MIN_YEAR, days_in_month, total_days_in_year};
