//! Bikram Sambat date value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CalendarError;
use super::table::days_in_month;

/// Month that closes the fiscal year (Ashad).
pub const FISCAL_YEAR_END_MONTH: u8 = 3;

/// Day number used to mark "last day of Ashad" regardless of its real length.
pub const FISCAL_YEAR_END_MARKER_DAY: u8 = 32;

/// Months of the Bikram Sambat calendar, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BsMonth {
    /// Month 1.
    Baishakh,
    /// Month 2.
    Jestha,
    /// Month 3, the last month of the fiscal year.
    Ashad,
    /// Month 4, the first month of the fiscal year.
    Shrawan,
    /// Month 5.
    Bhadra,
    /// Month 6.
    Ashwin,
    /// Month 7.
    Kartik,
    /// Month 8.
    Mangsir,
    /// Month 9.
    Poush,
    /// Month 10.
    Magh,
    /// Month 11.
    Falgun,
    /// Month 12.
    Chaitra,
}

impl BsMonth {
    const ALL: [Self; 12] = [
        Self::Baishakh,
        Self::Jestha,
        Self::Ashad,
        Self::Shrawan,
        Self::Bhadra,
        Self::Ashwin,
        Self::Kartik,
        Self::Mangsir,
        Self::Poush,
        Self::Magh,
        Self::Falgun,
        Self::Chaitra,
    ];

    /// Returns the month for a 1-based month number.
    ///
    /// # Errors
    ///
    /// [`CalendarError::InvalidMonth`] outside 1-12.
    pub fn from_number(month: u8) -> Result<Self, CalendarError> {
        month
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(usize::from(index)))
            .copied()
            .ok_or(CalendarError::InvalidMonth(month))
    }

    /// Romanized month name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Baishakh => "Baishakh",
            Self::Jestha => "Jestha",
            Self::Ashad => "Ashad",
            Self::Shrawan => "Shrawan",
            Self::Bhadra => "Bhadra",
            Self::Ashwin => "Ashwin",
            Self::Kartik => "Kartik",
            Self::Mangsir => "Mangsir",
            Self::Poush => "Poush",
            Self::Magh => "Magh",
            Self::Falgun => "Falgun",
            Self::Chaitra => "Chaitra",
        }
    }

    /// Gregorian months this month roughly spans.
    #[must_use]
    pub const fn gregorian_span(self) -> &'static str {
        match self {
            Self::Baishakh => "April-May",
            Self::Jestha => "May-June",
            Self::Ashad => "June-July",
            Self::Shrawan => "July-August",
            Self::Bhadra => "August-September",
            Self::Ashwin => "September-October",
            Self::Kartik => "October-November",
            Self::Mangsir => "November-December",
            Self::Poush => "December-January",
            Self::Magh => "January-February",
            Self::Falgun => "February-March",
            Self::Chaitra => "March-April",
        }
    }
}

/// Text layouts supported by [`BsDate::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// `2082-04-01`
    #[default]
    Iso,
    /// `1 Shr 2082`
    ShortMonth,
    /// `1 Shrawan 2082`
    LongMonth,
}

/// A date in the Bikram Sambat calendar.
///
/// Always refers to a day that exists in the month-length table, with one
/// exception: `{year, 3, 32}` is accepted as the fiscal-year end marker and
/// means "last day of Ashad" even when Ashad has fewer days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BsDate {
    year: i32,
    month: u8,
    day: u8,
}

impl BsDate {
    /// Creates a validated date.
    ///
    /// # Errors
    ///
    /// Fails for years outside the table, months outside 1-12 and days
    /// beyond the month's length (the Ashad 32 marker excepted).
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, CalendarError> {
        let max = days_in_month(year, month)?;
        let is_marker = month == FISCAL_YEAR_END_MONTH && day == FISCAL_YEAR_END_MARKER_DAY;
        if day == 0 || (day > max && !is_marker) {
            return Err(CalendarError::InvalidDay {
                year,
                month,
                day,
                max,
            });
        }
        Ok(Self { year, month, day })
    }

    /// First day of the fiscal year that starts in `year` (Shrawan 1).
    ///
    /// # Errors
    ///
    /// [`CalendarError::UnsupportedYear`] outside the table.
    pub fn fiscal_year_start(year: i32) -> Result<Self, CalendarError> {
        Self::new(year, 4, 1)
    }

    /// End marker of the fiscal year that ends in `year` (Ashad 32).
    ///
    /// # Errors
    ///
    /// [`CalendarError::UnsupportedYear`] outside the table.
    pub fn fiscal_year_end(year: i32) -> Result<Self, CalendarError> {
        Self::new(year, FISCAL_YEAR_END_MONTH, FISCAL_YEAR_END_MARKER_DAY)
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month, 1-12.
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Day of month as written; 32 for the fiscal-year end marker.
    #[must_use]
    pub const fn day(self) -> u8 {
        self.day
    }

    /// Named month.
    #[must_use]
    pub fn bs_month(self) -> BsMonth {
        // month is validated on construction
        BsMonth::ALL[usize::from(self.month - 1)]
    }

    /// Returns true for the Ashad 32 marker.
    #[must_use]
    pub const fn is_fiscal_year_end_marker(self) -> bool {
        self.month == FISCAL_YEAR_END_MONTH && self.day == FISCAL_YEAR_END_MARKER_DAY
    }

    /// Day of month with the end marker resolved to the real last day of Ashad.
    pub(crate) fn resolved_day(self) -> Result<u8, CalendarError> {
        if self.is_fiscal_year_end_marker() {
            days_in_month(self.year, self.month)
        } else {
            Ok(self.day)
        }
    }

    /// Renders the date in the requested layout.
    #[must_use]
    pub fn format(self, format: DateFormat) -> String {
        let month = self.bs_month().name();
        match format {
            DateFormat::Iso => self.to_string(),
            DateFormat::ShortMonth => format!("{} {} {}", self.day, &month[..3], self.year),
            DateFormat::LongMonth => format!("{} {} {}", self.day, month, self.year),
        }
    }
}

impl fmt::Display for BsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for BsDate {
    type Err = CalendarError;

    /// Parses `YYYY-MM-DD` (zero padding optional) and validates the result.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidFormat(s.to_string());
        let mut parts = s.trim().splitn(3, '-');
        let year = parts
            .next()
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or_else(invalid)?;
        let month = parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .ok_or_else(invalid)?;
        let day = parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .ok_or_else(invalid)?;
        Self::new(year, month, day)
    }
}

impl TryFrom<String> for BsDate {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BsDate> for String {
    fn from(date: BsDate) -> Self {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_validates_day_against_table() {
        assert!(BsDate::new(2080, 2, 32).is_ok());
        assert!(matches!(
            BsDate::new(2080, 1, 32),
            Err(CalendarError::InvalidDay { max: 31, .. })
        ));
        assert!(matches!(
            BsDate::new(2080, 1, 0),
            Err(CalendarError::InvalidDay { .. })
        ));
        assert!(matches!(
            BsDate::new(2095, 1, 1),
            Err(CalendarError::UnsupportedYear(2095))
        ));
    }

    #[test]
    fn test_fiscal_year_end_marker_is_accepted() {
        // Ashad 2083 has 31 days, the marker is still valid
        let end = BsDate::fiscal_year_end(2083).unwrap();
        assert!(end.is_fiscal_year_end_marker());
        assert_eq!(end.to_string(), "2083-03-32");
        assert_eq!(end.resolved_day().unwrap(), 31);
        assert!(BsDate::new(2083, 2, 33).is_err());
    }

    #[rstest]
    #[case("2082-04-01", 2082, 4, 1)]
    #[case("2080-2-32", 2080, 2, 32)]
    #[case(" 2083-03-32 ", 2083, 3, 32)]
    fn test_parse(#[case] input: &str, #[case] year: i32, #[case] month: u8, #[case] day: u8) {
        let date: BsDate = input.parse().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (year, month, day));
    }

    #[rstest]
    #[case("2082/04/01")]
    #[case("2082-04")]
    #[case("abcd-01-01")]
    #[case("")]
    fn test_parse_rejects_bad_format(#[case] input: &str) {
        assert!(matches!(
            input.parse::<BsDate>(),
            Err(CalendarError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_components() {
        assert!(matches!(
            "2082-13-01".parse::<BsDate>(),
            Err(CalendarError::InvalidMonth(13))
        ));
        assert!(matches!(
            "2070-01-01".parse::<BsDate>(),
            Err(CalendarError::UnsupportedYear(2070))
        ));
    }

    #[test]
    fn test_format_layouts() {
        let date = BsDate::new(2082, 4, 1).unwrap();
        assert_eq!(date.format(DateFormat::Iso), "2082-04-01");
        assert_eq!(date.format(DateFormat::ShortMonth), "1 Shr 2082");
        assert_eq!(date.format(DateFormat::LongMonth), "1 Shrawan 2082");
    }

    #[test]
    fn test_month_names() {
        assert_eq!(BsMonth::from_number(1).unwrap().name(), "Baishakh");
        assert_eq!(BsMonth::from_number(12).unwrap(), BsMonth::Chaitra);
        assert_eq!(BsMonth::Poush.gregorian_span(), "December-January");
        assert!(BsMonth::from_number(0).is_err());
        assert_eq!(
            BsDate::new(2081, 9, 15).unwrap().bs_month(),
            BsMonth::Poush
        );
    }

    #[test]
    fn test_serde_uses_display_string() {
        let date = BsDate::new(2081, 1, 1).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2081-01-01\"");
        let back: BsDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
        assert!(serde_json::from_str::<BsDate>("\"2081-01-40\"").is_err());
    }
}
