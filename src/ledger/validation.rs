//! Input format checks for dates and month filters.
//!
//! Both checks are total: malformed input yields `false` (or `None`), never a
//! panic. Dates typed by the user follow real calendar rules, so `2024-04-31`
//! is rejected and February honours the Gregorian leap-year rule. Dates read
//! back from the ledger file use the looser rule older files were written with
//! (see [`parse_recorded_date`]).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::errors::LedgerError;

const DATE_LEN: usize = 10;
const MONTH_YEAR_LEN: usize = 7;

/// Returns true iff `input` is a real calendar date written as `YYYY-MM-DD`.
pub fn is_valid_date(input: &str) -> bool {
    parse_date(input).is_some()
}

/// Returns true iff `input` is written as `YYYY-MM` with a month in 1-12.
pub fn is_valid_month_year(input: &str) -> bool {
    MonthYear::parse(input).is_some()
}

/// Parses a strict `YYYY-MM-DD` string into a calendar date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let (year, month, day) = split_date(input)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// Parses a date read back from the ledger file.
///
/// Older files accepted any day from 1 to 31 in every month, holding only
/// February to its real length, so `2024-04-31` is kept as written.
pub fn parse_recorded_date(input: &str) -> Option<LedgerDate> {
    let (year, month, day) = split_date(input)?;
    LedgerDate::from_ymd(year as i32, month, day)
}

/// Parses a strict `YYYY-MM` string.
pub fn parse_month_year(input: &str) -> Result<MonthYear, LedgerError> {
    MonthYear::parse(input).ok_or_else(|| LedgerError::InvalidMonthYear(input.to_string()))
}

/// Parses a strict date, reporting the offending input on failure.
pub fn require_date(input: &str) -> Result<NaiveDate, LedgerError> {
    parse_date(input).ok_or_else(|| LedgerError::InvalidDate(input.to_string()))
}

fn split_date(input: &str) -> Option<(u32, u32, u32)> {
    let bytes = input.as_bytes();
    if bytes.len() != DATE_LEN || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    Some((
        digits(&bytes[0..4])?,
        digits(&bytes[5..7])?,
        digits(&bytes[8..10])?,
    ))
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn digits(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0')),
    )
}

/// The date a ledger entry is booked on, shown and stored as `YYYY-MM-DD`.
///
/// Ordering is chronological. Entries loaded from older files may carry a day
/// past the end of a 30-day month; those have no [`NaiveDate`] counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerDate {
    year: i32,
    month: u32,
    day: u32,
}

impl LedgerDate {
    /// Month 1-12 and day 1-31, with February capped at 28 or 29.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        let last_day = match month {
            2 if is_leap_year(year) => 29,
            2 => 28,
            _ => 31,
        };
        ((1..=12).contains(&month) && (1..=last_day).contains(&day))
            .then_some(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for LedgerDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for LedgerDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A calendar month used to filter monthly reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    fn parse(input: &str) -> Option<Self> {
        let bytes = input.as_bytes();
        if bytes.len() != MONTH_YEAR_LEN || bytes[4] != b'-' {
            return None;
        }
        let year = digits(&bytes[0..4])?;
        let month = digits(&bytes[5..7])?;
        Self::new(year as i32, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: impl Into<LedgerDate>) -> bool {
        let date = date.into();
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for MonthYear {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_month_year(s)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
