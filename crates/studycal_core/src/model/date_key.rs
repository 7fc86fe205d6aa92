//! Integer-encoded calendar dates.
//!
//! # Responsibility
//! - Define `DateKey`, the single date identifier shared by grid layout,
//!   selection and study-store lookups.
//! - Convert between the packed integer form and `chrono::NaiveDate`.
//!
//! # Invariants
//! - A `DateKey` always encodes a real Gregorian date:
//!   `YEAR*10000 + MONTH*100 + DAY`, `MONTH` in `1..=12`, `DAY` valid for the
//!   month (leap years included).
//! - Ordering of `DateKey` values equals chronological ordering.

use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Earliest supported calendar year.
pub const MIN_YEAR: u32 = 1;
/// Latest supported calendar year.
pub const MAX_YEAR: u32 = 9999;

const UNIX_EPOCH_KEY: DateKey = DateKey(19700101);

/// Packed `YYYYMMDD` calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DateKey(u32);

/// Validation error for malformed date keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateKeyError {
    MonthOutOfRange { value: u32, month: u32 },
    DayOutOfRange { value: u32, day: u32, last_day: u32 },
    /// `year` carries the signed calendar year; `value` packs the remaining components.
    YearOutOfRange { value: u32, year: i64 },
}

impl Display for DateKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MonthOutOfRange { value, month } => {
                write!(f, "date key {value} has invalid month {month}")
            }
            Self::DayOutOfRange {
                value,
                day,
                last_day,
            } => write!(
                f,
                "date key {value} has invalid day {day}; month ends at {last_day}"
            ),
            Self::YearOutOfRange { value, year } => write!(
                f,
                "date key {value} has invalid year {year}; supported years are {MIN_YEAR}..={MAX_YEAR}"
            ),
        }
    }
}

impl Error for DateKeyError {}

impl DateKey {
    /// Earliest representable key, `00010101`.
    pub const MIN: DateKey = DateKey(MIN_YEAR * 10_000 + 101);
    /// Latest representable key, `99991231`.
    pub const MAX: DateKey = DateKey(MAX_YEAR * 10_000 + 1231);

    /// Builds a key from its calendar components.
    ///
    /// # Errors
    /// - Returns `DateKeyError` when month or day are out of range.
    pub fn from_ymd(year: u32, month: u32, day: u32) -> Result<Self, DateKeyError> {
        let value = pack(year, month, day);
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateKeyError::YearOutOfRange {
                value,
                year: i64::from(year),
            });
        }
        if !(1..=12).contains(&month) {
            return Err(DateKeyError::MonthOutOfRange { value, month });
        }
        let last_day = days_in_month(year, month);
        if day == 0 || day > last_day {
            return Err(DateKeyError::DayOutOfRange {
                value,
                day,
                last_day,
            });
        }
        Ok(Self(value))
    }

    /// Builds a key from components already known to be valid.
    ///
    /// Callers inside the crate use this after deriving components from
    /// another valid key (e.g. rolling months), where re-validation is noise.
    pub(crate) fn from_valid_parts(year: u32, month: u32, day: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        debug_assert!(day >= 1 && day <= days_in_month(year, month));
        Self(pack(year, month, day))
    }

    /// Returns the packed integer value.
    pub fn value(self) -> u32 {
        self.0
    }

    pub fn year(self) -> u32 {
        self.0 / 10_000
    }

    pub fn month(self) -> u32 {
        (self.0 / 100) % 100
    }

    pub fn day(self) -> u32 {
        self.0 % 100
    }

    /// Returns `YEAR*10000 + MONTH*100`, the month identity of this key.
    pub fn year_month_prefix(self) -> u32 {
        self.0 / 100 * 100
    }

    /// Returns the first day of this key's month.
    pub fn first_of_month(self) -> Self {
        Self(self.year_month_prefix() + 1)
    }

    /// Converts this key into a chrono date.
    pub fn to_naive_date(self) -> NaiveDate {
        // Components are validated on construction, so chrono always accepts them.
        NaiveDate::from_ymd_opt(self.year() as i32, self.month(), self.day())
            .unwrap_or(NaiveDate::MIN)
    }

    /// Converts a chrono date into a key.
    ///
    /// # Errors
    /// - Returns `DateKeyError::YearOutOfRange` for years outside `MIN_YEAR..=MAX_YEAR`,
    ///   carrying the real year and packed components.
    pub fn from_naive_date(date: NaiveDate) -> Result<Self, DateKeyError> {
        match u32::try_from(date.year()) {
            Ok(year) => Self::from_ymd(year, date.month(), date.day()),
            Err(_) => Err(DateKeyError::YearOutOfRange {
                value: pack(0, date.month(), date.day()),
                year: i64::from(date.year()),
            }),
        }
    }

    /// Returns today's date in local time.
    pub fn today() -> Self {
        let today = chrono::Local::now().date_naive();
        Self::from_naive_date(today).unwrap_or_else(|err| {
            warn!("event=date_today module=model status=fallback fallback={UNIX_EPOCH_KEY} error={err}");
            UNIX_EPOCH_KEY
        })
    }
}

impl TryFrom<u32> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_ymd(value / 10_000, (value / 100) % 100, value % 100)
    }
}

impl From<DateKey> for u32 {
    fn from(value: DateKey) -> Self {
        value.0
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns the number of days in `month` of `year`.
///
/// Month values outside `1..=12` yield `0`.
pub fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn pack(year: u32, month: u32, day: u32) -> u32 {
    year.saturating_mul(10_000)
        .saturating_add(month.saturating_mul(100))
        .saturating_add(day)
}
