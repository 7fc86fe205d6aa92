//! Month grid date arithmetic.
//!
//! # Responsibility
//! - Compute weekday alignment and month boundaries for a month anchor.
//! - Build the ordered cell sequence rendered as 7-column week rows.
//! - Roll month anchors forward/backward across year boundaries.
//!
//! # Invariants
//! - Leading filler count equals `first_weekday_offset(anchor)`.
//! - Leading fillers are consecutive and end at
//!   `last_day_of_previous_month(anchor)`.
//! - Trailing fillers are positional only and never carry a real date.
//! - All functions are pure; inputs are validated `DateKey` values.
//! - Every returned key is valid; navigation saturates at the supported
//!   year range instead of leaving it.

use crate::model::date_key::{days_in_month, DateKey, MAX_YEAR, MIN_YEAR};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Number of columns in one week row.
pub const DAYS_PER_WEEK: usize = 7;

/// Returns the weekday index (0 = Sunday) of the first day of `anchor`'s month.
pub fn first_weekday_offset(anchor: DateKey) -> u32 {
    anchor
        .first_of_month()
        .to_naive_date()
        .weekday()
        .num_days_from_sunday()
}

/// Returns the highest valid day number of `anchor`'s month.
pub fn last_day_of_month(anchor: DateKey) -> u32 {
    days_in_month(anchor.year(), anchor.month())
}

/// Returns the last date of the month preceding `anchor`'s month.
///
/// Saturates at `DateKey::MIN` for January of `MIN_YEAR`.
pub fn last_day_of_previous_month(anchor: DateKey) -> DateKey {
    match previous_year_month(anchor) {
        Some((year, month)) => DateKey::from_valid_parts(year, month, days_in_month(year, month)),
        None => DateKey::MIN,
    }
}

/// Returns the first day of the month after `anchor`'s month.
///
/// Saturates at December of `MAX_YEAR`: the result stays in `anchor`'s month.
pub fn next_month_anchor(anchor: DateKey) -> DateKey {
    let (year, month) = match (anchor.year(), anchor.month()) {
        (MAX_YEAR, 12) => return anchor.first_of_month(),
        (year, 12) => (year + 1, 1),
        (year, month) => (year, month + 1),
    };
    DateKey::from_valid_parts(year, month, 1)
}

/// Returns the first day of the month before `anchor`'s month.
///
/// Saturates at January of `MIN_YEAR`: the result stays in `anchor`'s month.
pub fn previous_month_anchor(anchor: DateKey) -> DateKey {
    match previous_year_month(anchor) {
        Some((year, month)) => DateKey::from_valid_parts(year, month, 1),
        None => anchor.first_of_month(),
    }
}

/// Returns whether both keys fall in the same year and month.
pub fn is_same_month(left: DateKey, right: DateKey) -> bool {
    left.year_month_prefix() == right.year_month_prefix()
}

/// Clamps a navigation target so it never moves past `today`'s month.
///
/// Targets in today's month (or later) collapse to `today` itself.
pub fn clamp_to_today(target: DateKey, today: DateKey) -> DateKey {
    if target.year_month_prefix() >= today.year_month_prefix() {
        today
    } else {
        target
    }
}

/// Builds the month grid for `anchor`.
pub fn build_grid(anchor: DateKey) -> MonthGrid {
    let offset = first_weekday_offset(anchor);
    let last_day = last_day_of_month(anchor);
    let previous_last = last_day_of_previous_month(anchor);

    let mut dates = Vec::with_capacity((offset + last_day) as usize);
    for back in (0..offset).rev() {
        dates.push(DateKey::from_valid_parts(
            previous_last.year(),
            previous_last.month(),
            previous_last.day().saturating_sub(back).max(1),
        ));
    }
    let first = anchor.first_of_month();
    for day in 1..=last_day {
        dates.push(DateKey::from_valid_parts(first.year(), first.month(), day));
    }

    MonthGrid {
        anchor: first,
        first_weekday_offset: offset,
        dates,
    }
}

fn previous_year_month(anchor: DateKey) -> Option<(u32, u32)> {
    match (anchor.year(), anchor.month()) {
        (MIN_YEAR, 1) => None,
        (year, 1) => Some((year - 1, 12)),
        (year, month) => Some((year, month - 1)),
    }
}

/// One rendered grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CalendarCell {
    /// Filler day borrowed from the previous month.
    Leading(DateKey),
    /// Real day of the displayed month.
    Day(DateKey),
    /// Positional filler after the month end; carries its label number.
    Trailing(u32),
}

impl CalendarCell {
    /// Returns the real date behind this cell, if any.
    pub fn date(self) -> Option<DateKey> {
        match self {
            Self::Leading(key) | Self::Day(key) => Some(key),
            Self::Trailing(_) => None,
        }
    }

    /// Returns the day number shown for this cell.
    pub fn label(self) -> u32 {
        match self {
            Self::Leading(key) | Self::Day(key) => key.day(),
            Self::Trailing(number) => number,
        }
    }

    /// Only real days of the displayed month accept taps.
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Day(_))
    }
}

/// Computed grid for one month, together with its weekday offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    anchor: DateKey,
    first_weekday_offset: u32,
    dates: Vec<DateKey>,
}

impl MonthGrid {
    /// First day of the displayed month.
    pub fn anchor(&self) -> DateKey {
        self.anchor
    }

    pub fn first_weekday_offset(&self) -> u32 {
        self.first_weekday_offset
    }

    /// Leading fillers followed by real days; trailing fillers excluded.
    pub fn dates(&self) -> &[DateKey] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn leading_count(&self) -> usize {
        self.first_weekday_offset as usize
    }

    /// Real days of the displayed month.
    pub fn month_days(&self) -> &[DateKey] {
        &self.dates[self.leading_count()..]
    }

    /// Length after trailing fillers complete the last week row.
    pub fn padded_len(&self) -> usize {
        self.len().div_ceil(DAYS_PER_WEEK) * DAYS_PER_WEEK
    }

    pub fn row_count(&self) -> usize {
        self.padded_len() / DAYS_PER_WEEK
    }

    /// Returns the cell at `index`; indices past the dates are trailing fillers.
    pub fn cell(&self, index: usize) -> CalendarCell {
        if index >= self.len() {
            return CalendarCell::Trailing((index - self.len() + 1) as u32);
        }
        let key = self.dates[index];
        if index < self.leading_count() {
            CalendarCell::Leading(key)
        } else {
            CalendarCell::Day(key)
        }
    }

    /// Returns every cell up to `padded_len()`.
    pub fn cells(&self) -> Vec<CalendarCell> {
        (0..self.padded_len()).map(|index| self.cell(index)).collect()
    }

    /// Returns cells grouped into week rows.
    pub fn rows(&self) -> Vec<[CalendarCell; DAYS_PER_WEEK]> {
        (0..self.row_count())
            .map(|row| std::array::from_fn(|column| self.cell(row * DAYS_PER_WEEK + column)))
            .collect()
    }

    /// Returns whether a tap at `index` should select a date.
    pub fn is_interactive(&self, index: usize) -> bool {
        index >= self.leading_count() && index < self.len()
    }

    /// Returns whether `key` is a real day of the displayed month.
    pub fn contains_day(&self, key: DateKey) -> bool {
        is_same_month(self.anchor, key)
    }
}
