//! Per-screen calendar state.
//!
//! # Responsibility
//! - Own anchor, grid, studied markers and selection for one calendar widget.
//! - Issue month query tickets and drop results from superseded queries.
//! - Apply the forward-navigation clamp against "today".
//!
//! # Invariants
//! - `grid` always matches `anchor`'s month.
//! - Studied markers are only applied for the latest issued `MonthQuery`.
//! - A failed lookup leaves zero studied markers (fails open).
//! - Only real days of the displayed month can be selected by taps.

use crate::calendar::grid::{
    build_grid, clamp_to_today, next_month_anchor, previous_month_anchor, MonthGrid,
    DAYS_PER_WEEK,
};
use crate::model::date_key::DateKey;
use crate::session::UserIdentity;
use crate::study::lookup::{LookupResult, StudiedDateLookup, StudiedDateSet};
use log::{debug, warn};
use serde::Serialize;

/// Weekday header labels, Sunday first.
pub const WEEKDAY_LABELS_KO: [&str; DAYS_PER_WEEK] = ["일", "월", "화", "수", "목", "금", "토"];
pub const WEEKDAY_LABELS_EN: [&str; DAYS_PER_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Host hook fired when a real day cell is tapped.
pub type SelectionCallback = Box<dyn FnMut(DateKey) + Send>;

/// Ticket for one studied-day lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthQuery {
    generation: u64,
    anchor: DateKey,
}

impl MonthQuery {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn anchor(&self) -> DateKey {
        self.anchor
    }
}

/// Rendered state of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub index: usize,
    pub label: u32,
    pub date: Option<DateKey>,
    pub interactive: bool,
    pub studied: bool,
    pub selected: bool,
}

/// Rendered state of the whole widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub anchor: DateKey,
    pub title: String,
    pub weekday_labels: [&'static str; DAYS_PER_WEEK],
    pub rows: Vec<[CellView; DAYS_PER_WEEK]>,
    pub can_show_next_month: bool,
}

/// Formats the header title as `YYYY.MM`.
pub fn month_title(anchor: DateKey) -> String {
    format!("{:04}.{:02}", anchor.year(), anchor.month())
}

/// State holder for one calendar widget instance.
pub struct CalendarController {
    today: DateKey,
    anchor: DateKey,
    selected: DateKey,
    grid: MonthGrid,
    studied: StudiedDateSet,
    generation: u64,
    weekday_labels: [&'static str; DAYS_PER_WEEK],
    on_select: Option<SelectionCallback>,
}

impl CalendarController {
    /// Creates a controller showing today's month.
    pub fn new(today: DateKey, selected: DateKey) -> Self {
        Self {
            today,
            anchor: today,
            selected,
            grid: build_grid(today),
            studied: StudiedDateSet::new(),
            generation: 0,
            weekday_labels: WEEKDAY_LABELS_KO,
            on_select: None,
        }
    }

    pub fn with_selection_callback(mut self, callback: impl FnMut(DateKey) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn with_weekday_labels(mut self, labels: [&'static str; DAYS_PER_WEEK]) -> Self {
        self.weekday_labels = labels;
        self
    }

    pub fn today(&self) -> DateKey {
        self.today
    }

    pub fn anchor(&self) -> DateKey {
        self.anchor
    }

    pub fn selected(&self) -> DateKey {
        self.selected
    }

    pub fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub fn studied(&self) -> &StudiedDateSet {
        &self.studied
    }

    /// Recomputes the grid for `anchor` and issues a new lookup ticket.
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn refresh(&mut self, anchor: DateKey) -> MonthQuery {
        self.anchor = anchor;
        self.grid = build_grid(anchor);
        self.studied.clear();
        self.generation += 1;
        debug!(
            "event=calendar_refresh module=calendar status=ok anchor={anchor} generation={}",
            self.generation
        );
        MonthQuery {
            generation: self.generation,
            anchor,
        }
    }

    /// Focus signal entry point: refreshes the current anchor.
    pub fn refresh_current(&mut self) -> MonthQuery {
        self.refresh(self.anchor)
    }

    /// Applies a lookup result if `query` is still the latest ticket.
    ///
    /// Returns `false` when the result was dropped as stale.
    pub fn apply_studied(&mut self, query: MonthQuery, result: LookupResult<StudiedDateSet>) -> bool {
        if query.generation != self.generation {
            debug!(
                "event=calendar_apply module=calendar status=stale anchor={} generation={} latest={}",
                query.anchor, query.generation, self.generation
            );
            return false;
        }
        self.studied = match result {
            Ok(days) => days
                .into_iter()
                .filter(|day| self.grid.contains_day(*day))
                .collect(),
            Err(err) => {
                warn!(
                    "event=calendar_apply module=calendar status=error anchor={} error={err}",
                    query.anchor
                );
                StudiedDateSet::new()
            }
        };
        true
    }

    /// Refreshes the current month and awaits its lookup.
    pub async fn load(&mut self, lookup: &StudiedDateLookup, user: Option<&UserIdentity>) -> bool {
        let query = self.refresh_current();
        let result = lookup.fetch_studied_days(user, query.anchor).await;
        self.apply_studied(query, result)
    }

    /// Moves to the previous month.
    pub fn show_previous_month(&mut self) -> MonthQuery {
        self.refresh(previous_month_anchor(self.anchor))
    }

    /// Returns whether forward navigation is enabled.
    pub fn can_show_next_month(&self) -> bool {
        self.anchor.year_month_prefix() < self.today.year_month_prefix()
    }

    /// Moves to the next month, landing on `today` when reaching its month.
    ///
    /// Returns `None` when already showing today's month.
    pub fn show_next_month(&mut self) -> Option<MonthQuery> {
        if !self.can_show_next_month() {
            return None;
        }
        let target = clamp_to_today(next_month_anchor(self.anchor), self.today);
        Some(self.refresh(target))
    }

    /// Handles a tap on grid position `index`.
    ///
    /// Filler cells are inert and return `None`.
    pub fn tap(&mut self, index: usize) -> Option<DateKey> {
        if !self.grid.is_interactive(index) {
            return None;
        }
        let date = self.grid.dates()[index];
        self.selected = date;
        if let Some(callback) = self.on_select.as_mut() {
            callback(date);
        }
        Some(date)
    }

    /// Builds the render model for the current state.
    pub fn view(&self) -> CalendarView {
        let rows = self
            .grid
            .rows()
            .into_iter()
            .enumerate()
            .map(|(row, cells)| {
                std::array::from_fn(|column| {
                    let index = row * DAYS_PER_WEEK + column;
                    let cell = cells[column];
                    let date = cell.date();
                    CellView {
                        index,
                        label: cell.label(),
                        date,
                        interactive: cell.is_interactive(),
                        studied: date.is_some_and(|day| self.studied.contains(&day)),
                        selected: date == Some(self.selected),
                    }
                })
            })
            .collect();

        CalendarView {
            anchor: self.anchor,
            title: month_title(self.anchor),
            weekday_labels: self.weekday_labels,
            rows,
            can_show_next_month: self.can_show_next_month(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{month_title, CalendarController};
    use crate::model::date_key::DateKey;

    fn key(value: u32) -> DateKey {
        DateKey::try_from(value).expect("valid key")
    }

    #[test]
    fn title_is_zero_padded() {
        assert_eq!(month_title(key(20240305)), "2024.03");
    }

    #[test]
    fn view_marks_selected_and_fillers() {
        let controller = CalendarController::new(key(20240115), key(20240115));
        let view = controller.view();
        assert_eq!(view.title, "2024.01");
        assert!(!view.can_show_next_month);

        let first = view.rows[0][0];
        assert_eq!(first.label, 31);
        assert!(!first.interactive);

        let selected: Vec<_> = view
            .rows
            .iter()
            .flatten()
            .filter(|cell| cell.selected)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, Some(key(20240115)));
    }
}
