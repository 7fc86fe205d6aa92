//! Core domain logic for the StudyCal calendar and settings screens.
//! This crate is the single source of truth for date-grid and lookup rules.

pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod session;
pub mod settings;
pub mod study;

pub use calendar::controller::{
    month_title, CalendarController, CalendarView, CellView, MonthQuery, SelectionCallback,
    WEEKDAY_LABELS_EN, WEEKDAY_LABELS_KO,
};
pub use calendar::grid::{
    build_grid, clamp_to_today, first_weekday_offset, is_same_month, last_day_of_month,
    last_day_of_previous_month, next_month_anchor, previous_month_anchor, CalendarCell, MonthGrid,
    DAYS_PER_WEEK,
};
pub use config::LookupConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::date_key::{DateKey, DateKeyError};
pub use model::study_record::{
    study_collection_path, StudyRecord, StudyRecordId, StudyRecordValidationError,
};
pub use session::{SessionError, UserIdentity, UserSession};
pub use settings::{settings_items, SettingsAction, SettingsItem, SettingsOutcome};
pub use study::lookup::{LookupError, LookupResult, StudiedDateLookup, StudiedDateSet};
pub use study::memory::MemoryStudyStore;
pub use study::sqlite::SqliteStudyStore;
pub use study::store::{StoreError, StoreResult, StudyStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
