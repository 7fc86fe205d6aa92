//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose calendar, session and settings use cases to Dart via FRB.
//! - Translate core errors into response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Date values cross the boundary as packed `YYYYMMDD` integers.
//! - One session and one study store are shared by every call in the process.

use log::warn;
use once_cell::sync::{Lazy, OnceCell};
use std::sync::Arc;
use studycal_core::config::resolve_db_path;
use studycal_core::settings::{perform, SETTINGS_TITLE};
use studycal_core::{
    clamp_to_today, core_version as core_version_inner, init_logging as init_logging_inner,
    next_month_anchor as next_month_anchor_inner, ping as ping_inner,
    previous_month_anchor as previous_month_anchor_inner, settings_items as settings_items_inner,
    CalendarController, CellView, DateKey, LookupConfig, LookupError, LookupResult,
    SettingsAction, SettingsOutcome, SqliteStudyStore, StudiedDateLookup, StudiedDateSet,
    StudyRecord, UserSession,
};
use tokio::runtime::{Builder, Runtime};

const STUDY_DB_FILE_NAME: &str = "studycal.sqlite3";

static SESSION: Lazy<UserSession> = Lazy::new(UserSession::new);
static STUDY_STORE: OnceCell<Arc<SqliteStudyStore>> = OnceCell::new();
static LOOKUP_RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - UI-thread safe for current implementation.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One rendered calendar cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCellItem {
    /// Grid position, row-major, Sunday first.
    pub index: u32,
    /// Day number shown in the cell.
    pub label: u32,
    /// Packed date; `None` for trailing fillers.
    pub date_key: Option<u32>,
    /// Whether taps on this cell select a date.
    pub interactive: bool,
    pub studied: bool,
    pub selected: bool,
}

/// Calendar render envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarViewResponse {
    /// `false` only when inputs were invalid; lookup failures still render.
    pub ok: bool,
    /// Anchor actually displayed after the forward clamp.
    pub anchor: u32,
    /// Header title (`YYYY.MM`).
    pub title: String,
    /// Sunday-first weekday labels.
    pub weekday_labels: Vec<String>,
    /// Padded cells, a multiple of 7.
    pub cells: Vec<CalendarCellItem>,
    pub can_show_next_month: bool,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl CalendarViewResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            anchor: 0,
            title: String::new(),
            weekday_labels: Vec::new(),
            cells: Vec::new(),
            can_show_next_month: false,
            message: message.into(),
        }
    }
}

/// Month navigation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorResponse {
    pub ok: bool,
    /// New anchor; echoes the input when navigation was refused.
    pub anchor: u32,
    pub message: String,
}

/// Studied-day lookup envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudiedDaysResponse {
    pub ok: bool,
    /// Ascending packed dates; empty on failure or when signed out.
    pub days: Vec<u32>,
    pub message: String,
}

/// Generic action response envelope for write flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Optional created record ID.
    pub record_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl StudyActionResponse {
    fn success(message: impl Into<String>, record_id: String) -> Self {
        Self {
            ok: true,
            record_id: Some(record_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
        }
    }
}

/// Session transition envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub ok: bool,
    /// Signed-in username after the call.
    pub username: Option<String>,
    pub message: String,
}

/// One settings row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsItemView {
    /// Stable action ID passed back to `settings_perform`.
    pub action: String,
    pub label: String,
}

/// Settings screen model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsScreen {
    pub title: String,
    pub items: Vec<SettingsItemView>,
}

/// Settings action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsActionResponse {
    pub ok: bool,
    /// `logged_out|already_logged_out` on success.
    pub outcome: Option<String>,
    pub message: String,
}

/// Renders one month with studied markers for the signed-in user.
///
/// Input semantics:
/// - `anchor`: any day of the month to show; months after `today` clamp to `today`.
/// - `today`: current local date.
/// - `selected`: highlighted date.
///
/// # FFI contract
/// - Async call (worker thread), DB-backed execution.
/// - Lookup failures fail open: the grid renders without markers and
///   `message` carries the cause.
/// - Never panics.
pub fn calendar_view(anchor: u32, today: u32, selected: u32) -> CalendarViewResponse {
    let (anchor, today, selected) = match (
        parse_key("anchor", anchor),
        parse_key("today", today),
        parse_key("selected", selected),
    ) {
        (Ok(anchor), Ok(today), Ok(selected)) => (anchor, today, selected),
        (Err(message), _, _) | (_, Err(message), _) | (_, _, Err(message)) => {
            return CalendarViewResponse::failure(message);
        }
    };

    let mut controller = CalendarController::new(today, selected);
    let query = controller.refresh(clamp_to_today(anchor, today));
    let result = fetch_for_current_user(query.anchor());
    let message = match &result {
        Ok(days) => format!("{} studied day(s).", days.len()),
        Err(err) => format!("studied-day lookup failed: {err}"),
    };
    controller.apply_studied(query, result);

    let view = controller.view();
    CalendarViewResponse {
        ok: true,
        anchor: view.anchor.value(),
        title: view.title,
        weekday_labels: view
            .weekday_labels
            .iter()
            .map(|label| (*label).to_string())
            .collect(),
        cells: view.rows.iter().flatten().map(to_cell_item).collect(),
        can_show_next_month: view.can_show_next_month,
        message,
    }
}

/// Moves one month forward without passing `today`'s month.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Returns `ok=false` and echoes `anchor` when already on `today`'s month.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn next_month_anchor(anchor: u32, today: u32) -> AnchorResponse {
    let keys = parse_key("anchor", anchor).and_then(|a| Ok((a, parse_key("today", today)?)));
    let (anchor_key, today_key) = match keys {
        Ok(keys) => keys,
        Err(message) => return anchor_failure(anchor, message),
    };
    if anchor_key.year_month_prefix() >= today_key.year_month_prefix() {
        return anchor_failure(anchor, "already showing the current month");
    }
    let target = clamp_to_today(next_month_anchor_inner(anchor_key), today_key);
    AnchorResponse {
        ok: true,
        anchor: target.value(),
        message: String::new(),
    }
}

/// Moves one month back; the result is normalized to day 1.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn previous_month_anchor(anchor: u32) -> AnchorResponse {
    match parse_key("anchor", anchor) {
        Ok(key) => AnchorResponse {
            ok: true,
            anchor: previous_month_anchor_inner(key).value(),
            message: String::new(),
        },
        Err(message) => anchor_failure(anchor, message),
    }
}

/// Returns studied days of `anchor`'s month for the signed-in user.
///
/// # FFI contract
/// - Async call (worker thread), DB-backed execution.
/// - Signed-out callers receive `ok=true` with no days.
/// - Any failed day fails the whole month (`ok=false`, no partial days).
/// - Never panics.
pub fn fetch_studied_days(anchor: u32) -> StudiedDaysResponse {
    let anchor = match parse_key("anchor", anchor) {
        Ok(anchor) => anchor,
        Err(message) => {
            return StudiedDaysResponse {
                ok: false,
                days: Vec::new(),
                message,
            };
        }
    };
    match fetch_for_current_user(anchor) {
        Ok(days) => StudiedDaysResponse {
            ok: true,
            message: format!("{} studied day(s).", days.len()),
            days: days.into_iter().map(DateKey::value).collect(),
        },
        Err(err) => StudiedDaysResponse {
            ok: false,
            days: Vec::new(),
            message: format!("fetch_studied_days failed: {err}"),
        },
    }
}

/// Records one study session for the signed-in user.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Requires a signed-in session.
/// - Never panics.
/// - Returns operation result and created record ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn record_study(day_key: u32, subject: String, duration_minutes: u32) -> StudyActionResponse {
    let Some(user) = SESSION.current() else {
        return StudyActionResponse::failure("record_study failed: no signed-in user");
    };
    let day = match parse_key("day_key", day_key) {
        Ok(day) => day,
        Err(message) => return StudyActionResponse::failure(message),
    };
    let record = StudyRecord::new(day, subject.trim(), duration_minutes);
    let result = shared_store().and_then(|store| store.insert_record(user.username(), &record));
    match result {
        Ok(id) => StudyActionResponse::success("Study recorded.", id.to_string()),
        Err(err) => {
            warn!("event=record_study module=ffi status=error day={day} error={err}");
            StudyActionResponse::failure(format!("record_study failed: {err}"))
        }
    }
}

/// Signs `username` in, replacing any previous identity.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn session_sign_in(username: String) -> SessionResponse {
    match SESSION.sign_in(username) {
        Ok(identity) => SessionResponse {
            ok: true,
            username: Some(identity.username().to_string()),
            message: "Signed in.".to_string(),
        },
        Err(err) => SessionResponse {
            ok: false,
            username: SESSION.current().map(|user| user.username().to_string()),
            message: format!("session_sign_in failed: {err}"),
        },
    }
}

/// Returns the signed-in username, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn session_current_user() -> Option<String> {
    SESSION.current().map(|user| user.username().to_string())
}

/// Clears the signed-in identity. Idempotent.
#[flutter_rust_bridge::frb(sync)]
pub fn session_logout() -> SessionResponse {
    let message = if SESSION.logout() {
        "Logged out."
    } else {
        "No user was signed in."
    };
    SessionResponse {
        ok: true,
        username: None,
        message: message.to_string(),
    }
}

/// Returns the settings screen model.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_items() -> SettingsScreen {
    SettingsScreen {
        title: SETTINGS_TITLE.to_string(),
        items: settings_items_inner()
            .into_iter()
            .map(|item| SettingsItemView {
                action: item.action.as_str().to_string(),
                label: item.label.to_string(),
            })
            .collect(),
    }
}

/// Performs the settings action identified by `action`.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Unknown action IDs return `ok=false`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_perform(action: String) -> SettingsActionResponse {
    let Some(parsed) = SettingsAction::parse(&action) else {
        return SettingsActionResponse {
            ok: false,
            outcome: None,
            message: format!("unknown settings action `{}`", action.trim()),
        };
    };
    let outcome = match perform(parsed, &SESSION) {
        SettingsOutcome::LoggedOut => "logged_out",
        SettingsOutcome::AlreadyLoggedOut => "already_logged_out",
    };
    SettingsActionResponse {
        ok: true,
        outcome: Some(outcome.to_string()),
        message: String::new(),
    }
}

fn parse_key(name: &str, raw: u32) -> Result<DateKey, String> {
    DateKey::try_from(raw).map_err(|err| format!("invalid {name}: {err}"))
}

fn anchor_failure(anchor: u32, message: impl Into<String>) -> AnchorResponse {
    AnchorResponse {
        ok: false,
        anchor,
        message: message.into(),
    }
}

fn shared_store() -> studycal_core::StoreResult<Arc<SqliteStudyStore>> {
    STUDY_STORE
        .get_or_try_init(|| {
            SqliteStudyStore::open(resolve_db_path(STUDY_DB_FILE_NAME)).map(Arc::new)
        })
        .cloned()
}

fn lookup_runtime() -> LookupResult<&'static Runtime> {
    LOOKUP_RUNTIME.get_or_try_init(|| {
        Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("studycal-lookup")
            .enable_all()
            .build()
            .map_err(|err| LookupError::TaskFailed(format!("runtime start failed: {err}")))
    })
}

/// Signed-out callers get an empty month without touching the store or runtime.
fn fetch_for_current_user(anchor: DateKey) -> LookupResult<StudiedDateSet> {
    let Some(user) = SESSION.current() else {
        return Ok(StudiedDateSet::new());
    };
    let store = shared_store().map_err(|source| LookupError::Store { day: None, source })?;
    let lookup = StudiedDateLookup::with_config(store, LookupConfig::from_env());
    lookup_runtime()?.block_on(lookup.fetch_studied_days(Some(&user), anchor))
}

fn to_cell_item(cell: &CellView) -> CalendarCellItem {
    CalendarCellItem {
        index: cell.index as u32,
        label: cell.label,
        date_key: cell.date.map(DateKey::value),
        interactive: cell.interactive,
        studied: cell.studied,
        selected: cell.selected,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        calendar_view, core_version, fetch_studied_days, init_logging, next_month_anchor, ping,
        previous_month_anchor, record_study, session_current_user, session_logout,
        session_sign_in, settings_items, settings_perform,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn next_month_clamps_to_today_and_stops_there() {
        let response = next_month_anchor(20240215, 20240310);
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.anchor, 20240310);

        let refused = next_month_anchor(20240301, 20240310);
        assert!(!refused.ok);
        assert_eq!(refused.anchor, 20240301);
    }

    #[test]
    fn previous_month_rolls_over_year_and_rejects_bad_keys() {
        assert_eq!(previous_month_anchor(20240131).anchor, 20231201);
        assert!(!previous_month_anchor(20241301).ok);
    }

    #[test]
    fn calendar_view_rejects_invalid_dates() {
        let response = calendar_view(20240230, 20240301, 20240301);
        assert!(!response.ok);
        assert!(response.message.contains("anchor"));
    }

    #[test]
    fn settings_screen_lists_logout() {
        let screen = settings_items();
        assert_eq!(screen.title, "설정");
        assert_eq!(screen.items.len(), 1);
        assert_eq!(screen.items[0].action, "logout");
        assert!(!settings_perform("reset".to_string()).ok);
    }

    // Session state is process-wide, so the signed-in flow runs as one test.
    #[test]
    fn signed_in_flow_records_and_marks_studied_days() {
        let username = unique_token("ffi-user");
        let signed_in = session_sign_in(username.clone());
        assert!(signed_in.ok, "{}", signed_in.message);
        assert_eq!(session_current_user().as_deref(), Some(username.as_str()));

        let recorded = record_study(20240305, "math".to_string(), 30);
        assert!(recorded.ok, "{}", recorded.message);
        assert!(recorded.record_id.is_some());
        assert!(!record_study(20240306, "math".to_string(), 0).ok);

        let fetched = fetch_studied_days(20240320);
        assert!(fetched.ok, "{}", fetched.message);
        assert_eq!(fetched.days, vec![20240305]);

        let view = calendar_view(20240301, 20240310, 20240305);
        assert!(view.ok);
        assert_eq!(view.title, "2024.03");
        assert_eq!(view.cells.len() % 7, 0);
        let studied: Vec<_> = view
            .cells
            .iter()
            .filter(|cell| cell.studied)
            .filter_map(|cell| cell.date_key)
            .collect();
        assert_eq!(studied, vec![20240305]);

        let logout = settings_perform("logout".to_string());
        assert_eq!(logout.outcome.as_deref(), Some("logged_out"));
        assert_eq!(session_current_user(), None);
        assert!(!record_study(20240305, "math".to_string(), 30).ok);

        let signed_out = fetch_studied_days(20240320);
        assert!(signed_out.ok);
        assert!(signed_out.days.is_empty());
        assert!(session_logout().ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
