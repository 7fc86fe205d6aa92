//! Settings screen model.
//!
//! The screen lists one entry: logout. Rendering belongs to the host UI.

use crate::session::UserSession;
use log::info;
use serde::{Deserialize, Serialize};

/// Header title of the settings screen.
pub const SETTINGS_TITLE: &str = "설정";

/// Action behind a settings entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsAction {
    Logout,
}

impl SettingsAction {
    /// Stable identifier used across the FFI boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logout => "logout",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "logout" => Some(Self::Logout),
            _ => None,
        }
    }
}

/// One tappable row of the settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsItem {
    pub action: SettingsAction,
    pub label: &'static str,
}

/// Result of performing a settings action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOutcome {
    /// A signed-in user was cleared; host should leave authenticated screens.
    LoggedOut,
    /// Nobody was signed in.
    AlreadyLoggedOut,
}

/// Returns the settings entries in display order.
pub fn settings_items() -> Vec<SettingsItem> {
    vec![SettingsItem {
        action: SettingsAction::Logout,
        label: "로그아웃",
    }]
}

/// Executes `action` against the shared session.
pub fn perform(action: SettingsAction, session: &UserSession) -> SettingsOutcome {
    let outcome = match action {
        SettingsAction::Logout if session.logout() => SettingsOutcome::LoggedOut,
        SettingsAction::Logout => SettingsOutcome::AlreadyLoggedOut,
    };
    info!(
        "event=settings_action module=settings status=ok action={} outcome={outcome:?}",
        action.as_str()
    );
    outcome
}
