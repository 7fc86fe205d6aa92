//! Signed-in user identity.
//!
//! # Responsibility
//! - Hold the nullable identity read by the studied-day lookup.
//! - Provide sign-in and logout transitions for the host UI.
//!
//! # Invariants
//! - A stored `UserIdentity` always has a trimmed, non-blank username.
//! - Logout is idempotent.

use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{PoisonError, RwLock};

/// Stable user identifier as exposed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    username: String,
}

/// Session transition errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    InvalidUsername(String),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(value) => write!(f, "username is invalid: `{value}`"),
        }
    }
}

impl Error for SessionError {}

impl UserIdentity {
    /// Validates and normalizes a username.
    pub fn new(username: impl Into<String>) -> Result<Self, SessionError> {
        let raw = username.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(SessionError::InvalidUsername(raw));
        }
        Ok(Self {
            username: trimmed.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Process-local identity holder shared by screens.
#[derive(Debug, Default)]
pub struct UserSession {
    current: RwLock<Option<UserIdentity>>,
}

impl UserSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that is already signed in.
    pub fn signed_in(identity: UserIdentity) -> Self {
        Self {
            current: RwLock::new(Some(identity)),
        }
    }

    /// Returns a snapshot of the signed-in user, if any.
    pub fn current(&self) -> Option<UserIdentity> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }

    /// Replaces the current identity.
    pub fn sign_in(&self, username: impl Into<String>) -> Result<UserIdentity, SessionError> {
        let identity = UserIdentity::new(username)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        info!("event=session_sign_in module=session status=ok");
        Ok(identity)
    }

    /// Clears the identity. Returns `true` when a user was signed in.
    pub fn logout(&self) -> bool {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let cleared = previous.is_some();
        info!("event=session_logout module=session status=ok cleared={cleared}");
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionError, UserIdentity, UserSession};

    #[test]
    fn identity_trims_and_rejects_blank_names() {
        assert_eq!(
            UserIdentity::new("  mina ").expect("valid").username(),
            "mina"
        );
        assert!(matches!(
            UserIdentity::new("  "),
            Err(SessionError::InvalidUsername(_))
        ));
    }

    #[test]
    fn logout_is_idempotent() {
        let session = UserSession::new();
        assert!(!session.logout());
        session.sign_in("mina").expect("sign in");
        assert!(session.is_signed_in());
        assert!(session.logout());
        assert!(!session.logout());
        assert_eq!(session.current(), None);
    }
}
