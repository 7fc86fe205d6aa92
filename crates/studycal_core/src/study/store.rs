//! Study store contract.
//!
//! # Responsibility
//! - Define the async seam between lookup logic and the per-user study store.
//! - Provide the shared store error type.
//!
//! # Invariants
//! - `day_has_records` answers "does the day sub-collection hold >= 1 record".
//! - `studied_days_in_range` either returns exactly the days a per-day scan
//!   would report, or `None` when the backend has no ranged query.
//! - Implementations are `Send + Sync` and shared through `Arc`.

use crate::db::DbError;
use crate::model::date_key::DateKey;
use crate::model::study_record::StudyRecordValidationError;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for study record reads and writes.
#[derive(Debug)]
pub enum StoreError {
    Validation(StudyRecordValidationError),
    InvalidUserId(String),
    Db(DbError),
    InvalidData(String),
    /// Backend could not serve the request (network, poisoned state, ...).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidUserId(value) => write!(f, "user id is invalid: `{value}`"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored study data: {message}"),
            Self::Unavailable(message) => write!(f, "study store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidUserId(_) | Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<StudyRecordValidationError> for StoreError {
    fn from(value: StudyRecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read contract of the per-user study store.
#[async_trait]
pub trait StudyStore: Send + Sync {
    /// Short backend name used in log events.
    fn store_id(&self) -> &str;

    /// Returns whether `day` has at least one study record for `user_id`.
    async fn day_has_records(&self, user_id: &str, day: DateKey) -> StoreResult<bool>;

    /// Returns every day in `first..=last` with at least one record.
    ///
    /// Backends without a ranged query keep the default, which returns
    /// `Ok(None)` and makes callers fall back to per-day checks.
    async fn studied_days_in_range(
        &self,
        _user_id: &str,
        _first: DateKey,
        _last: DateKey,
    ) -> StoreResult<Option<BTreeSet<DateKey>>> {
        Ok(None)
    }
}

pub(crate) fn normalize_user_id(user_id: &str) -> StoreResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(StoreError::InvalidUserId(user_id.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{normalize_user_id, StoreError};

    #[test]
    fn normalize_user_id_trims_and_rejects_path_separators() {
        assert_eq!(normalize_user_id("  mina ").expect("valid id"), "mina");
        assert!(matches!(
            normalize_user_id("   "),
            Err(StoreError::InvalidUserId(_))
        ));
        assert!(matches!(
            normalize_user_id("a/b"),
            Err(StoreError::InvalidUserId(_))
        ));
    }
}
