//! Study record domain model.
//!
//! # Responsibility
//! - Define one study session document as kept in the per-user study store.
//! - Provide store addressing helpers shared by store implementations.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - `subject` is non-blank and `duration_minutes > 0` for persisted records.
//! - A record belongs to exactly one day sub-collection, keyed by `day`.

use crate::model::date_key::DateKey;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a study record.
pub type StudyRecordId = Uuid;

/// Root collection name for study documents.
pub const STUDY_COLLECTION: &str = "StudyInfo";

/// One recorded study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRecord {
    pub id: StudyRecordId,
    /// Day sub-collection this record lives in.
    pub day: DateKey,
    pub subject: String,
    pub duration_minutes: u32,
    /// Unix epoch milliseconds.
    pub recorded_at_ms: i64,
}

/// Validation errors for study records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyRecordValidationError {
    BlankSubject,
    ZeroDuration,
}

impl Display for StudyRecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankSubject => write!(f, "study record subject cannot be blank"),
            Self::ZeroDuration => write!(f, "study record duration_minutes must be > 0"),
        }
    }
}

impl Error for StudyRecordValidationError {}

impl StudyRecord {
    /// Creates a record with a generated stable ID and the current timestamp.
    pub fn new(day: DateKey, subject: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            day,
            subject: subject.into(),
            duration_minutes,
            recorded_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Checks persistence invariants.
    pub fn validate(&self) -> Result<(), StudyRecordValidationError> {
        if self.subject.trim().is_empty() {
            return Err(StudyRecordValidationError::BlankSubject);
        }
        if self.duration_minutes == 0 {
            return Err(StudyRecordValidationError::ZeroDuration);
        }
        Ok(())
    }
}

/// Renders the document path of one day's sub-collection.
///
/// Shape: `StudyInfo/{user_id}/{day_key}`.
pub fn study_collection_path(user_id: &str, day: DateKey) -> String {
    format!("{STUDY_COLLECTION}/{user_id}/{day}")
}
