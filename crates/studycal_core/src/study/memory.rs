//! In-process study store.
//!
//! Backs tests and demos. Supports the ranged month query.

use crate::model::date_key::DateKey;
use crate::model::study_record::{StudyRecord, StudyRecordId};
use crate::study::store::{normalize_user_id, StoreError, StoreResult, StudyStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

type DayCollections = BTreeMap<DateKey, Vec<StudyRecord>>;

/// Study store kept entirely in memory.
#[derive(Default)]
pub struct MemoryStudyStore {
    users: RwLock<HashMap<String, DayCollections>>,
}

impl MemoryStudyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record to the user's day sub-collection.
    pub fn insert_record(&self, user_id: &str, record: StudyRecord) -> StoreResult<StudyRecordId> {
        record.validate()?;
        let user_id = normalize_user_id(user_id)?;
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        let id = record.id;
        users
            .entry(user_id.to_string())
            .or_default()
            .entry(record.day)
            .or_default()
            .push(record);
        Ok(id)
    }

    /// Returns all records in one day sub-collection.
    pub fn records_for_day(&self, user_id: &str, day: DateKey) -> StoreResult<Vec<StudyRecord>> {
        let user_id = normalize_user_id(user_id)?;
        let users = self.read_users()?;
        Ok(users
            .get(user_id)
            .and_then(|days| days.get(&day))
            .cloned()
            .unwrap_or_default())
    }

    fn read_users(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<String, DayCollections>>> {
        self.users
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl StudyStore for MemoryStudyStore {
    fn store_id(&self) -> &str {
        "memory"
    }

    async fn day_has_records(&self, user_id: &str, day: DateKey) -> StoreResult<bool> {
        let user_id = normalize_user_id(user_id)?;
        let users = self.read_users()?;
        Ok(users
            .get(user_id)
            .and_then(|days| days.get(&day))
            .is_some_and(|records| !records.is_empty()))
    }

    async fn studied_days_in_range(
        &self,
        user_id: &str,
        first: DateKey,
        last: DateKey,
    ) -> StoreResult<Option<BTreeSet<DateKey>>> {
        let user_id = normalize_user_id(user_id)?;
        if first > last {
            return Ok(Some(BTreeSet::new()));
        }
        let users = self.read_users()?;
        let studied = users
            .get(user_id)
            .map(|days| {
                days.range(first..=last)
                    .filter(|(_, records)| !records.is_empty())
                    .map(|(day, _)| *day)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Some(studied))
    }
}
