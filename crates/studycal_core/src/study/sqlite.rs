//! SQLite-backed study store.
//!
//! # Responsibility
//! - Persist study records in a local replica of the per-user study store.
//! - Serve the month lookup with one ranged query over `(user_id, day_key)`.
//!
//! # Invariants
//! - Write paths call `StudyRecord::validate()` before SQL mutations.
//! - Read paths reject persisted day keys that are not valid dates.
//! - The connection is only touched while holding the store mutex.
//! - Async trait methods run their queries on tokio's blocking pool, never
//!   on a runtime worker.

use crate::db::{open_db, open_db_in_memory};
use crate::model::date_key::DateKey;
use crate::model::study_record::{study_collection_path, StudyRecord, StudyRecordId};
use crate::study::store::{normalize_user_id, StoreError, StoreResult, StudyStore};
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    uuid,
    day_key,
    subject,
    duration_minutes,
    recorded_at
FROM study_records";

/// Study store persisted in SQLite.
pub struct SqliteStudyStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStudyStore {
    /// Opens (or creates) a store file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection already bootstrapped by [`crate::db`].
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Inserts one record into the user's day sub-collection.
    pub fn insert_record(&self, user_id: &str, record: &StudyRecord) -> StoreResult<StudyRecordId> {
        record.validate()?;
        let user_id = normalize_user_id(user_id)?;
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO study_records (
                uuid,
                user_id,
                day_key,
                subject,
                duration_minutes,
                recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                record.id.to_string(),
                user_id,
                record.day.value(),
                record.subject.trim(),
                record.duration_minutes,
                record.recorded_at_ms,
            ],
        )?;
        debug!(
            "event=study_record_insert module=store status=ok store=sqlite path={}",
            study_collection_path(user_id, record.day)
        );
        Ok(record.id)
    }

    /// Lists one day sub-collection ordered by record time.
    pub fn list_records(&self, user_id: &str, day: DateKey) -> StoreResult<Vec<StudyRecord>> {
        let user_id = normalize_user_id(user_id)?;
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE user_id = ?1 AND day_key = ?2
             ORDER BY recorded_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![user_id, day.value()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    /// Runs `query` against the connection on the blocking pool.
    async fn run_blocking<T, F>(&self, query: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = lock_conn(&conn)?;
            query(&guard)
        })
            .await
            .map_err(|err| StoreError::Unavailable(format!("sqlite query task failed: {err}")))?
    }
}

#[async_trait]
impl StudyStore for SqliteStudyStore {
    fn store_id(&self) -> &str {
        "sqlite"
    }

    async fn day_has_records(&self, user_id: &str, day: DateKey) -> StoreResult<bool> {
        let user_id = normalize_user_id(user_id)?.to_string();
        self.run_blocking(move |conn| query_day_exists(conn, &user_id, day))
            .await
    }

    async fn studied_days_in_range(
        &self,
        user_id: &str,
        first: DateKey,
        last: DateKey,
    ) -> StoreResult<Option<BTreeSet<DateKey>>> {
        let user_id = normalize_user_id(user_id)?.to_string();
        self.run_blocking(move |conn| query_days_between(conn, &user_id, first, last))
            .await
            .map(Some)
    }
}

fn lock_conn(conn: &Mutex<Connection>) -> StoreResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| StoreError::Unavailable("sqlite store lock poisoned".to_string()))
}

fn query_day_exists(conn: &Connection, user_id: &str, day: DateKey) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM study_records WHERE user_id = ?1 AND day_key = ?2
        );",
        params![user_id, day.value()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn query_days_between(
    conn: &Connection,
    user_id: &str,
    first: DateKey,
    last: DateKey,
) -> StoreResult<BTreeSet<DateKey>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT day_key
         FROM study_records
         WHERE user_id = ?1 AND day_key BETWEEN ?2 AND ?3
         ORDER BY day_key ASC;",
    )?;
    let mut rows = stmt.query(params![user_id, first.value(), last.value()])?;
    let mut days = BTreeSet::new();
    while let Some(row) = rows.next()? {
        days.insert(parse_day_key(row.get::<_, i64>(0)?)?);
    }
    Ok(days)
}

fn parse_day_key(raw: i64) -> StoreResult<DateKey> {
    let value = u32::try_from(raw)
        .map_err(|_| StoreError::InvalidData(format!("day_key out of range: {raw}")))?;
    DateKey::try_from(value).map_err(|err| StoreError::InvalidData(err.to_string()))
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<StudyRecord> {
    let uuid_raw: String = row.get(0)?;
    let id = Uuid::parse_str(&uuid_raw)
        .map_err(|err| StoreError::InvalidData(format!("invalid uuid `{uuid_raw}`: {err}")))?;
    let record = StudyRecord {
        id,
        day: parse_day_key(row.get(1)?)?,
        subject: row.get(2)?,
        duration_minutes: row.get(3)?,
        recorded_at_ms: row.get(4)?,
    };
    record
        .validate()
        .map_err(|err| StoreError::InvalidData(err.to_string()))?;
    Ok(record)
}
