//! Studied-day lookup for one calendar month.
//!
//! # Responsibility
//! - Resolve which days of a month have at least one study record.
//! - Prefer one ranged store query; fall back to a bounded concurrent
//!   fan-out of per-day existence checks.
//!
//! # Invariants
//! - No identity means an empty result and zero store calls.
//! - The result equals what a sequential day-1..=last scan would return.
//! - Any per-day failure or timeout fails the whole month; no partial set
//!   is ever returned and outstanding checks are aborted.
//!
//! # Runtime
//! - The fan-out path spawns tasks and must run inside a tokio runtime.

use crate::calendar::grid::last_day_of_month;
use crate::config::LookupConfig;
use crate::model::date_key::DateKey;
use crate::session::UserIdentity;
use crate::study::store::{StoreError, StudyStore};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// Days of one month with at least one study record.
pub type StudiedDateSet = BTreeSet<DateKey>;

pub type LookupResult<T> = Result<T, LookupError>;

/// Month-level lookup failure.
#[derive(Debug)]
pub enum LookupError {
    /// Store rejected a request. `day` is `None` for the ranged query.
    Store {
        day: Option<DateKey>,
        source: StoreError,
    },
    Timeout {
        day: Option<DateKey>,
        timeout_ms: u64,
    },
    /// A fan-out task panicked or was cancelled by the runtime.
    TaskFailed(String),
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store {
                day: Some(day),
                source,
            } => write!(f, "study lookup failed on {day}: {source}"),
            Self::Store { day: None, source } => write!(f, "study month query failed: {source}"),
            Self::Timeout {
                day: Some(day),
                timeout_ms,
            } => write!(f, "study lookup on {day} timed out after {timeout_ms}ms"),
            Self::Timeout {
                day: None,
                timeout_ms,
            } => write!(f, "study month query timed out after {timeout_ms}ms"),
            Self::TaskFailed(message) => write!(f, "study lookup task failed: {message}"),
        }
    }
}

impl Error for LookupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::Timeout { .. } | Self::TaskFailed(_) => None,
        }
    }
}

/// Month lookup service over a shared study store.
#[derive(Clone)]
pub struct StudiedDateLookup {
    store: Arc<dyn StudyStore>,
    config: LookupConfig,
}

impl StudiedDateLookup {
    pub fn new(store: Arc<dyn StudyStore>) -> Self {
        Self::with_config(store, LookupConfig::default())
    }

    pub fn with_config(store: Arc<dyn StudyStore>, config: LookupConfig) -> Self {
        Self {
            store,
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> LookupConfig {
        self.config
    }

    /// Returns the studied days of `anchor`'s month for `user`.
    ///
    /// # Errors
    /// - `LookupError::Store` / `LookupError::Timeout` when any store request fails.
    /// - `LookupError::TaskFailed` when a fan-out task does not complete.
    pub async fn fetch_studied_days(
        &self,
        user: Option<&UserIdentity>,
        anchor: DateKey,
    ) -> LookupResult<StudiedDateSet> {
        let Some(user) = user else {
            debug!(
                "event=studied_lookup module=lookup status=skipped reason=no_user month={}",
                anchor.year_month_prefix() / 100
            );
            return Ok(StudiedDateSet::new());
        };

        let started_at = Instant::now();
        let first = anchor.first_of_month();
        let last = DateKey::from_valid_parts(first.year(), first.month(), last_day_of_month(first));

        let (strategy, result) = match self.ranged_query(user.username(), first, last).await {
            Ok(Some(days)) => ("range", Ok(days)),
            Ok(None) => ("fan_out", self.fan_out(user.username(), first, last).await),
            Err(err) => ("range", Err(err)),
        };

        match &result {
            Ok(days) => info!(
                "event=studied_lookup module=lookup status=ok store={} strategy={strategy} month={} studied={} duration_ms={}",
                self.store.store_id(),
                first.year_month_prefix() / 100,
                days.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=studied_lookup module=lookup status=error store={} strategy={strategy} month={} duration_ms={} error={err}",
                self.store.store_id(),
                first.year_month_prefix() / 100,
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    async fn ranged_query(
        &self,
        user_id: &str,
        first: DateKey,
        last: DateKey,
    ) -> LookupResult<Option<StudiedDateSet>> {
        let answer = timeout(
            self.config.request_timeout(),
            self.store.studied_days_in_range(user_id, first, last),
        )
        .await
        .map_err(|_| LookupError::Timeout {
            day: None,
            timeout_ms: self.config.request_timeout_ms,
        })?
        .map_err(|source| LookupError::Store { day: None, source })?;

        Ok(answer.map(|days| days.into_iter().filter(|day| *day >= first && *day <= last).collect()))
    }

    async fn fan_out(
        &self,
        user_id: &str,
        first: DateKey,
        last: DateKey,
    ) -> LookupResult<StudiedDateSet> {
        let mut pending = (first.day()..=last.day())
            .map(|day| DateKey::from_valid_parts(first.year(), first.month(), day));
        let mut tasks = JoinSet::new();
        for day in pending.by_ref().take(self.config.max_in_flight) {
            self.spawn_check(&mut tasks, user_id, day);
        }

        let mut studied = StudiedDateSet::new();
        // Returning early drops `tasks`, which aborts every outstanding check.
        while let Some(joined) = tasks.join_next().await {
            let (day, has_records) =
                joined.map_err(|err| LookupError::TaskFailed(err.to_string()))?;
            if has_records? {
                studied.insert(day);
            }
            if let Some(next) = pending.next() {
                self.spawn_check(&mut tasks, user_id, next);
            }
        }
        Ok(studied)
    }

    fn spawn_check(
        &self,
        tasks: &mut JoinSet<(DateKey, LookupResult<bool>)>,
        user_id: &str,
        day: DateKey,
    ) {
        let store = Arc::clone(&self.store);
        let user_id = user_id.to_string();
        let request_timeout = self.config.request_timeout();
        let timeout_ms = self.config.request_timeout_ms;
        tasks.spawn(async move {
            let outcome = match timeout(request_timeout, store.day_has_records(&user_id, day)).await
            {
                Ok(answer) => answer.map_err(|source| LookupError::Store {
                    day: Some(day),
                    source,
                }),
                Err(_) => Err(LookupError::Timeout {
                    day: Some(day),
                    timeout_ms,
                }),
            };
            (day, outcome)
        });
    }
}
