//! Runtime configuration for lookups and store location.
//!
//! # Responsibility
//! - Hold tunables for the studied-day lookup.
//! - Resolve environment overrides used by the FFI and CLI entry points.
//!
//! # Invariants
//! - `max_in_flight >= 1` and `request_timeout_ms >= 1` after normalization.
//! - Invalid environment values fall back to defaults and are logged, never fatal.

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Overrides `LookupConfig::max_in_flight`.
pub const ENV_LOOKUP_MAX_IN_FLIGHT: &str = "STUDYCAL_LOOKUP_MAX_IN_FLIGHT";
/// Overrides `LookupConfig::request_timeout_ms`.
pub const ENV_LOOKUP_TIMEOUT_MS: &str = "STUDYCAL_LOOKUP_TIMEOUT_MS";
/// Absolute or relative path of the local study-store file.
pub const ENV_DB_PATH: &str = "STUDYCAL_DB_PATH";

const DEFAULT_MAX_IN_FLIGHT: usize = 8;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const MAX_IN_FLIGHT_CAP: usize = 31;

/// Tunables for [`crate::study::lookup::StudiedDateLookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Upper bound of concurrent per-day existence checks.
    pub max_in_flight: usize,
    /// Timeout applied to each store round trip.
    pub request_timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl LookupConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(mut get: impl FnMut(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = parse_var(&mut get, ENV_LOOKUP_MAX_IN_FLIGHT) {
            config.max_in_flight = value;
        }
        if let Some(value) = parse_var(&mut get, ENV_LOOKUP_TIMEOUT_MS) {
            config.request_timeout_ms = value;
        }
        config.normalized()
    }

    /// Clamps fields into their supported ranges.
    ///
    /// A month never has more than 31 days, so more workers cannot help.
    pub fn normalized(self) -> Self {
        Self {
            max_in_flight: self.max_in_flight.clamp(1, MAX_IN_FLIGHT_CAP),
            request_timeout_ms: self.request_timeout_ms.max(1),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Resolves the study-store path from `STUDYCAL_DB_PATH`, falling back to
/// `file_name` inside the system temp directory.
pub fn resolve_db_path(file_name: &str) -> PathBuf {
    match std::env::var(ENV_DB_PATH) {
        Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
        _ => std::env::temp_dir().join(file_name),
    }
}

fn parse_var<T: std::str::FromStr>(
    get: &mut impl FnMut(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = get(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("event=config_parse module=config status=ignored var={name} value={raw}");
            None
        }
    }
}
