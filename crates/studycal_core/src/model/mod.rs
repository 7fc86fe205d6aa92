//! Domain model for the study calendar.
//!
//! # Responsibility
//! - Define canonical data structures used by grid, lookup and store code.
//! - Keep one integer date identity (`DateKey`) across all layers.
//!
//! # Invariants
//! - Every date crossing a module boundary is a validated `DateKey`.
//! - Study records are addressed by user and day, never by month alone.

pub mod date_key;
pub mod study_record;
