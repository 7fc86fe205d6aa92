//! Study records and the studied-day lookup.
//!
//! # Responsibility
//! - Define the study store seam and its implementations.
//! - Answer "which days of this month were studied" for one user.
//!
//! # Invariants
//! - Lookups are read-only.
//! - Store implementations never leak partial month results.

pub mod lookup;
pub mod memory;
pub mod sqlite;
pub mod store;
