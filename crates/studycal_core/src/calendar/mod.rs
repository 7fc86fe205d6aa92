//! Calendar widget logic.
//!
//! # Responsibility
//! - `grid`: pure month-grid date arithmetic.
//! - `controller`: per-screen state, navigation and stale-result guarding.
//!
//! # Invariants
//! - Grid computation never touches the study store.
//! - UI layers render `CalendarView` and never recompute dates themselves.

pub mod controller;
pub mod grid;
