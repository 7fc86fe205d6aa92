//! Flutter bridge for the StudyCal core.

pub mod api;
