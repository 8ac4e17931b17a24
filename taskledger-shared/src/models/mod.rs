//! Database models for taskledger.
//!
//! Each model is a struct mirroring its table row, with associated async
//! functions for the queries the API needs.
//!
//! - `user`: accounts identified by a unique login
//! - `task`: tasks owned by exactly one user
//! - `task_history`: append-only change log per task

pub mod task;
pub mod task_history;
pub mod user;
