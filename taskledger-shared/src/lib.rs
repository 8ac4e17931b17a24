//! # Taskledger Shared Library
//!
//! Shared types and business logic used by the taskledger API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, token issuance and request authentication
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the taskledger shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
