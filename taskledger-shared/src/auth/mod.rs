//! Authentication primitives for taskledger.
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`jwt`]: Bearer token issuance and validation (HS256, 30-minute expiry)
//! - [`middleware`]: Axum middleware resolving bearer tokens to the current user

pub mod jwt;
pub mod middleware;
pub mod password;
