//! Bearer authentication middleware for Axum.
//!
//! Extracts the `Authorization: Bearer <token>` header, validates the token,
//! resolves its subject to a user row, and injects [`CurrentUser`] into the
//! request extensions for handlers to extract.
//!
//! The API server wires this in with `middleware::from_fn_with_state` and
//! maps [`AuthError`] into its unified error type.

use axum::{extract::Request, http::header, middleware::Next, response::Response};
use sqlx::PgPool;

use super::jwt::{validate_token, JwtError};
use crate::models::user::User;

/// The authenticated user, injected into request extensions.
///
/// ```ignore
/// async fn handler(Extension(CurrentUser(user)): Extension<CurrentUser>) { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token subject does not resolve to a user
    #[error("Unknown token subject")]
    UnknownSubject,

    /// Database lookup failed
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Authenticates a request and runs the rest of the stack.
///
/// On success the handler sees a [`CurrentUser`] extension. Token subjects
/// are resolved against the users table on every request, so a token for a
/// deleted account stops working immediately.
pub async fn bearer_auth(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let user = User::find_by_login(&pool, &claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownSubject)?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(AuthError::MissingCredentials.to_string(), "Missing credentials");
        assert_eq!(
            AuthError::InvalidFormat("Expected Bearer token".to_string()).to_string(),
            "Invalid authorization header: Expected Bearer token"
        );
        assert_eq!(AuthError::UnknownSubject.to_string(), "Unknown token subject");
    }
}
