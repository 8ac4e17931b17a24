//! Bearer token issuance and validation.
//!
//! Tokens are JWTs signed with HS256. The subject claim carries the user's
//! login, the issuer is always `taskledger`, and tokens expire 30 minutes
//! after issuance.
//!
//! # Example
//!
//! ```
//! use taskledger_shared::auth::jwt::{create_token, validate_token, Claims};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let claims = Claims::new("alice");
//! let token = create_token(&claims, "a-secret-key-of-at-least-32-bytes!")?;
//!
//! let validated = validate_token(&token, "a-secret-key-of-at-least-32-bytes!")?;
//! assert_eq!(validated.sub, "alice");
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access token lifetime in minutes.
pub const TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Issuer claim stamped into every token.
const ISSUER: &str = "taskledger";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Issuer claim did not match
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// JWT claims.
///
/// Standard claims only: `sub` (the user's login), `iss`, `iat`, `exp`,
/// `nbf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's login
    pub sub: String,

    /// Issuer - always "taskledger"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a login with the default 30-minute expiry.
    pub fn new(login: impl Into<String>) -> Self {
        Self::with_expiration(login, Duration::minutes(TOKEN_EXPIRE_MINUTES))
    }

    /// Creates claims with a custom expiry.
    pub fn with_expiration(login: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: login.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks whether the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string.
///
/// The secret should be at least 32 bytes for HS256; the API server enforces
/// that at configuration time.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its claims.
///
/// Verifies the signature, the expiry and not-before windows, and that the
/// issuer is `taskledger`.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
