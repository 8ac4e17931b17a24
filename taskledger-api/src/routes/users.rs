//! Registration and login endpoints.
//!
//! # Endpoints
//!
//! - `POST /user/create` - register a new account
//! - `POST /login` - exchange credentials for a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Form, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskledger_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Login name
    #[validate(length(min = 3, max = 64, message = "Login must be 3-64 characters"))]
    pub login: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Public view of a user account. The password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Login name
    pub login: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            created_at: user.created_at,
        }
    }
}

/// Login form body (`username` and `password`, form-encoded).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Login name
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Bearer token, valid for 30 minutes
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Registers a new account.
///
/// # Errors
///
/// - `409 Conflict`: login already taken
/// - `422 Unprocessable Entity`: validation failed
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            login: req.login,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, login = %user.login, "User registered");

    Ok(Json(user.into()))
}

/// Authenticates a user and issues a 30-minute bearer token.
///
/// The subject claim of the token is the user's login. A failed lookup and a
/// failed password check produce the same message, so the response does not
/// reveal which logins exist.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown login or wrong password
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_login(&state.db, &form.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect username or password".to_string()))?;

    let valid = password::verify_password(&form.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Incorrect username or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = jwt::Claims::new(&user.login);
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_validation() {
        let valid = CreateUserRequest {
            login: "alice".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short_login = CreateUserRequest {
            login: "ab".to_string(),
            password: "long-enough-password".to_string(),
        };
        assert!(short_login.validate().is_err());

        let short_password = CreateUserRequest {
            login: "alice".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_user_response_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            login: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("argon2id"));
    }
}
