//! Application state and router builder.
//!
//! # Router layout
//!
//! ```text
//! /
//! ├── GET    /health          # Health check (public)
//! ├── POST   /user/create     # Registration (public)
//! ├── POST   /login           # Token issuance (public)
//! ├── PUT    /task/create     # Create task (bearer)
//! ├── PUT    /task/update     # Update task fields (bearer)
//! ├── POST   /task/history    # Change log for a task (bearer)
//! ├── DELETE /task/delete     # Delete task (bearer)
//! └── POST   /user/tasks      # List the caller's tasks (bearer)
//! ```
//!
//! # Middleware stack
//!
//! Applied in order: request tracing (tower-http TraceLayer), CORS, and
//! bearer authentication on the task routes.

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskledger_shared::auth::middleware as auth_middleware;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into each request handler via Axum's
/// `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: no token required.
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/user/create", post(routes::users::create_user))
        .route("/login", post(routes::users::login));

    // Task routes: bearer token required.
    let task_routes = Router::new()
        .route("/task/create", put(routes::tasks::create_task))
        .route("/task/update", put(routes::tasks::update_task))
        .route("/task/history", post(routes::tasks::task_history))
        .route("/task/delete", delete(routes::tasks::delete_task))
        .route("/user/tasks", post(routes::tasks::list_tasks))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware layer.
///
/// Validates the token, resolves the subject to a user row and injects
/// `CurrentUser` into request extensions.
async fn bearer_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let secret = state.jwt_secret().to_string();
    let response = auth_middleware::bearer_auth(state.db.clone(), secret, req, next).await?;
    Ok(response)
}
