//! Common test utilities for integration tests.
//!
//! Provides a TestContext that connects to the test database, runs
//! migrations, registers a user with a known password, issues a token for
//! it, and builds the router.

use sqlx::PgPool;
use taskledger_api::app::{build_router, AppState};
use taskledger_api::config::Config;
use taskledger_shared::auth::jwt::{create_token, Claims};
use taskledger_shared::auth::password::hash_password;
use taskledger_shared::db::migrations::ensure_database_exists;
use taskledger_shared::models::task::{CreateTask, Task, TaskStatus};
use taskledger_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// Password every test user is registered with.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and a fresh user.
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        ensure_database_exists(&config.database.url).await?;
        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        let user = create_test_user(&db).await?;

        let claims = Claims::new(&user.login);
        let token = create_token(&claims, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            token,
        })
    }

    /// Returns the authorization header value for the context user.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Cleans up test data. Tasks and history cascade from the user rows.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Creates a user with a unique login and the shared test password.
pub async fn create_test_user(db: &PgPool) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            login: format!("test-{}", Uuid::new_v4()),
            password_hash: hash_password(TEST_PASSWORD)?,
        },
    )
    .await?;

    Ok(user)
}

/// Creates a task owned by the given user directly through the model layer.
pub async fn create_owned_task(db: &PgPool, owner_id: Uuid, title: &str) -> anyhow::Result<Task> {
    let task = Task::create(
        db,
        CreateTask {
            owner_id,
            title: title.to_string(),
            description: None,
            status: TaskStatus::Open,
        },
    )
    .await?;

    Ok(task)
}
