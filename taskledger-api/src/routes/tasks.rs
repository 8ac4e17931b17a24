//! Task CRUD and history endpoints.
//!
//! All of these require a bearer token; the authenticated user arrives via
//! the `CurrentUser` request extension. Task lookups are owner-scoped, so a
//! task id belonging to another user behaves like a missing one.
//!
//! # Endpoints
//!
//! - `PUT    /task/create` - create a task owned by the caller
//! - `PUT    /task/update?task_id=` - apply field updates
//! - `POST   /task/history?task_id=` - ordered change log
//! - `DELETE /task/delete?task_id=` - delete a task
//! - `POST   /user/tasks` - list the caller's tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskledger_shared::{
    auth::middleware::CurrentUser,
    models::{
        task::{CreateTask, Task, TaskStatus, UpdateTask},
        task_history::{HistoryKind, TaskHistory},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Query parameter naming the task to operate on.
#[derive(Debug, Deserialize)]
pub struct TaskIdQuery {
    /// Task ID
    pub task_id: Uuid,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 4096, message = "Description must be at most 4096 characters"))]
    pub description: Option<String>,

    /// Initial status (defaults to open)
    #[serde(default)]
    pub status: TaskStatus,
}

/// Update task request. Only the provided fields are changed.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(max = 4096, message = "Description must be at most 4096 characters"))]
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,
}

/// Creates a task owned by the caller.
///
/// A `created` history entry with a full snapshot is appended alongside.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed
/// - `500 Internal Server Error`: task could not be saved
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: user.id,
            title: req.title,
            description: req.description,
            status: req.status,
        },
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, owner_id = %user.id, "Failed to save task");
        ApiError::InternalError("Error while saving task".to_string())
    })?;

    TaskHistory::append(
        &state.db,
        task.id,
        HistoryKind::Created,
        TaskHistory::snapshot(&task),
    )
    .await?;

    tracing::info!(
        task_id = %task.id,
        owner_id = %user.id,
        status = task.status.as_str(),
        "Task created"
    );

    Ok(Json(task))
}

/// Applies field updates to a task.
///
/// Appends an `updated` history entry recording old and new values for each
/// changed field; an update that changes nothing appends no entry.
///
/// # Errors
///
/// - `404 Not Found`: no task with this id owned by the caller
/// - `422 Unprocessable Entity`: validation failed
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<TaskIdQuery>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let before = Task::find_by_id_and_owner(&state.db, query.task_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("task not found".to_string()))?;

    let after = Task::update(
        &state.db,
        query.task_id,
        user.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("task not found".to_string()))?;

    let changes = TaskHistory::changes_between(&before, &after);
    if changes.as_object().is_some_and(|map| !map.is_empty()) {
        TaskHistory::append(&state.db, after.id, HistoryKind::Updated, changes).await?;
    }

    tracing::info!(task_id = %after.id, owner_id = %user.id, "Task updated");

    Ok(StatusCode::OK)
}

/// Returns the ordered change log for a task.
///
/// The log is empty for ids that do not resolve to a task owned by the
/// caller.
pub async fn task_history(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<TaskIdQuery>,
) -> ApiResult<Json<Vec<TaskHistory>>> {
    let owned = Task::find_by_id_and_owner(&state.db, query.task_id, user.id).await?;

    let entries = match owned {
        Some(task) => TaskHistory::list_for_task(&state.db, task.id).await?,
        None => Vec::new(),
    };

    Ok(Json(entries))
}

/// Deletes a task by id.
///
/// # Errors
///
/// - `404 Not Found`: no task with this id owned by the caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<TaskIdQuery>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, query.task_id, user.id).await?;

    if !deleted {
        return Err(ApiError::NotFound("task not found".to_string()));
    }

    tracing::info!(task_id = %query.task_id, owner_id = %user.id, "Task deleted");

    Ok(StatusCode::OK)
}

/// Lists all tasks owned by the caller, newest first.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_by_owner(&state.db, user.id).await?;

    Ok(Json(tasks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_request_validation() {
        let valid = CreateTaskRequest {
            title: "Buy groceries".to_string(),
            description: Some("milk, eggs".to_string()),
            status: TaskStatus::Open,
        };
        assert!(valid.validate().is_ok());

        let empty_title = CreateTaskRequest {
            title: String::new(),
            description: None,
            status: TaskStatus::Open,
        };
        assert!(empty_title.validate().is_err());

        let long_title = CreateTaskRequest {
            title: "a".repeat(256),
            description: None,
            status: TaskStatus::Open,
        };
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_create_task_request_status_defaults_to_open() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title": "Buy groceries"}"#).unwrap();
        assert_eq!(req.status, TaskStatus::Open);
    }

    #[test]
    fn test_update_task_request_all_fields_optional() {
        let req: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.title.is_none());
        assert!(req.status.is_none());

        let empty_title: UpdateTaskRequest = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(empty_title.validate().is_err());
    }
}
