//! Append-only change log per task.
//!
//! Every create and every effective update of a task appends one row. Rows
//! are numbered by a per-task monotonic `seq` starting at 0, and the history
//! endpoint reads them back in that order. The `changes` column holds a full
//! snapshot for `created` rows and an `{field: {old, new}}` map for
//! `updated` rows.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE task_history (
//!     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
//!     seq BIGINT NOT NULL,
//!     ts TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     kind VARCHAR(50) NOT NULL,
//!     changes JSONB NOT NULL DEFAULT '{}',
//!     PRIMARY KEY (task_id, seq)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use sqlx::PgPool;
use uuid::Uuid;

use super::task::Task;

/// Kind of history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// Task was created
    Created,

    /// Task fields were changed
    Updated,
}

impl HistoryKind {
    /// Kind as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Created => "created",
            HistoryKind::Updated => "updated",
        }
    }
}

/// One entry in a task's change log.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskHistory {
    /// Task this entry belongs to
    pub task_id: Uuid,

    /// Per-task sequence number, starting at 0
    pub seq: i64,

    /// When the change happened
    pub ts: DateTime<Utc>,

    /// Entry kind ("created" or "updated")
    pub kind: String,

    /// Snapshot or field diff, depending on kind
    pub changes: JsonValue,
}

impl TaskHistory {
    /// Appends an entry to a task's log.
    ///
    /// The next sequence number is derived from the last stored row.
    pub async fn append(
        pool: &PgPool,
        task_id: Uuid,
        kind: HistoryKind,
        changes: JsonValue,
    ) -> Result<Self, sqlx::Error> {
        let last_seq: Option<(i64,)> = sqlx::query_as(
            "SELECT seq FROM task_history WHERE task_id = $1 ORDER BY seq DESC LIMIT 1",
        )
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

        let next_seq = last_seq.map_or(0, |(seq,)| seq + 1);

        let entry = sqlx::query_as::<_, TaskHistory>(
            r#"
            INSERT INTO task_history (task_id, seq, kind, changes)
            VALUES ($1, $2, $3, $4)
            RETURNING task_id, seq, ts, kind, changes
            "#,
        )
        .bind(task_id)
        .bind(next_seq)
        .bind(kind.as_str())
        .bind(changes)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    /// Reads a task's full log in sequence order.
    pub async fn list_for_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let entries = sqlx::query_as::<_, TaskHistory>(
            r#"
            SELECT task_id, seq, ts, kind, changes
            FROM task_history
            WHERE task_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Builds the `changes` payload for a `created` entry.
    pub fn snapshot(task: &Task) -> JsonValue {
        json!({
            "title": task.title,
            "description": task.description,
            "status": task.status,
        })
    }

    /// Builds the `changes` payload for an `updated` entry.
    ///
    /// Returns an `{field: {old, new}}` map holding only the fields that
    /// actually differ; empty when nothing changed.
    pub fn changes_between(before: &Task, after: &Task) -> JsonValue {
        let mut changes = Map::new();

        if before.title != after.title {
            changes.insert(
                "title".to_string(),
                json!({"old": before.title, "new": after.title}),
            );
        }
        if before.description != after.description {
            changes.insert(
                "description".to_string(),
                json!({"old": before.description, "new": after.description}),
            );
        }
        if before.status != after.status {
            changes.insert(
                "status".to_string(),
                json!({"old": before.status, "new": after.status}),
            );
        }

        JsonValue::Object(changes)
    }
}
