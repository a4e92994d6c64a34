//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::status::{TaskPriority, TaskStatus};

/// A task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: Option<DbId>,
    /// `None` when unassigned or when the assignee was deleted.
    pub assignee_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<Timestamp>,
    pub metadata: serde_json::Value,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new task.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    pub project_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `todo` if omitted.
    pub status: Option<TaskStatus>,
    /// Defaults to `medium` if omitted.
    pub priority: Option<TaskPriority>,
    /// Must be in the future at write time.
    pub due_date: Option<Timestamp>,
    /// Defaults to `{}` if omitted.
    pub metadata: Option<serde_json::Value>,
}

/// DTO for updating an existing task. All fields are optional.
///
/// Reassignment goes through `TaskRepo::assign`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    pub project_id: Option<DbId>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Timestamp>,
    /// Set `due_date` to NULL. Cannot be combined with `due_date`.
    #[serde(default)]
    pub clear_due_date: bool,
    pub metadata: Option<serde_json::Value>,
}
