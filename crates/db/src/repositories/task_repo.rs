//! Repository for the `tasks` table.

use chrono::Utc;
use sqlx::PgPool;
use taskforge_core::error::CoreError;
use taskforge_core::types::DbId;
use taskforge_core::validation::{validate_due_date_in_future, validate_fields};

use crate::cascade;
use crate::error::DbError;
use crate::models::status::TaskStatus;
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::schema::EntityName;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, assignee_id, title, description, status, priority, \
                       due_date, metadata, deleted_at, created_at, updated_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    ///
    /// Status defaults to `todo`, priority to `medium`, metadata to `{}`.
    /// A `due_date` at or before the write instant is rejected.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, DbError> {
        validate_fields(input)?;
        validate_due_date_in_future(input.due_date, Utc::now())?;

        let query = format!(
            "INSERT INTO tasks
                (project_id, assignee_id, title, description, status, priority, due_date, metadata)
             VALUES ($1, $2, $3, $4,
                     COALESCE($5, 'todo'::task_status),
                     COALESCE($6, 'medium'::task_priority),
                     $7,
                     COALESCE($8, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(input.assignee_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status)
            .bind(input.priority)
            .bind(input.due_date)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await?;
        tracing::info!(task_id = task.id, project_id = ?task.project_id, "Task created");
        Ok(task)
    }

    /// Find a task by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a task by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all live tasks, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE deleted_at IS NULL ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// List a project's live tasks, soonest due first (undated last).
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE project_id = $1 AND deleted_at IS NULL
             ORDER BY due_date ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List live tasks assigned to a user, optionally filtered by status.
    pub async fn list_by_assignee(
        pool: &PgPool,
        assignee_id: DbId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE assignee_id = $1 AND deleted_at IS NULL
               AND ($2::task_status IS NULL OR status = $2)
             ORDER BY due_date ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(assignee_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Only non-`None` fields in `input` are applied.
    ///
    /// A `due_date` supplied here is checked against the write instant;
    /// `clear_due_date` removes it. Returns `None` if no live row with the
    /// given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, DbError> {
        validate_fields(input)?;
        if input.clear_due_date && input.due_date.is_some() {
            return Err(CoreError::Validation(
                "due_date and clear_due_date are mutually exclusive".to_string(),
            )
            .into());
        }
        validate_due_date_in_future(input.due_date, Utc::now())?;

        let query = format!(
            "UPDATE tasks SET
                project_id = COALESCE($2, project_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                due_date = CASE WHEN $9 THEN NULL ELSE COALESCE($7, due_date) END,
                metadata = COALESCE($8, metadata)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status)
            .bind(input.priority)
            .bind(input.due_date)
            .bind(&input.metadata)
            .bind(input.clear_due_date)
            .fetch_optional(pool)
            .await?;
        Ok(task)
    }

    /// Set or clear the assignee. Returns `None` if no live task matched.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        assignee_id: Option<DbId>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET assignee_id = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(assignee_id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a task by ID. Returns `true` if a row was marked deleted.
    ///
    /// Its time entries and comments are soft-deleted too.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::soft_delete(pool, EntityName::Task, id).await
    }

    /// Restore a soft-deleted task. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::restore(pool, EntityName::Task, id).await
    }

    /// Permanently delete a task by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::purge(pool, EntityName::Task, id).await
    }
}
