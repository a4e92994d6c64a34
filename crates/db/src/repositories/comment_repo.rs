//! Repository for the `comments` table.

use sqlx::PgPool;
use taskforge_core::types::DbId;
use taskforge_core::validation::validate_fields;

use crate::cascade;
use crate::error::DbError;
use crate::models::comment::{Comment, CreateComment, UpdateComment};
use crate::schema::EntityName;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, task_id, content, deleted_at, created_at, updated_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, DbError> {
        validate_fields(input)?;
        let query = format!(
            "INSERT INTO comments (user_id, task_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(input.user_id)
            .bind(input.task_id)
            .bind(&input.content)
            .fetch_one(pool)
            .await?;
        Ok(comment)
    }

    /// Find a comment by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a task's live comments in posting order.
    pub async fn list_by_task(pool: &PgPool, task_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments
             WHERE task_id = $1 AND deleted_at IS NULL
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Replace a comment's content. Returns `None` if no live row matched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateComment,
    ) -> Result<Option<Comment>, DbError> {
        validate_fields(input)?;
        let query = format!(
            "UPDATE comments SET content = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(&input.content)
            .fetch_optional(pool)
            .await?;
        Ok(comment)
    }

    /// Soft-delete a comment by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::soft_delete(pool, EntityName::Comment, id).await
    }

    /// Restore a soft-deleted comment. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::restore(pool, EntityName::Comment, id).await
    }

    /// Permanently delete a comment by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::purge(pool, EntityName::Comment, id).await
    }
}
