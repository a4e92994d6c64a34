//! Repository for the `time_entries` table.

use sqlx::PgPool;
use taskforge_core::types::{DbId, Timestamp};
use taskforge_core::validation::{validate_end_after_start, validate_fields};

use crate::cascade;
use crate::error::DbError;
use crate::models::time_entry::{elapsed_seconds, CreateTimeEntry, TimeEntry, UpdateTimeEntry};
use crate::schema::EntityName;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, task_id, start_time, end_time, duration, description, \
                       is_manual_entry, deleted_at, created_at, updated_at";

/// Provides CRUD operations for time entries.
pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Insert a new time entry, returning the created row.
    ///
    /// Rejects an `end_time` that is not after `start_time`. When `duration`
    /// is omitted it is derived from the interval (0 for a running entry).
    pub async fn create(pool: &PgPool, input: &CreateTimeEntry) -> Result<TimeEntry, DbError> {
        validate_fields(input)?;
        validate_end_after_start("end_time", input.start_time, input.end_time)?;

        let duration = input.duration.unwrap_or_else(|| {
            input
                .end_time
                .map(|end| elapsed_seconds(input.start_time, end))
                .unwrap_or(0)
        });

        let query = format!(
            "INSERT INTO time_entries
                (user_id, task_id, start_time, end_time, duration, description, is_manual_entry)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, false))
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(input.user_id)
            .bind(input.task_id)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(duration)
            .bind(&input.description)
            .bind(input.is_manual_entry)
            .fetch_one(pool)
            .await?;
        Ok(entry)
    }

    /// Find a time entry by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM time_entries WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a task's live time entries in start order.
    pub async fn list_by_task(pool: &PgPool, task_id: DbId) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries
             WHERE task_id = $1 AND deleted_at IS NULL
             ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// List a user's live time entries, most recent first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY start_time DESC"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Total tracked seconds on a task across live entries.
    pub async fn total_duration_for_task(pool: &PgPool, task_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(duration), 0)::BIGINT FROM time_entries
             WHERE task_id = $1 AND deleted_at IS NULL",
        )
        .bind(task_id)
        .fetch_one(pool)
        .await
    }

    /// Update a time entry. Only non-`None` fields in `input` are applied.
    ///
    /// The interval is validated against the merged record. When the
    /// interval changes without an explicit `duration`, the duration is
    /// recomputed from the merged interval. Returns `None` if no live row
    /// with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTimeEntry,
    ) -> Result<Option<TimeEntry>, DbError> {
        validate_fields(input)?;

        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM time_entries WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, TimeEntry>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let start_time = input.start_time.unwrap_or(current.start_time);
        let end_time = input.end_time.or(current.end_time);
        let interval_changed = input.start_time.is_some() || input.end_time.is_some();
        if interval_changed {
            validate_end_after_start("end_time", start_time, end_time)?;
        }

        let duration = match (input.duration, end_time) {
            (Some(duration), _) => Some(duration),
            (None, Some(end)) if interval_changed => Some(elapsed_seconds(start_time, end)),
            _ => None,
        };

        let query = format!(
            "UPDATE time_entries SET
                start_time = COALESCE($2, start_time),
                end_time = COALESCE($3, end_time),
                duration = COALESCE($4, duration),
                description = COALESCE($5, description),
                is_manual_entry = COALESCE($6, is_manual_entry)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(duration)
            .bind(&input.description)
            .bind(input.is_manual_entry)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(entry))
    }

    /// Stop a running entry at `end_time`, recording the elapsed seconds as
    /// its duration. Returns `None` if no live running entry matched.
    pub async fn stop(
        pool: &PgPool,
        id: DbId,
        end_time: Timestamp,
    ) -> Result<Option<TimeEntry>, DbError> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM time_entries
             WHERE id = $1 AND deleted_at IS NULL AND end_time IS NULL
             FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, TimeEntry>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        validate_end_after_start("end_time", current.start_time, Some(end_time))?;

        let query = format!(
            "UPDATE time_entries SET end_time = $2, duration = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .bind(end_time)
            .bind(elapsed_seconds(current.start_time, end_time))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(entry))
    }

    /// Soft-delete a time entry by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::soft_delete(pool, EntityName::TimeEntry, id).await
    }

    /// Restore a soft-deleted time entry. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::restore(pool, EntityName::TimeEntry, id).await
    }

    /// Permanently delete a time entry by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::purge(pool, EntityName::TimeEntry, id).await
    }
}
