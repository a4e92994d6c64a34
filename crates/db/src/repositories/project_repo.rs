//! Repository for the `projects` table.

use sqlx::PgPool;
use taskforge_core::error::CoreError;
use taskforge_core::types::DbId;
use taskforge_core::validation::{validate_end_after_start, validate_fields};

use crate::cascade;
use crate::error::DbError;
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::schema::EntityName;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, team_id, name, description, status, start_date, end_date, \
                       deleted_at, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// If `status` is `None` in the input, defaults to `active`. Rejects an
    /// `end_date` that is not after `start_date`.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, DbError> {
        validate_fields(input)?;
        validate_end_after_start("end_date", input.start_date, input.end_date)?;

        let query = format!(
            "INSERT INTO projects (team_id, name, description, status, start_date, end_date)
             VALUES ($1, $2, $3, COALESCE($4, 'active'::project_status), $5, $6)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(input.team_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await?;
        tracing::info!(project_id = project.id, team_id = ?project.team_id, "Project created");
        Ok(project)
    }

    /// Find a project by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by ID, including soft-deleted rows. Used for parent-check on restore.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects ordered by most recently created first. Excludes soft-deleted rows.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE deleted_at IS NULL ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// List a team's live projects ordered by start date.
    pub async fn list_by_team(pool: &PgPool, team_id: DbId) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE team_id = $1 AND deleted_at IS NULL
             ORDER BY start_date ASC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// The date range is validated against the merged record, so moving
    /// `start_date` past a stored `end_date` is rejected too. `clear_end_date`
    /// removes the end date. Returns `None` if no live row with the given
    /// `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, DbError> {
        validate_fields(input)?;
        if input.clear_end_date && input.end_date.is_some() {
            return Err(CoreError::Validation(
                "end_date and clear_end_date are mutually exclusive".to_string(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, Project>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if input.start_date.is_some() || input.end_date.is_some() {
            let end_date = if input.clear_end_date {
                None
            } else {
                input.end_date.or(current.end_date)
            };
            validate_end_after_start(
                "end_date",
                input.start_date.unwrap_or(current.start_date),
                end_date,
            )?;
        }

        let query = format!(
            "UPDATE projects SET
                team_id = COALESCE($2, team_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                start_date = COALESCE($6, start_date),
                end_date = CASE WHEN $8 THEN NULL ELSE COALESCE($7, end_date) END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.team_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.clear_end_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(project))
    }

    /// Soft-delete a project by ID. Returns `true` if a row was marked deleted.
    ///
    /// Its tasks (and their time entries and comments) are soft-deleted too.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::soft_delete(pool, EntityName::Project, id).await
    }

    /// Restore a soft-deleted project. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::restore(pool, EntityName::Project, id).await
    }

    /// Permanently delete a project by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::purge(pool, EntityName::Project, id).await
    }
}
