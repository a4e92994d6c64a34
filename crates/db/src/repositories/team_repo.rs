//! Repository for the `teams` table and its `user_teams` membership links.

use sqlx::PgPool;
use taskforge_core::types::DbId;
use taskforge_core::validation::validate_fields;

use crate::cascade;
use crate::error::DbError;
use crate::models::team::{CreateTeam, Team, TeamMembership, UpdateTeam};
use crate::models::user::User;
use crate::schema::EntityName;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, deleted_at, created_at, updated_at";

const MEMBERSHIP_COLUMNS: &str = "id, user_id, team_id, created_at, updated_at";

/// Provides CRUD and membership operations for teams.
pub struct TeamRepo;

impl TeamRepo {
    /// Insert a new team, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTeam) -> Result<Team, DbError> {
        validate_fields(input)?;
        let query = format!(
            "INSERT INTO teams (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let team = sqlx::query_as::<_, Team>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await?;
        tracing::info!(team_id = team.id, "Team created");
        Ok(team)
    }

    /// Find a team by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a team by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all teams ordered by name. Excludes soft-deleted rows.
    pub async fn list(pool: &PgPool) -> Result<Vec<Team>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM teams WHERE deleted_at IS NULL ORDER BY name ASC");
        sqlx::query_as::<_, Team>(&query).fetch_all(pool).await
    }

    /// Update a team. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTeam,
    ) -> Result<Option<Team>, DbError> {
        validate_fields(input)?;
        let query = format!(
            "UPDATE teams SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let team = sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await?;
        Ok(team)
    }

    /// Soft-delete a team by ID. Returns `true` if a row was marked deleted.
    ///
    /// Its projects (and their tasks, time entries and comments) are
    /// soft-deleted with it and memberships are removed.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::soft_delete(pool, EntityName::Team, id).await
    }

    /// Restore a soft-deleted team. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::restore(pool, EntityName::Team, id).await
    }

    /// Permanently delete a team by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::purge(pool, EntityName::Team, id).await
    }

    // ── Membership ────────────────────────────────────────────────────

    /// Add a live user to a live team.
    ///
    /// Returns `None` if either side is missing or soft-deleted, or if the
    /// user is already a member.
    pub async fn add_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<Option<TeamMembership>, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_teams (user_id, team_id)
             SELECT $1, $2
             WHERE EXISTS (SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)
               AND EXISTS (SELECT 1 FROM teams WHERE id = $2 AND deleted_at IS NULL)
             ON CONFLICT ON CONSTRAINT uq_user_teams_user_id_team_id DO NOTHING
             RETURNING {MEMBERSHIP_COLUMNS}"
        );
        sqlx::query_as::<_, TeamMembership>(&query)
            .bind(user_id)
            .bind(team_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove a user from a team. Returns `true` if a membership was removed.
    pub async fn remove_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_teams WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List live members of a team, ordered by last then first name.
    pub async fn list_members(pool: &PgPool, team_id: DbId) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name, u.is_active,
                    u.last_login, u.deleted_at, u.created_at, u.updated_at
             FROM user_teams ut
             JOIN users u ON u.id = ut.user_id AND u.deleted_at IS NULL
             WHERE ut.team_id = $1
             ORDER BY u.last_name ASC, u.first_name ASC",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    /// List live teams a user belongs to, ordered by name.
    pub async fn list_teams_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            "SELECT t.id, t.name, t.description, t.deleted_at, t.created_at, t.updated_at
             FROM user_teams ut
             JOIN teams t ON t.id = ut.team_id AND t.deleted_at IS NULL
             WHERE ut.user_id = $1
             ORDER BY t.name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
