//! Repository for the `roles` table.

use sqlx::PgPool;
use taskforge_core::types::DbId;
use taskforge_core::validation::validate_fields;

use crate::cascade;
use crate::error::DbError;
use crate::models::role::{CreateRole, Role, UpdateRole};
use crate::schema::EntityName;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, description, is_default, level, deleted_at, created_at, updated_at";

/// Provides CRUD operations for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a new role, returning the created row.
    ///
    /// A duplicate live name is rejected by `uq_roles_name`.
    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, DbError> {
        validate_fields(input)?;
        let query = format!(
            "INSERT INTO roles (name, description, is_default, level)
             VALUES ($1, $2, COALESCE($3, false), COALESCE($4, 0))
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_default)
            .bind(input.level)
            .fetch_one(pool)
            .await?;
        Ok(role)
    }

    /// Find a role by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all live roles, highest level first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM roles WHERE deleted_at IS NULL ORDER BY level DESC, name ASC"
        );
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// List live roles flagged `is_default`.
    pub async fn list_defaults(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM roles
             WHERE is_default = true AND deleted_at IS NULL
             ORDER BY level DESC, name ASC"
        );
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// Update a role. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRole,
    ) -> Result<Option<Role>, DbError> {
        validate_fields(input)?;
        let query = format!(
            "UPDATE roles SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_default = COALESCE($4, is_default),
                level = COALESCE($5, level)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_default)
            .bind(input.level)
            .fetch_optional(pool)
            .await?;
        Ok(role)
    }

    /// Soft-delete a role by ID. Returns `true` if a row was marked deleted.
    ///
    /// Its permission links and user grants are removed.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::soft_delete(pool, EntityName::Role, id).await
    }

    /// Restore a soft-deleted role. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::restore(pool, EntityName::Role, id).await
    }

    /// Permanently delete a role by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::purge(pool, EntityName::Role, id).await
    }
}
