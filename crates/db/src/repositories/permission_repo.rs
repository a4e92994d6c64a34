//! Repository for the `permissions` table.

use sqlx::PgPool;
use taskforge_core::types::DbId;
use taskforge_core::validation::validate_fields;

use crate::cascade;
use crate::error::DbError;
use crate::models::permission::{CreatePermission, Permission, UpdatePermission};
use crate::schema::EntityName;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, description, resource, action, deleted_at, created_at, updated_at";

/// Provides CRUD operations for permissions.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Insert a new permission, returning the created row.
    ///
    /// A duplicate live name is rejected by `uq_permissions_name`.
    pub async fn create(pool: &PgPool, input: &CreatePermission) -> Result<Permission, DbError> {
        validate_fields(input)?;
        let query = format!(
            "INSERT INTO permissions (name, description, resource, action)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.resource)
            .bind(&input.action)
            .fetch_one(pool)
            .await?;
        Ok(permission)
    }

    /// Find a permission by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Permission>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM permissions WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live permission by name (case-sensitive).
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM permissions WHERE name = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Permission>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all live permissions ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Permission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM permissions WHERE deleted_at IS NULL ORDER BY name ASC"
        );
        sqlx::query_as::<_, Permission>(&query).fetch_all(pool).await
    }

    /// List live permissions on one resource, ordered by action.
    pub async fn list_by_resource(
        pool: &PgPool,
        resource: &str,
    ) -> Result<Vec<Permission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM permissions
             WHERE resource = $1 AND deleted_at IS NULL
             ORDER BY action ASC"
        );
        sqlx::query_as::<_, Permission>(&query)
            .bind(resource)
            .fetch_all(pool)
            .await
    }

    /// Update a permission. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePermission,
    ) -> Result<Option<Permission>, DbError> {
        validate_fields(input)?;
        let query = format!(
            "UPDATE permissions SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                resource = COALESCE($4, resource),
                action = COALESCE($5, action)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.resource)
            .bind(&input.action)
            .fetch_optional(pool)
            .await?;
        Ok(permission)
    }

    /// Soft-delete a permission by ID. Returns `true` if a row was marked deleted.
    ///
    /// Its role links are removed.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::soft_delete(pool, EntityName::Permission, id).await
    }

    /// Restore a soft-deleted permission. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::restore(pool, EntityName::Permission, id).await
    }

    /// Permanently delete a permission by ID. Returns `true` if a row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        cascade::purge(pool, EntityName::Permission, id).await
    }
}
