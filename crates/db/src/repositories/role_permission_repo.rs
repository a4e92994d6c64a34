//! Repository for the `role_permissions` junction table.

use sqlx::PgPool;
use taskforge_core::types::{DbId, Timestamp};

use crate::models::permission::Permission;
use crate::models::role::GrantedPermission;
use crate::models::role_permission::{CreateRolePermission, RolePermission};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, role_id, permission_id, conditions, created_at, updated_at";

/// Permission joined with the grant's conditions.
#[derive(sqlx::FromRow)]
pub(crate) struct GrantRow {
    pub role_id: DbId,
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub conditions: serde_json::Value,
}

impl From<GrantRow> for GrantedPermission {
    fn from(row: GrantRow) -> Self {
        Self {
            permission: Permission {
                id: row.id,
                name: row.name,
                description: row.description,
                resource: row.resource,
                action: row.action,
                deleted_at: row.deleted_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            conditions: row.conditions,
        }
    }
}

/// Live permissions granted to the roles in `$1`, with conditions.
pub(crate) const GRANTS_FOR_ROLES: &str =
    "SELECT rp.role_id, p.id, p.name, p.description, p.resource, p.action,
            p.deleted_at, p.created_at, p.updated_at, rp.conditions
     FROM role_permissions rp
     JOIN permissions p ON p.id = rp.permission_id AND p.deleted_at IS NULL
     WHERE rp.role_id = ANY($1)
     ORDER BY rp.role_id, p.name";

/// Grants and revokes permissions on roles.
pub struct RolePermissionRepo;

impl RolePermissionRepo {
    /// Link a permission to a role.
    ///
    /// Re-granting an existing pair replaces its conditions. Returns `None`
    /// if the role or permission is missing or soft-deleted.
    pub async fn grant(
        pool: &PgPool,
        input: &CreateRolePermission,
    ) -> Result<Option<RolePermission>, sqlx::Error> {
        let query = format!(
            "INSERT INTO role_permissions (role_id, permission_id, conditions)
             SELECT $1, $2, COALESCE($3, '{{}}'::jsonb)
             WHERE EXISTS (SELECT 1 FROM roles WHERE id = $1 AND deleted_at IS NULL)
               AND EXISTS (SELECT 1 FROM permissions WHERE id = $2 AND deleted_at IS NULL)
             ON CONFLICT ON CONSTRAINT uq_role_permissions_role_id_permission_id
             DO UPDATE SET conditions = EXCLUDED.conditions
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RolePermission>(&query)
            .bind(input.role_id)
            .bind(input.permission_id)
            .bind(&input.conditions)
            .fetch_optional(pool)
            .await
    }

    /// Remove a permission from a role. Returns `true` if a link was removed.
    pub async fn revoke(
        pool: &PgPool,
        role_id: DbId,
        permission_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2")
                .bind(role_id)
                .bind(permission_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the link between a role and a permission.
    pub async fn find(
        pool: &PgPool,
        role_id: DbId,
        permission_id: DbId,
    ) -> Result<Option<RolePermission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM role_permissions WHERE role_id = $1 AND permission_id = $2"
        );
        sqlx::query_as::<_, RolePermission>(&query)
            .bind(role_id)
            .bind(permission_id)
            .fetch_optional(pool)
            .await
    }

    /// List the raw links of a role.
    pub async fn list_for_role(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Vec<RolePermission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM role_permissions WHERE role_id = $1 ORDER BY permission_id"
        );
        sqlx::query_as::<_, RolePermission>(&query)
            .bind(role_id)
            .fetch_all(pool)
            .await
    }

    /// List the live permissions a role grants, with their conditions,
    /// ordered by permission name.
    pub async fn list_permissions_for_role(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Vec<GrantedPermission>, sqlx::Error> {
        let rows = sqlx::query_as::<_, GrantRow>(GRANTS_FOR_ROLES)
            .bind(vec![role_id])
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(GrantedPermission::from).collect())
    }
}
