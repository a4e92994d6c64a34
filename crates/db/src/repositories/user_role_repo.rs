//! Repository for the `user_roles` junction table.
//!
//! `resource_id` has no storage-level foreign key, so [`UserRoleRepo::assign`]
//! checks the scoped team or project itself.

use std::collections::HashMap;

use sqlx::PgPool;
use taskforge_core::error::CoreError;
use taskforge_core::scope::ScopeRef;
use taskforge_core::types::DbId;

use crate::error::DbError;
use crate::models::role::{GrantedPermission, Role, RoleWithPermissions};
use crate::models::user_role::{CreateUserRole, UserRole};
use crate::repositories::role_permission_repo::{GrantRow, GRANTS_FOR_ROLES};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, role_id, scope, resource_id, created_at, updated_at";

/// Role joined with the assignment's scope columns.
#[derive(sqlx::FromRow)]
struct HeldRoleRow {
    #[sqlx(flatten)]
    role: Role,
    scope: String,
    resource_id: Option<DbId>,
}

/// Grants and revokes roles on users.
pub struct UserRoleRepo;

impl UserRoleRepo {
    /// Grant a role to a user at a scope.
    ///
    /// The user, role and scoped team/project must all be live. Granting an
    /// assignment that already exists returns the existing row.
    pub async fn assign(pool: &PgPool, input: &CreateUserRole) -> Result<UserRole, DbError> {
        let target = match input.scope {
            ScopeRef::Global => None,
            ScopeRef::Team(id) => Some(("teams", "Team", id)),
            ScopeRef::Project(id) => Some(("projects", "Project", id)),
        };
        if let Some((table, entity, id)) = target {
            let query = format!(
                "SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1 AND deleted_at IS NULL)"
            );
            let live: bool = sqlx::query_scalar(&query).bind(id).fetch_one(pool).await?;
            if !live {
                return Err(CoreError::NotFound { entity, id }.into());
            }
        }

        let query = format!(
            "INSERT INTO user_roles (user_id, role_id, scope, resource_id)
             SELECT $1, $2, $3, $4
             WHERE EXISTS (SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)
               AND EXISTS (SELECT 1 FROM roles WHERE id = $2 AND deleted_at IS NULL)
             ON CONFLICT ON CONSTRAINT uq_user_roles_assignment
             DO UPDATE SET updated_at = user_roles.updated_at
             RETURNING {COLUMNS}"
        );
        let assigned = sqlx::query_as::<_, UserRole>(&query)
            .bind(input.user_id)
            .bind(input.role_id)
            .bind(input.scope.scope_tag())
            .bind(input.scope.resource_id())
            .fetch_optional(pool)
            .await?;

        match assigned {
            Some(row) => {
                tracing::info!(
                    user_id = row.user_id,
                    role_id = row.role_id,
                    scope = %input.scope,
                    "Role assigned"
                );
                Ok(row)
            }
            None => {
                let user_live: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)",
                )
                .bind(input.user_id)
                .fetch_one(pool)
                .await?;
                let (entity, id) = if user_live {
                    ("Role", input.role_id)
                } else {
                    ("User", input.user_id)
                };
                Err(CoreError::NotFound { entity, id }.into())
            }
        }
    }

    /// Revoke a role from a user at a scope. Returns `true` if an
    /// assignment was removed.
    pub async fn revoke(
        pool: &PgPool,
        user_id: DbId,
        role_id: DbId,
        scope: ScopeRef,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM user_roles
             WHERE user_id = $1 AND role_id = $2 AND scope = $3
               AND resource_id IS NOT DISTINCT FROM $4",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(scope.scope_tag())
        .bind(scope.resource_id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List every assignment held by a user, including ones whose scoped
    /// team or project has been soft-deleted.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<UserRole>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_roles WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, UserRole>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List every assignment made at exactly `scope`.
    pub async fn list_for_resource(
        pool: &PgPool,
        scope: ScopeRef,
    ) -> Result<Vec<UserRole>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_roles
             WHERE scope = $1 AND resource_id IS NOT DISTINCT FROM $2
             ORDER BY id"
        );
        sqlx::query_as::<_, UserRole>(&query)
            .bind(scope.scope_tag())
            .bind(scope.resource_id())
            .fetch_all(pool)
            .await
    }

    /// Resolve a user's live roles together with the live permissions each
    /// grants, highest role level first.
    ///
    /// Assignments scoped to a soft-deleted team or project are skipped; the
    /// rows themselves are kept and resolve again once the target is restored.
    pub async fn list_roles_with_permissions(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RoleWithPermissions>, DbError> {
        let held = sqlx::query_as::<_, HeldRoleRow>(
            "SELECT r.id, r.name, r.description, r.is_default, r.level,
                    r.deleted_at, r.created_at, r.updated_at,
                    ur.scope, ur.resource_id
             FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id AND r.deleted_at IS NULL
             WHERE ur.user_id = $1
               AND (ur.scope = 'global'
                    OR (ur.scope = 'team' AND EXISTS (
                        SELECT 1 FROM teams t
                        WHERE t.id = ur.resource_id AND t.deleted_at IS NULL))
                    OR (ur.scope = 'project' AND EXISTS (
                        SELECT 1 FROM projects p
                        WHERE p.id = ur.resource_id AND p.deleted_at IS NULL)))
             ORDER BY r.level DESC, r.name ASC, ur.id ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut role_ids: Vec<DbId> = held.iter().map(|row| row.role.id).collect();
        role_ids.sort_unstable();
        role_ids.dedup();

        let grants = sqlx::query_as::<_, GrantRow>(GRANTS_FOR_ROLES)
            .bind(&role_ids)
            .fetch_all(pool)
            .await?;
        let mut by_role: HashMap<DbId, Vec<GrantedPermission>> = HashMap::new();
        for grant in grants {
            by_role
                .entry(grant.role_id)
                .or_default()
                .push(GrantedPermission::from(grant));
        }

        held.into_iter()
            .map(|row| -> Result<RoleWithPermissions, DbError> {
                let scope = ScopeRef::from_parts(&row.scope, row.resource_id)?;
                let permissions = by_role.get(&row.role.id).cloned().unwrap_or_default();
                Ok(RoleWithPermissions {
                    role: row.role,
                    scope,
                    permissions,
                })
            })
            .collect()
    }
}
