//! Role entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::scope::ScopeRef;
use taskforge_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::permission::Permission;

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
    pub level: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRole {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `false` if omitted.
    pub is_default: Option<bool>,
    /// Defaults to 0 if omitted.
    #[validate(range(min = 0))]
    pub level: Option<i32>,
}

/// DTO for updating an existing role. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRole {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_default: Option<bool>,
    #[validate(range(min = 0))]
    pub level: Option<i32>,
}

/// A permission granted through a role, with the grant's conditions.
#[derive(Debug, Clone, Serialize)]
pub struct GrantedPermission {
    pub permission: Permission,
    pub conditions: serde_json::Value,
}

/// A role held by a user at a scope, with every permission it grants.
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    pub role: Role,
    pub scope: ScopeRef,
    pub permissions: Vec<GrantedPermission>,
}
