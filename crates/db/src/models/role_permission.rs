//! RolePermission junction model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::permissions::conditions_restrict_to_own;
use taskforge_core::types::{DbId, Timestamp};

/// A row from the `role_permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RolePermission {
    pub id: DbId,
    pub role_id: DbId,
    pub permission_id: DbId,
    /// Free-form grant conditions, e.g. `{"own": true}`.
    pub conditions: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RolePermission {
    /// Whether the grant only covers resources the user owns.
    pub fn restricts_to_own(&self) -> bool {
        conditions_restrict_to_own(&self.conditions)
    }
}

/// DTO for linking a permission to a role.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRolePermission {
    pub role_id: DbId,
    pub permission_id: DbId,
    /// Defaults to `{}` if omitted.
    pub conditions: Option<serde_json::Value>,
}
