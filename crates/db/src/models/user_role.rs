//! UserRole junction model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::error::CoreError;
use taskforge_core::scope::ScopeRef;
use taskforge_core::types::{DbId, Timestamp};

/// A row from the `user_roles` table.
///
/// `scope` and `resource_id` are stored as a raw column pair; use
/// [`UserRole::scope_ref`] to read them as a [`ScopeRef`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRole {
    pub id: DbId,
    pub user_id: DbId,
    pub role_id: DbId,
    pub scope: String,
    pub resource_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserRole {
    pub fn scope_ref(&self) -> Result<ScopeRef, CoreError> {
        ScopeRef::from_parts(&self.scope, self.resource_id)
    }
}

/// DTO for granting a role to a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRole {
    pub user_id: DbId,
    pub role_id: DbId,
    pub scope: ScopeRef,
}
