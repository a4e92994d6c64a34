//! Permission entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::permissions::permission_name;
use taskforge_core::types::{DbId, Timestamp};
use validator::Validate;

/// A permission row from the `permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new permission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePermission {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub resource: String,
    #[validate(length(min = 1))]
    pub action: String,
}

impl CreatePermission {
    /// Build a permission named `"<resource>:<action>"`.
    pub fn for_action(resource: &str, action: &str) -> Self {
        Self {
            name: permission_name(resource, action),
            description: None,
            resource: resource.to_string(),
            action: action.to_string(),
        }
    }
}

/// DTO for updating an existing permission. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePermission {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub resource: Option<String>,
    #[validate(length(min = 1))]
    pub action: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_action_builds_canonical_name() {
        let input = CreatePermission::for_action("task", "delete");
        assert_eq!(input.name, "task:delete");
        assert_eq!(input.resource, "task");
        assert_eq!(input.action, "delete");
        assert!(input.validate().is_ok());
    }
}
