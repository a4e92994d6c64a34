//! Permission naming and grant-condition helpers.
//!
//! Permissions are named `"<resource>:<action>"` (e.g. `"task:delete"`).
//! The name is the unique key; `resource` and `action` are stored alongside
//! it so they can be filtered without string parsing.

use serde_json::Value;

use crate::error::CoreError;

/// Separator between resource and action in a permission name.
pub const PERMISSION_SEPARATOR: char = ':';

/// Condition key restricting a grant to resources the user owns.
pub const CONDITION_OWN: &str = "own";

/// Build the canonical permission name for a resource/action pair.
pub fn permission_name(resource: &str, action: &str) -> String {
    format!("{resource}{PERMISSION_SEPARATOR}{action}")
}

/// Split a permission name into `(resource, action)`.
pub fn parse_permission_name(name: &str) -> Result<(&str, &str), CoreError> {
    match name.split_once(PERMISSION_SEPARATOR) {
        Some((resource, action))
            if !resource.is_empty() && !action.is_empty() && !action.contains(PERMISSION_SEPARATOR) =>
        {
            Ok((resource, action))
        }
        _ => Err(CoreError::Validation(format!(
            "permission name must look like 'resource:action', got '{name}'"
        ))),
    }
}

/// Whether a `role_permissions.conditions` payload limits the grant to the
/// user's own resources. Absent or non-boolean `own` means unrestricted.
pub fn conditions_restrict_to_own(conditions: &Value) -> bool {
    conditions
        .get(CONDITION_OWN)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
