//! Scope of a role assignment.
//!
//! A role is granted either globally or against a single team or project.
//! In storage this is the `(scope, resource_id)` column pair on
//! `user_roles`; `resource_id` carries no foreign key, so [`ScopeRef`] is the
//! only thing keeping the pair consistent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Stored `scope` tag for global assignments.
pub const SCOPE_GLOBAL: &str = "global";
/// Stored `scope` tag for team-scoped assignments.
pub const SCOPE_TEAM: &str = "team";
/// Stored `scope` tag for project-scoped assignments.
pub const SCOPE_PROJECT: &str = "project";

/// Target of a role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "resource_id", rename_all = "snake_case")]
pub enum ScopeRef {
    Global,
    Team(DbId),
    Project(DbId),
}

impl ScopeRef {
    /// The value stored in the `scope` column.
    pub fn scope_tag(&self) -> &'static str {
        match self {
            ScopeRef::Global => SCOPE_GLOBAL,
            ScopeRef::Team(_) => SCOPE_TEAM,
            ScopeRef::Project(_) => SCOPE_PROJECT,
        }
    }

    /// The value stored in the `resource_id` column.
    pub fn resource_id(&self) -> Option<DbId> {
        match self {
            ScopeRef::Global => None,
            ScopeRef::Team(id) | ScopeRef::Project(id) => Some(*id),
        }
    }

    /// Rebuild a scope from its stored column pair.
    ///
    /// Rejects unknown tags, a global scope carrying a resource id, and a
    /// team/project scope without one.
    pub fn from_parts(scope: &str, resource_id: Option<DbId>) -> Result<Self, CoreError> {
        match (scope, resource_id) {
            (SCOPE_GLOBAL, None) => Ok(ScopeRef::Global),
            (SCOPE_TEAM, Some(id)) => Ok(ScopeRef::Team(id)),
            (SCOPE_PROJECT, Some(id)) => Ok(ScopeRef::Project(id)),
            (SCOPE_GLOBAL, Some(id)) => Err(CoreError::Validation(format!(
                "global scope must not carry a resource id, got {id}"
            ))),
            (SCOPE_TEAM | SCOPE_PROJECT, None) => Err(CoreError::Validation(format!(
                "{scope} scope requires a resource id"
            ))),
            (other, _) => Err(CoreError::Validation(format!("unknown scope: {other}"))),
        }
    }
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_id() {
            Some(id) => write!(f, "{}:{id}", self.scope_tag()),
            None => f.write_str(self.scope_tag()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_for_each_variant() {
        assert_eq!(ScopeRef::Global.scope_tag(), "global");
        assert_eq!(ScopeRef::Global.resource_id(), None);
        assert_eq!(ScopeRef::Team(4).scope_tag(), "team");
        assert_eq!(ScopeRef::Team(4).resource_id(), Some(4));
        assert_eq!(ScopeRef::Project(9).scope_tag(), "project");
        assert_eq!(ScopeRef::Project(9).resource_id(), Some(9));
    }

    #[test]
    fn from_parts_accepts_consistent_pairs() {
        assert_eq!(ScopeRef::from_parts("global", None).unwrap(), ScopeRef::Global);
        assert_eq!(ScopeRef::from_parts("team", Some(3)).unwrap(), ScopeRef::Team(3));
        assert_eq!(
            ScopeRef::from_parts("project", Some(7)).unwrap(),
            ScopeRef::Project(7)
        );
    }

    #[test]
    fn from_parts_rejects_inconsistent_pairs() {
        assert!(ScopeRef::from_parts("global", Some(1)).is_err());
        assert!(ScopeRef::from_parts("team", None).is_err());
        assert!(ScopeRef::from_parts("project", None).is_err());
        assert!(ScopeRef::from_parts("workspace", Some(1)).is_err());
    }

    #[test]
    fn display_includes_resource() {
        assert_eq!(ScopeRef::Global.to_string(), "global");
        assert_eq!(ScopeRef::Team(12).to_string(), "team:12");
    }

    #[test]
    fn serializes_as_tagged_pair() {
        let json = serde_json::to_value(ScopeRef::Project(5)).unwrap();
        assert_eq!(json, serde_json::json!({ "scope": "project", "resource_id": 5 }));

        let global = serde_json::to_value(ScopeRef::Global).unwrap();
        assert_eq!(global, serde_json::json!({ "scope": "global" }));
    }
}
