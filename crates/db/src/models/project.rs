//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::status::ProjectStatus;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub team_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Timestamp,
    /// Strictly later than `start_date` when set.
    pub end_date: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    pub team_id: Option<DbId>,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `active` if omitted.
    pub status: Option<ProjectStatus>,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    pub team_id: Option<DbId>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    /// Set `end_date` to NULL. Cannot be combined with `end_date`.
    #[serde(default)]
    pub clear_end_date: bool,
}
