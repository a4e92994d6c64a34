//! Team entity model, membership link, and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};
use validator::Validate;

/// A team row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `user_teams` membership link table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMembership {
    pub id: DbId,
    pub user_id: DbId,
    pub team_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new team.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTeam {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an existing team. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTeam {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
}
