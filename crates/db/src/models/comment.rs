//! Comment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub user_id: DbId,
    pub task_id: DbId,
    pub content: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    pub user_id: DbId,
    pub task_id: DbId,
    #[validate(length(min = 1))]
    pub content: String,
}

/// DTO for editing a comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateComment {
    #[validate(length(min = 1))]
    pub content: String,
}
