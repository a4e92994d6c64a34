//! Notification entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::status::NotificationType;

/// A row from the `notifications` table. Notifications are hard-deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub is_read: bool,
    /// Id of the task/project/team the notification is about, if any.
    pub related_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNotification {
    pub user_id: DbId,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub related_id: Option<DbId>,
    /// Defaults to `{}` if omitted.
    pub payload: Option<serde_json::Value>,
}
