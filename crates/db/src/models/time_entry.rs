//! TimeEntry entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `time_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub task_id: DbId,
    pub start_time: Timestamp,
    /// `None` while the timer is running.
    pub end_time: Option<Timestamp>,
    /// Tracked time in seconds.
    pub duration: i32,
    pub description: Option<String>,
    pub is_manual_entry: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new time entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimeEntry {
    pub user_id: DbId,
    pub task_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    /// Seconds. When omitted, derived from `end_time - start_time`, or 0
    /// for a running entry.
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
    pub description: Option<String>,
    /// Defaults to `false` if omitted.
    pub is_manual_entry: Option<bool>,
}

/// DTO for updating an existing time entry. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTimeEntry {
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
    pub description: Option<String>,
    pub is_manual_entry: Option<bool>,
}

/// Whole seconds between `start` and `end`, clamped into `0..=i32::MAX`.
pub fn elapsed_seconds(start: Timestamp, end: Timestamp) -> i32 {
    let secs = (end - start).num_seconds().max(0);
    i32::try_from(secs).unwrap_or(i32::MAX)
}
