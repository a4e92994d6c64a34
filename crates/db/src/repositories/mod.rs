//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Reads return
//! `sqlx::Error`; writes validate first and return [`crate::DbError`].
//! Default queries exclude soft-deleted rows.

pub mod comment_repo;
pub mod notification_repo;
pub mod permission_repo;
pub mod project_repo;
pub mod role_permission_repo;
pub mod role_repo;
pub mod task_repo;
pub mod team_repo;
pub mod time_entry_repo;
pub mod user_repo;
pub mod user_role_repo;

pub use comment_repo::CommentRepo;
pub use notification_repo::NotificationRepo;
pub use permission_repo::PermissionRepo;
pub use project_repo::ProjectRepo;
pub use role_permission_repo::RolePermissionRepo;
pub use role_repo::RoleRepo;
pub use task_repo::TaskRepo;
pub use team_repo::TeamRepo;
pub use time_entry_repo::TimeEntryRepo;
pub use user_repo::UserRepo;
pub use user_role_repo::UserRoleRepo;
