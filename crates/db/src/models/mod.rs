//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` + `Validate` update DTO (all `Option` fields) for patches

pub mod comment;
pub mod notification;
pub mod permission;
pub mod project;
pub mod role;
pub mod role_permission;
pub mod status;
pub mod task;
pub mod team;
pub mod time_entry;
pub mod user;
pub mod user_role;
