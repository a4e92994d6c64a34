pub mod error;
pub mod password;
pub mod permissions;
pub mod scope;
pub mod types;
pub mod validation;
