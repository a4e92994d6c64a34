//! Error type for repository writes.
//!
//! Reads return plain `sqlx::Error`. Writes can additionally be rejected by
//! validation before any SQL runs, so they return [`DbError`].

use taskforge_core::error::CoreError;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The record was rejected before reaching storage.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage rejected the write or the query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DbError {
    /// `true` if storage rejected the write on a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        self.has_sqlstate(UNIQUE_VIOLATION)
    }

    /// `true` if storage rejected the write on a foreign key.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.has_sqlstate(FOREIGN_KEY_VIOLATION)
    }

    /// `true` if the record failed validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, DbError::Core(CoreError::Validation(_)))
    }

    /// Name of the violated constraint, when storage reports one.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            DbError::Database(sqlx::Error::Database(db_err)) => db_err.constraint(),
            _ => None,
        }
    }

    fn has_sqlstate(&self, code: &str) -> bool {
        match self {
            DbError::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some(code)
            }
            _ => false,
        }
    }
}
