//! Record validation rules applied before a write reaches storage.
//!
//! Field-level rules (format, length, range) are declared on the DTOs with
//! `#[derive(Validate)]` and run through [`validate_fields`]. Cross-field
//! rules compare a candidate value with the record's other fields and are
//! plain functions so the repository layer can run them against the merged
//! record on update.

use validator::Validate;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Field-level rules
// ---------------------------------------------------------------------------

/// Run the derived field validators of `input`, mapping failures into
/// [`CoreError::Validation`].
pub fn validate_fields<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate()?;
    Ok(())
}

/// Validate that an integer column constrained to `>= 0` holds a legal value.
pub fn validate_non_negative(value: i32, name: &str) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!(
            "{name} must be >= 0, got {value}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Cross-field rules
// ---------------------------------------------------------------------------

/// Validate that `end`, when present, is strictly later than `start`.
///
/// A missing `end` opts out of the check. Used for project date ranges and
/// time entry intervals.
pub fn validate_end_after_start(
    name: &str,
    start: Timestamp,
    end: Option<Timestamp>,
) -> Result<(), CoreError> {
    match end {
        Some(end) if end <= start => Err(CoreError::Validation(format!(
            "{name} must be after start ({end} <= {start})"
        ))),
        _ => Ok(()),
    }
}

/// Validate that a due date, when present, lies strictly after `now`.
///
/// `now` is the write instant; callers pass `Utc::now()` on every save.
pub fn validate_due_date_in_future(
    due_date: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), CoreError> {
    match due_date {
        Some(due) if due <= now => Err(CoreError::Validation(format!(
            "due_date must be in the future ({due} <= {now})"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
