//! Validation error types

use thiserror::Error;

/// Validation error for domain models.
///
/// The display text is shown to users as-is, so it reads as a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Field exceeds maximum length
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Field is shorter than the minimum length
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// String doesn't match the required format
    #[error("{field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Number outside of the accepted range
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Invalid enum variant
    #[error("invalid {field} value: '{value}'")]
    InvalidVariant { field: &'static str, value: String },
}

/// Trim `s` and check it is non-empty and at most `max` characters.
pub(crate) fn required(s: &str, field: &'static str, max: usize) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    check_len(trimmed, field, max)?;
    Ok(trimmed.to_owned())
}

/// Trim `s`; blank input becomes `None`.
pub(crate) fn optional(s: Option<&str>, field: &'static str, max: usize) -> Result<Option<String>, ValidationError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_len(trimmed, field, max)?;
            Ok(Some(trimmed.to_owned()))
        }
    }
}

fn check_len(s: &str, field: &'static str, max: usize) -> Result<(), ValidationError> {
    if s.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
