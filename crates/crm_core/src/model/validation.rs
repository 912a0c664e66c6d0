//! Input validation shared by store write paths.
//!
//! # Invariants
//! - Validation helpers never mutate state; callers validate before applying.

use std::error::Error;
use std::fmt::{Display, Formatter};

use super::Amount;

/// Malformed or missing required input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    EmptyField(&'static str),
    /// A monetary amount is below zero.
    NegativeAmount { field: &'static str, value: i64 },
    /// A stage move was requested with a delta other than -1 or +1.
    InvalidStageDelta(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` must not be empty"),
            Self::NegativeAmount { field, value } => {
                write!(f, "`{field}` must be non-negative, got {value}")
            }
            Self::InvalidStageDelta(delta) => {
                write!(f, "stage delta must be -1 or +1, got {delta}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Returns the trimmed value, or `EmptyField` when nothing is left.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Trims optional text and collapses blank input to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Converts a signed caller-supplied amount into a stored amount.
pub fn require_amount(field: &'static str, value: i64) -> Result<Amount, ValidationError> {
    Amount::try_from(value).map_err(|_| ValidationError::NegativeAmount { field, value })
}
