//! Field-level validation shared by the catalogue, reservation, and user
//! entities.
//!
//! Text fields are trimmed before their length is checked. Lengths count
//! Unicode scalar values, not bytes.

use serde_json::json;

use super::Error;

/// A single field failed its constraints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field was blank once trimmed.
    #[error("{field} must not be empty")]
    Empty {
        /// Offending field name.
        field: &'static str,
    },
    /// The field is shorter than its lower bound.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Offending field name.
        field: &'static str,
        /// Minimum character count.
        min: usize,
    },
    /// The field exceeds its upper bound.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field name.
        field: &'static str,
        /// Maximum character count.
        max: usize,
    },
    /// The field has the wrong shape (for example an e-mail without `@`).
    #[error("{field} is not valid")]
    Malformed {
        /// Offending field name.
        field: &'static str,
    },
}

impl FieldError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::Malformed { field } => field,
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "empty",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::Malformed { .. } => "malformed",
        }
    }
}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        Error::invalid_request(value.to_string()).with_details(json!({
            "field": value.field(),
            "code": value.code(),
        }))
    }
}

/// Inclusive character bounds for a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    /// Minimum characters after trimming.
    pub min: usize,
    /// Maximum characters after trimming.
    pub max: usize,
}

impl TextBounds {
    /// Construct bounds.
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Trim `value` and check it against the bounds.
    ///
    /// # Examples
    /// ```
    /// use lending_backend::domain::{FieldError, TextBounds};
    ///
    /// let bounds = TextBounds::new(3, 16);
    /// assert_eq!(bounds.check("  Fiction ", "title").unwrap(), "Fiction");
    /// assert!(matches!(bounds.check("ab", "title"), Err(FieldError::TooShort { .. })));
    /// ```
    pub fn check(self, value: &str, field: &'static str) -> Result<String, FieldError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FieldError::Empty { field });
        }
        let length = trimmed.chars().count();
        if length < self.min {
            return Err(FieldError::TooShort {
                field,
                min: self.min,
            });
        }
        if length > self.max {
            return Err(FieldError::TooLong {
                field,
                max: self.max,
            });
        }
        Ok(trimmed.to_owned())
    }
}
