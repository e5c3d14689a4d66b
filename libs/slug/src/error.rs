//! Error types for slug parsing and validation.

use thiserror::Error;

/// Errors that can occur when building, parsing or querying slugs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The text does not match the grammar of the identifier kind.
    #[error("invalid {kind} format: {message}")]
    Format { kind: &'static str, message: String },

    /// A numeric value does not fit the bit width of the identifier kind.
    #[error("{kind} out of range: {message}")]
    Range { kind: &'static str, message: String },

    /// The input is of a kind the identifier cannot be built from.
    #[error("{kind} cannot be built from {found}")]
    UnsupportedInput {
        kind: &'static str,
        found: &'static str,
    },

    /// The identifier does not support the requested operation.
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },
}

impl SlugError {
    pub(crate) fn format(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Format {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn range(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Range {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the text did not match the expected grammar.
    pub fn is_format_error(&self) -> bool {
        matches!(self, SlugError::Format { .. })
    }

    /// Returns true if a value exceeded its bit width.
    pub fn is_range_error(&self) -> bool {
        matches!(self, SlugError::Range { .. })
    }

    /// Returns true if the input kind was not accepted.
    pub fn is_unsupported_input(&self) -> bool {
        matches!(self, SlugError::UnsupportedInput { .. })
    }

    /// Returns true if the operation is not supported by the identifier.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, SlugError::InvalidOperation { .. })
    }
}
