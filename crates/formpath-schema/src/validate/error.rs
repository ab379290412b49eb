//! Validation error types
//!
//! Errors are accumulated with the path of the offending value; validation
//! of the remaining fields continues after each one.

use core::fmt;

use formpath_document::{FormPath, Literal, ValueKind};
use thiserror::Error;

use crate::error::{ResolveError, display_literals};
use crate::schema::PrimitiveType;

// =============================================================================
// ValidationErrorKind
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: String },

    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: ValueKind },

    #[error("{actual} is not one of {}", display_literals(.allowed))]
    NotInLiteralSet { allowed: Vec<Literal>, actual: String },

    #[error("'{value}' is not a valid {expected}")]
    PatternMismatch { expected: PrimitiveType, value: String },

    #[error("invalid discriminator value {value} for '{tag}', expected one of {}", display_literals(.allowed))]
    InvalidDiscriminator {
        tag: String,
        value: String,
        allowed: Vec<Literal>,
    },

    #[error("missing discriminator '{tag}', expected one of {}", display_literals(.allowed))]
    MissingDiscriminator { tag: String, allowed: Vec<Literal> },

    /// Rejected by a host field validator.
    #[error("{validator}: {message}")]
    Custom {
        validator: &'static str,
        message: String,
    },

    /// The schema itself is broken at this location.
    #[error("schema contract violated: {0}")]
    Contract(ResolveError),
}

// =============================================================================
// FieldError / ValidationFailure
// =============================================================================

/// A validation error and the path of the value it concerns.
///
/// For a missing field the path names the field itself.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub path: FormPath,
    pub kind: ValidationErrorKind,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} validation error(s) for {schema}: {}", .errors.len(), display_errors(.errors))]
pub struct ValidationFailure {
    /// Name of the schema the payload was validated against.
    pub schema: String,
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn paths(&self) -> impl Iterator<Item = &FormPath> {
        self.errors.iter().map(|error| &error.path)
    }

    /// True when any error stems from a broken schema rather than bad data.
    pub fn has_contract_violation(&self) -> bool {
        self.errors
            .iter()
            .any(|error| matches!(error.kind, ValidationErrorKind::Contract(_)))
    }
}

fn display_errors(errors: &[FieldError]) -> String {
    let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
    parts.join("; ")
}
