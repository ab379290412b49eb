//! Primitive and literal validators
//!
//! Dates and times arrive as text from form inputs and are checked by
//! pattern only.

use std::sync::LazyLock;

use formpath_document::{Literal, Value};
use regex::Regex;

use crate::schema::PrimitiveType;

use super::context::ValidationContext;
use super::describe;
use super::error::ValidationErrorKind;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid date regex"));

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}:\d{2}(:\d{2}(\.\d+)?)?$").expect("invalid time regex")
});

static DATETIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$")
        .expect("invalid datetime regex")
});

impl ValidationContext<'_, '_> {
    pub(crate) fn validate_primitive(&self, expected: PrimitiveType, value: &Value) -> Value {
        match (expected, value) {
            (PrimitiveType::Text, Value::Text(_))
            | (PrimitiveType::Integer, Value::Integer(_))
            | (PrimitiveType::Float, Value::Float(_))
            | (PrimitiveType::Boolean, Value::Bool(_)) => value.clone(),
            (PrimitiveType::Float, Value::Integer(i)) => Value::Float(*i as f64),
            (PrimitiveType::Date | PrimitiveType::Time | PrimitiveType::DateTime, Value::Text(s)) => {
                let pattern = match expected {
                    PrimitiveType::Date => &*DATE_PATTERN,
                    PrimitiveType::Time => &*TIME_PATTERN,
                    _ => &*DATETIME_PATTERN,
                };
                if !pattern.is_match(s) {
                    self.record_error(ValidationErrorKind::PatternMismatch {
                        expected,
                        value: s.clone(),
                    });
                }
                value.clone()
            }
            _ => self.mismatch(expected, value),
        }
    }

    pub(crate) fn validate_literal(&self, allowed: &[Literal], value: &Value) -> Value {
        let accepted = value
            .as_literal()
            .is_some_and(|literal| allowed.contains(&literal));
        if !accepted {
            self.record_error(ValidationErrorKind::NotInLiteralSet {
                allowed: allowed.to_vec(),
                actual: describe(value),
            });
        }
        value.clone()
    }
}
