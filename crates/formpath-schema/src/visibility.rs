//! Conditional field visibility.
//!
//! A field can be shown only when other fields of the form hold certain
//! values. Each [`VisibilityFilter`] names the other field by a path
//! relative to the field's parent record; `_root_` and `_parent_` move
//! the starting point.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use formpath_document::{FormPath, Value};
use thiserror::Error;

use crate::error::ResolveError;
use crate::resolve::Resolver;
use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `in`: the value is one of the expected items.
    In,
    /// `not in`
    NotIn,
    /// `array_contains`: the value is a sequence holding the expected item.
    ArrayContains,
    /// `array_contains_any`: the value shares an item with the expected ones.
    ArrayContainsAny,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown visibility operator '{0}'")]
pub struct UnknownOperator(pub String);

impl FromStr for FilterOperator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "==" => Self::Eq,
            "!=" => Self::NotEq,
            "in" => Self::In,
            "not in" => Self::NotIn,
            "array_contains" => Self::ArrayContains,
            "array_contains_any" => Self::ArrayContainsAny,
            other => return Err(UnknownOperator(other.to_string())),
        })
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::ArrayContains => "array_contains",
            Self::ArrayContainsAny => "array_contains_any",
        };
        f.write_str(token)
    }
}

impl FilterOperator {
    pub fn check(self, value: &Value, expected: &Value) -> bool {
        match self {
            Self::Eq => value == expected,
            Self::NotEq => value != expected,
            Self::In => contains(expected, value),
            Self::NotIn => !contains(expected, value),
            Self::ArrayContains => contains(value, expected),
            Self::ArrayContainsAny => match (value, expected) {
                (Value::Array(items), Value::Array(wanted)) => {
                    items.iter().any(|item| wanted.contains(item))
                }
                _ => false,
            },
        }
    }
}

/// Membership of `needle` in `haystack`; text also matches substrings.
fn contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::Array(items), _) => items.contains(needle),
        (Value::Text(text), Value::Text(part)) => text.contains(part.as_str()),
        _ => false,
    }
}

/// `(path, operator, expected)` condition on another field.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityFilter {
    pub path: FormPath,
    pub operator: FilterOperator,
    pub expected: Value,
}

impl VisibilityFilter {
    pub fn new(path: FormPath, operator: FilterOperator, expected: impl Into<Value>) -> Self {
        Self {
            path,
            operator,
            expected: expected.into(),
        }
    }
}

impl Resolver<'_> {
    /// Whether a field under `parent` is visible given every filter.
    ///
    /// Values missing from `instance` fall back to declared defaults and
    /// otherwise compare as null.
    pub fn is_visible(
        &self,
        instance: &Value,
        schema: &Arc<Schema>,
        parent: &FormPath,
        filters: &[VisibilityFilter],
    ) -> Result<bool, ResolveError> {
        for filter in filters {
            let path = filter.path.rebase(parent);
            let value = match self.resolve_value_or_default(instance, schema, &path) {
                Ok(value) => value.unwrap_or(Value::Null),
                Err(ResolveError::BadSegment { .. }) => Value::Null,
                Err(err) => return Err(err),
            };
            if !filter.operator.check(&value, &filter.expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
