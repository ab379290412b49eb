//! Full validation of a payload against a schema.
//!
//! # Architecture
//!
//! `ValidationContext` dispatches on the declared type of each value:
//! - primitives and literal sets (`primitive`)
//! - records, including defaults and host field validators (`record`)
//! - unions, discriminated or tried arm by arm (`union`)
//! - sequences and mappings (here)
//!
//! Errors are accumulated with their paths. Validation also normalizes
//! the payload: mappings that correspond to records become
//! [`formpath_document::Record`]s, absent optional fields get their
//! declared default and unknown fields are dropped.

mod context;
mod error;
mod primitive;
mod record;
mod union;

pub use error::{FieldError, ValidationErrorKind, ValidationFailure};

use std::sync::Arc;

use formpath_document::{Literal, Map, PathSegment, Value};

use crate::category::{retag, split_discriminator};
use crate::resolve::Resolver;
use crate::schema::{Schema, TypeExpr};

use context::ValidationContext;

// =============================================================================
// Public API
// =============================================================================

impl Resolver<'_> {
    /// Validate `payload` against `schema`, returning the normalized
    /// instance or every error found.
    pub fn validate(&self, payload: &Value, schema: &Arc<Schema>) -> Result<Value, ValidationFailure> {
        let ctx = ValidationContext::new(self);
        let value = ctx.validate_record(schema, payload);
        let state = ctx.finish();
        if state.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationFailure {
                schema: schema.name().to_string(),
                errors: state.errors,
            })
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

impl ValidationContext<'_, '_> {
    pub(crate) fn validate_type(&self, ty: &TypeExpr, value: &Value) -> Value {
        if value.is_null() {
            if !accepts_null(ty) {
                self.mismatch(ty, value);
            }
            return Value::Null;
        }

        let (bare, tag) = split_discriminator(ty, None);
        match &bare {
            TypeExpr::Primitive(primitive) => self.validate_primitive(*primitive, value),
            TypeExpr::Literal(allowed) => self.validate_literal(allowed, value),
            TypeExpr::Record(_) | TypeExpr::Named(_) => match self.resolver.record_schema(&bare) {
                Ok(Some(schema)) => self.validate_record(&schema, value),
                Ok(None) => value.clone(),
                Err(err) => {
                    self.record_error(ValidationErrorKind::Contract(err));
                    value.clone()
                }
            },
            TypeExpr::Union(arms) => self.validate_union(arms, tag.as_deref(), value),
            TypeExpr::Sequence(item) => self.validate_sequence(&retag(item, tag.as_deref()), value),
            TypeExpr::Mapping(key, item) => {
                self.validate_mapping(key, &retag(item, tag.as_deref()), value)
            }
            TypeExpr::Null => self.mismatch(&bare, value),
            TypeExpr::Tagged { .. } | TypeExpr::Any => value.clone(),
        }
    }

    /// Record a type mismatch at the current path and keep the value.
    pub(crate) fn mismatch(&self, expected: impl ToString, value: &Value) -> Value {
        self.record_error(ValidationErrorKind::TypeMismatch {
            expected: expected.to_string(),
            actual: value.kind(),
        });
        value.clone()
    }

    // -------------------------------------------------------------------------
    // Containers
    // -------------------------------------------------------------------------

    fn validate_sequence(&self, item: &TypeExpr, value: &Value) -> Value {
        let Value::Array(items) = value else {
            return self.mismatch(TypeExpr::sequence(item.clone()), value);
        };
        let validated = items
            .iter()
            .enumerate()
            .map(|(index, value)| {
                self.push_path(PathSegment::Index(index));
                let validated = self.validate_type(item, value);
                self.pop_path();
                validated
            })
            .collect();
        Value::Array(validated)
    }

    fn validate_mapping(&self, key: &TypeExpr, item: &TypeExpr, value: &Value) -> Value {
        let Value::Map(entries) = value else {
            return self.mismatch(TypeExpr::mapping(key.clone(), item.clone()), value);
        };
        let mut validated = Map::default();
        for (name, value) in entries {
            self.push_path(PathSegment::key(name.as_str()));
            if let TypeExpr::Literal(allowed) = key
                && !allowed.contains(&Literal::Text(name.clone()))
            {
                self.record_error(ValidationErrorKind::NotInLiteralSet {
                    allowed: allowed.clone(),
                    actual: Literal::Text(name.clone()).to_string(),
                });
            }
            validated.insert(name.clone(), self.validate_type(item, value));
            self.pop_path();
        }
        Value::Map(validated)
    }
}

fn accepts_null(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Null | TypeExpr::Any => true,
        TypeExpr::Union(arms) => arms.iter().any(accepts_null),
        TypeExpr::Tagged { inner, .. } => accepts_null(inner),
        _ => false,
    }
}

/// Human readable name of what a value is, for error messages.
fn describe(value: &Value) -> String {
    match value.as_literal() {
        Some(literal) => literal.to_string(),
        None => value.kind().to_string(),
    }
}
