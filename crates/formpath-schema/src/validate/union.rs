//! Union type validator
//!
//! A union of records with a discriminator is validated against the one
//! variant its tag selects. Any other union takes the first arm that
//! validates without errors.

use formpath_document::{PathSegment, Value};

use crate::error::ResolveError;
use crate::schema::TypeExpr;

use super::context::ValidationContext;
use super::error::ValidationErrorKind;

impl ValidationContext<'_, '_> {
    pub(crate) fn validate_union(&self, arms: &[TypeExpr], tag: Option<&str>, value: &Value) -> Value {
        match tag {
            Some(tag) if arms.iter().all(TypeExpr::is_record) => {
                self.validate_discriminated(arms, tag, value)
            }
            _ => self.validate_untagged(arms, value),
        }
    }

    fn validate_discriminated(&self, arms: &[TypeExpr], tag: &str, value: &Value) -> Value {
        if value.entries().is_none() {
            return self.mismatch(TypeExpr::Union(arms.to_vec()), value);
        }
        match self.resolver.resolve_variant(arms, tag, Some(value)) {
            Ok(resolution) if resolution.is_probe => {
                let path = self.path().child(PathSegment::field(tag));
                self.record_error_at(
                    path,
                    ValidationErrorKind::MissingDiscriminator {
                        tag: tag.to_string(),
                        allowed: resolution.all_tags,
                    },
                );
                value.clone()
            }
            Ok(resolution) => self.validate_record(&resolution.schema, value),
            Err(ResolveError::InvalidDiscriminator {
                tag,
                value: observed,
                allowed,
            }) => {
                self.record_error(ValidationErrorKind::InvalidDiscriminator {
                    tag,
                    value: observed,
                    allowed,
                });
                value.clone()
            }
            Err(err) => {
                self.record_error(ValidationErrorKind::Contract(err));
                value.clone()
            }
        }
    }

    fn validate_untagged(&self, arms: &[TypeExpr], value: &Value) -> Value {
        for arm in arms {
            let (validated, trial) = self.trial(|| self.validate_type(arm, value));
            if trial.errors.is_empty() {
                self.merge(trial);
                return validated;
            }
        }
        self.mismatch(TypeExpr::Union(arms.to_vec()), value)
    }
}
