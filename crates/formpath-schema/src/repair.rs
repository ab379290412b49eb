//! Validate-with-repair.
//!
//! A failed validation is repaired by substituting declared defaults: for
//! each reported error the deepest path that names a field with a default
//! is overwritten in a copy of the payload. The copy is validated once
//! more and that result is final.

use std::sync::Arc;

use formpath_document::{FormPath, PathSegment, Value, set_at_path};
use tracing::{debug, info, warn};

use crate::resolve::Resolver;
use crate::schema::Schema;
use crate::validate::{FieldError, ValidationFailure};

/// A payload that validated, possibly after substituting defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub value: Value,
    /// Paths that received their declared default, in error order. No
    /// path lies below another one. Empty when the payload was valid as
    /// given.
    pub substitutions: Vec<FormPath>,
}

impl Repaired {
    pub fn was_repaired(&self) -> bool {
        !self.substitutions.is_empty()
    }
}

impl Resolver<'_> {
    /// Validate `payload`, substituting declared defaults for failing
    /// fields and validating exactly once more if the first attempt fails.
    ///
    /// The caller's payload is never modified.
    pub fn validate_with_repair(
        &self,
        payload: &Value,
        schema: &Arc<Schema>,
    ) -> Result<Repaired, ValidationFailure> {
        let failure = match self.validate(payload, schema) {
            Ok(value) => {
                return Ok(Repaired {
                    value,
                    substitutions: Vec::new(),
                });
            }
            Err(failure) => failure,
        };

        let mut working = payload.clone();
        let mut substitutions = Vec::new();
        for error in &failure.errors {
            if substitutions
                .iter()
                .any(|done: &FormPath| error.path.segments().starts_with(done.segments()))
            {
                continue;
            }
            if let Some(path) = self.substitute_default(&mut working, schema, error) {
                // an ancestor default replaces whatever was written below it
                substitutions.retain(|done| !done.segments().starts_with(path.segments()));
                substitutions.push(path);
            }
        }
        if substitutions.is_empty() {
            debug!(schema = schema.name(), "no default applies to any failing field");
        } else {
            let fields: Vec<String> = substitutions.iter().map(ToString::to_string).collect();
            info!(
                schema = schema.name(),
                fields = %fields.join(", "),
                "could not validate fields, using default values instead"
            );
        }

        let value = self.validate(&working, schema)?;
        Ok(Repaired {
            value,
            substitutions,
        })
    }

    /// Write the default of the nearest field at or above the error's path.
    fn substitute_default(
        &self,
        working: &mut Value,
        schema: &Arc<Schema>,
        error: &FieldError,
    ) -> Option<FormPath> {
        for len in (1..=error.path.len()).rev() {
            let candidate = error.path.prefix(len);
            let Some((parent, PathSegment::Field(name) | PathSegment::Key(name))) =
                candidate.split_last()
            else {
                continue;
            };
            let Ok(parent_schema) = self.schema_at(schema, &parent, Some(&*working)) else {
                continue;
            };
            let Some(default) = parent_schema
                .get(name)
                .and_then(|field| field.default.as_ref())
            else {
                continue;
            };
            match set_at_path(working, &candidate, default.produce(), self.config()) {
                Ok(_) => return Some(candidate),
                Err(err) => {
                    warn!(path = %candidate, error = %err, "could not write default");
                }
            }
        }
        None
    }
}
