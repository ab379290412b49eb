//! Record type validator

use std::sync::Arc;

use formpath_document::{PathSegment, Record, Value};
use tracing::trace;

use crate::schema::{FieldDescriptor, Schema};

use super::context::ValidationContext;
use super::error::ValidationErrorKind;

impl ValidationContext<'_, '_> {
    /// Validate a mapping or record against `schema`, producing a record.
    pub(crate) fn validate_record(&self, schema: &Arc<Schema>, value: &Value) -> Value {
        let Some(entries) = value.entries() else {
            return self.mismatch(schema.name(), value);
        };

        let mut record = Record::new(schema.name());
        for field in schema.fields() {
            match entries.get(&field.name) {
                Some(field_value) => {
                    self.push_path(PathSegment::field(field.name.as_str()));
                    let validated = self.validate_field(field, field_value);
                    self.pop_path();
                    record.set(field.name.clone(), validated);
                }
                None if field.required => {
                    let path = self.path().child(PathSegment::field(field.name.as_str()));
                    self.record_error_at(
                        path,
                        ValidationErrorKind::MissingRequiredField {
                            field: field.name.clone(),
                        },
                    );
                }
                None => {
                    if let Some(default) = &field.default {
                        record.set(field.name.clone(), default.produce());
                    }
                }
            }
        }

        for key in entries.keys().filter(|key| schema.get(key).is_none()) {
            trace!(schema = schema.name(), key, "dropping unknown field");
        }
        Value::Record(record)
    }

    /// Type check a present field, then run the host validators on it.
    ///
    /// Host validators only see values that already have the declared type.
    fn validate_field(&self, field: &FieldDescriptor, value: &Value) -> Value {
        let before = self.error_count();
        let validated = self.validate_type(&field.declared_type(), value);
        if self.error_count() > before || validated.is_null() {
            return validated;
        }
        for validator in &field.validators {
            if let Err(message) = (validator.check)(&validated) {
                self.record_error(ValidationErrorKind::Custom {
                    validator: validator.name,
                    message,
                });
            }
        }
        validated
    }
}
