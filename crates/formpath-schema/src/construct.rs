//! Best-effort reconstruction of untrusted nested input.
//!
//! Construction never validates. Mappings that correspond to declared
//! records become [`Record`]s, everything else is copied as is. Explicit
//! nulls stay null and absent fields stay absent. A union value without a
//! tag becomes a probe record that carries the input entries raw.

use std::sync::Arc;

use formpath_document::{Map, Record, Value};
use tracing::{debug, trace};

use crate::category::{TypeCategory, classify, retag, split_discriminator};
use crate::error::ResolveError;
use crate::resolve::Resolver;
use crate::schema::{Schema, TypeExpr};

impl Resolver<'_> {
    /// Build an instance of `schema` from `input` without validation.
    ///
    /// Only defects in the schema definitions are errors. Input that does
    /// not fit the schema is kept raw or dropped (unknown keys).
    pub fn construct(&self, input: &Value, schema: &Arc<Schema>) -> Result<Value, ResolveError> {
        let Some(entries) = input.entries() else {
            debug!(schema = schema.name(), kind = %input.kind(), "input is not a mapping, keeping it raw");
            return Ok(input.clone());
        };
        let mut record = Record::new(schema.name());
        for (key, value) in entries {
            let Some(field) = schema.get(key) else {
                trace!(schema = schema.name(), key = key.as_str(), "dropping key unknown to schema");
                continue;
            };
            let constructed = if value.is_null() {
                Value::Null
            } else {
                self.construct_typed(&field.declared_type(), value)?
            };
            record.set(key.clone(), constructed);
        }
        Ok(Value::Record(record))
    }

    fn construct_typed(&self, ty: &TypeExpr, value: &Value) -> Result<Value, ResolveError> {
        let (bare, tag) = split_discriminator(ty, None);
        match classify(ty, None, 0) {
            TypeCategory::Record => match self.record_schema(&bare)? {
                Some(schema) => self.construct(value, &schema),
                None => Ok(value.clone()),
            },
            TypeCategory::DiscriminatedRecord => match (&bare, tag.as_deref()) {
                (TypeExpr::Union(arms), Some(tag)) => self.construct_variant(arms, tag, value),
                _ => Ok(value.clone()),
            },
            TypeCategory::RecordSequence | TypeCategory::DiscriminatedRecordSequence => {
                match (&bare, value) {
                    (TypeExpr::Sequence(item), Value::Array(items)) => {
                        let item = retag(item, tag.as_deref());
                        items
                            .iter()
                            .map(|value| self.construct_item(&item, value))
                            .collect::<Result<Vec<_>, _>>()
                            .map(Value::Array)
                    }
                    _ => Ok(value.clone()),
                }
            }
            TypeCategory::RecordMapping | TypeCategory::DiscriminatedRecordMapping => {
                match (&bare, value) {
                    (TypeExpr::Mapping(_, item), Value::Map(entries)) => {
                        let item = retag(item, tag.as_deref());
                        let mut out = Map::default();
                        for (key, value) in entries {
                            out.insert(key.clone(), self.construct_item(&item, value)?);
                        }
                        Ok(Value::Map(out))
                    }
                    _ => Ok(value.clone()),
                }
            }
            _ => Ok(value.clone()),
        }
    }

    fn construct_item(&self, item: &TypeExpr, value: &Value) -> Result<Value, ResolveError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.construct_typed(item, value)
    }

    fn construct_variant(
        &self,
        arms: &[TypeExpr],
        tag: &str,
        value: &Value,
    ) -> Result<Value, ResolveError> {
        let Some(entries) = value.entries() else {
            return Ok(value.clone());
        };
        match self.resolve_variant(arms, tag, Some(value)) {
            Ok(resolution) if resolution.is_probe => {
                debug!(tag, schema = resolution.schema.name(), "no variant chosen yet, keeping entries raw");
                let mut record = Record::new(resolution.schema.name());
                for (key, value) in entries {
                    record.set(key.clone(), value.clone());
                }
                Ok(Value::Record(record))
            }
            Ok(resolution) => self.construct(value, &resolution.schema),
            Err(ResolveError::InvalidDiscriminator { value: observed, .. }) => {
                debug!(tag, value = %observed, "unknown variant tag, keeping input raw");
                Ok(value.clone())
            }
            Err(err) => Err(err),
        }
    }
}
