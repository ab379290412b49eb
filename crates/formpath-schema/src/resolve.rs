//! Type-side path resolution.
//!
//! [`Resolver`] walks a [`FormPath`] over field descriptors the same way
//! [`formpath_document::resolve_value`] walks it over values. When the walk
//! crosses a discriminated union, the tag is read from the instance (if one
//! was given) and the matching variant is followed; without a tag the
//! probe schema is used.

use std::sync::Arc;

use ahash::AHashSet;
use formpath_document::{AccessConfig, FormPath, MappingAddressing, PathSegment, Value};
use tracing::debug;

use crate::category::{retag, split_discriminator};
use crate::discriminated::{VariantResolution, resolve_discriminated};
use crate::error::ResolveError;
use crate::schema::{Schema, SchemaLookup, TypeExpr};

/// Entry point for every schema-aware operation.
///
/// Holds the host's schema lookup and the value access configuration.
/// Cheap to construct; all caches are process-wide.
#[derive(Clone)]
pub struct Resolver<'a> {
    lookup: &'a dyn SchemaLookup,
    config: AccessConfig,
}

/// A type and, when available, the instance value found at the same path.
#[derive(Debug, Clone)]
pub(crate) struct Located<'v> {
    pub ty: TypeExpr,
    pub value: Option<&'v Value>,
}

impl<'a> Resolver<'a> {
    pub fn new(lookup: &'a dyn SchemaLookup) -> Self {
        Self {
            lookup,
            config: AccessConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AccessConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    pub fn lookup_schema(&self, name: &str) -> Result<Arc<Schema>, ResolveError> {
        self.lookup
            .lookup(name)
            .ok_or_else(|| ResolveError::UnknownSchema {
                name: name.to_string(),
            })
    }

    /// The record schema a `Record` or `Named` type denotes.
    pub(crate) fn record_schema(&self, ty: &TypeExpr) -> Result<Option<Arc<Schema>>, ResolveError> {
        match ty {
            TypeExpr::Record(schema) => Ok(Some(schema.clone())),
            TypeExpr::Named(name) => self.lookup_schema(name).map(Some),
            _ => Ok(None),
        }
    }

    fn variants(&self, arms: &[TypeExpr]) -> Result<Vec<Arc<Schema>>, ResolveError> {
        arms.iter()
            .filter_map(|arm| self.record_schema(arm).transpose())
            .collect()
    }

    /// Resolve the variant of a discriminated union of record `arms`,
    /// reading the tag from `value`.
    ///
    /// A null tag counts as missing. A tag that is not a scalar can never
    /// match and is reported as an invalid discriminator.
    pub(crate) fn resolve_variant(
        &self,
        arms: &[TypeExpr],
        tag: &str,
        value: Option<&Value>,
    ) -> Result<VariantResolution, ResolveError> {
        let variants = self.variants(arms)?;
        let observed = match value.and_then(|value| value.get(tag)) {
            None | Some(Value::Null) => None,
            Some(tag_value) => match tag_value.as_literal() {
                Some(literal) => Some(literal),
                None => {
                    let probe = resolve_discriminated(&variants, tag, None)?;
                    return Err(ResolveError::InvalidDiscriminator {
                        tag: tag.to_string(),
                        value: tag_value.kind().to_string(),
                        allowed: probe.all_tags,
                    });
                }
            },
        };
        resolve_discriminated(&variants, tag, observed.as_ref())
    }

    /// The declared type at `path` below `root`.
    ///
    /// `instance` is consulted only to pick variants of discriminated
    /// unions. Placeholder segments address the item type of a sequence
    /// or mapping.
    pub fn resolve_type(
        &self,
        root: &Arc<Schema>,
        path: &FormPath,
        instance: Option<&Value>,
    ) -> Result<TypeExpr, ResolveError> {
        self.locate(root, path, instance).map(|located| located.ty)
    }

    /// The record schema at `path`, with discriminated unions resolved.
    pub fn schema_at(
        &self,
        root: &Arc<Schema>,
        path: &FormPath,
        instance: Option<&Value>,
    ) -> Result<Arc<Schema>, ResolveError> {
        let located = self.locate(root, path, instance)?;
        let (bare, tag) = split_discriminator(&located.ty, None);
        match (&bare, tag) {
            (TypeExpr::Union(arms), Some(tag)) if arms.iter().all(TypeExpr::is_record) => self
                .resolve_variant(arms, &tag, located.value)
                .map(|resolution| resolution.schema),
            _ => self
                .record_schema(&bare)?
                .ok_or_else(|| ResolveError::BadSegment {
                    path: path.clone(),
                    reason: format!("{} is not a record", located.ty),
                }),
        }
    }

    pub(crate) fn locate<'v>(
        &self,
        root: &Arc<Schema>,
        path: &FormPath,
        instance: Option<&'v Value>,
    ) -> Result<Located<'v>, ResolveError> {
        let mut current = Located {
            ty: TypeExpr::Record(root.clone()),
            value: instance,
        };
        for (depth, segment) in path.segments().iter().enumerate() {
            let fail = |reason: String| ResolveError::BadSegment {
                path: path.prefix(depth + 1),
                reason,
            };
            if segment.is_sentinel() {
                return Err(fail(format!(
                    "'{segment}' is only valid in visibility expressions"
                )));
            }

            let (bare, tag) = split_discriminator(&current.ty, None);
            let value = self.child_value(current.value, segment);
            let ty = match (&bare, tag.as_deref(), segment) {
                (
                    TypeExpr::Sequence(item),
                    tag,
                    PathSegment::Index(_) | PathSegment::Placeholder(_),
                ) => retag(item, tag),
                (TypeExpr::Mapping(_, item), tag, _) => retag(item, tag),
                (TypeExpr::Any, _, _) => TypeExpr::Any,
                (TypeExpr::Union(arms), Some(tag), _) if arms.iter().all(TypeExpr::is_record) => {
                    let resolution = self.resolve_variant(arms, tag, current.value)?;
                    field_type(&resolution.schema, segment)
                        .ok_or_else(|| unknown_field(&resolution.schema, segment))?
                }
                (TypeExpr::Record(_) | TypeExpr::Named(_), _, _) => {
                    let schema = self
                        .record_schema(&bare)?
                        .ok_or_else(|| fail(format!("{bare} is not a record")))?;
                    field_type(&schema, segment).ok_or_else(|| unknown_field(&schema, segment))?
                }
                _ => {
                    return Err(fail(format!(
                        "{} cannot be addressed with '{segment}'",
                        current.ty
                    )));
                }
            };
            current = Located { ty, value };
        }
        Ok(current)
    }

    /// Lenient single-step read used while walking types.
    fn child_value<'v>(&self, value: Option<&'v Value>, segment: &PathSegment) -> Option<&'v Value> {
        let value = value?;
        match (segment, value) {
            (PathSegment::Placeholder(_), _) => None,
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            (PathSegment::Index(index), Value::Map(map)) => {
                map.get(&index.to_string()).or_else(|| match self.config.mapping_addressing {
                    MappingAddressing::KeyThenPosition => map.get_index(*index).map(|(_, v)| v),
                    MappingAddressing::Key => None,
                })
            }
            (PathSegment::Index(index), _) => value.get(&index.to_string()),
            (segment, _) => segment.as_name().and_then(|name| value.get(name)),
        }
    }

    /// Read the value at `path`, see [`formpath_document::resolve_value`].
    pub fn resolve_value<'v>(
        &self,
        instance: &'v Value,
        path: &FormPath,
    ) -> Result<Option<&'v Value>, ResolveError> {
        Ok(formpath_document::resolve_value(instance, path, &self.config)?)
    }

    /// Read the value at `path`, falling back to the declared default of
    /// the field the path names when the instance holds no value there.
    ///
    /// A bad segment is still reported when there is no default to use.
    pub fn resolve_value_or_default(
        &self,
        instance: &Value,
        root: &Arc<Schema>,
        path: &FormPath,
    ) -> Result<Option<Value>, ResolveError> {
        let missing = match self.resolve_value(instance, path) {
            Ok(Some(value)) => return Ok(Some(value.clone())),
            Ok(None) => None,
            Err(err @ ResolveError::BadSegment { .. }) => Some(err),
            Err(err) => return Err(err),
        };
        let default = match path.split_last() {
            Some((parent, PathSegment::Field(name) | PathSegment::Key(name))) => {
                match self.schema_at(root, &parent, Some(instance)) {
                    Ok(schema) => schema
                        .get(name)
                        .and_then(|field| field.default.as_ref())
                        .map(|default| default.produce()),
                    Err(err) if err.is_contract_violation() => return Err(err),
                    Err(_) => None,
                }
            }
            _ => None,
        };
        match (default, missing) {
            (Some(default), _) => {
                debug!(path = %path, "no value at path, using declared default");
                Ok(Some(default))
            }
            (None, Some(err)) => Err(err),
            (None, None) => Ok(None),
        }
    }

    /// Eagerly check every discriminated union reachable from `schema`.
    ///
    /// Named references are followed once each, so recursive schemas are
    /// fine.
    pub fn check_contracts(&self, schema: &Arc<Schema>) -> Result<(), ResolveError> {
        let mut visited = AHashSet::new();
        self.check_schema(schema, &mut visited)
    }

    fn check_schema(
        &self,
        schema: &Arc<Schema>,
        visited: &mut AHashSet<String>,
    ) -> Result<(), ResolveError> {
        if !visited.insert(schema.name().to_string()) {
            return Ok(());
        }
        for field in schema.fields() {
            self.check_type(&field.declared_type(), visited)?;
        }
        Ok(())
    }

    fn check_type(&self, ty: &TypeExpr, visited: &mut AHashSet<String>) -> Result<(), ResolveError> {
        let (bare, tag) = split_discriminator(ty, None);
        match &bare {
            TypeExpr::Record(schema) => self.check_schema(schema, visited),
            TypeExpr::Named(name) => {
                if visited.contains(name) {
                    return Ok(());
                }
                let schema = self.lookup_schema(name)?;
                self.check_schema(&schema, visited)
            }
            TypeExpr::Union(arms) => {
                if let Some(tag) = &tag
                    && arms.iter().all(TypeExpr::is_record)
                {
                    resolve_discriminated(&self.variants(arms)?, tag, None)?;
                }
                for arm in arms {
                    self.check_type(arm, visited)?;
                }
                Ok(())
            }
            TypeExpr::Sequence(item) => self.check_type(&retag(item, tag.as_deref()), visited),
            TypeExpr::Mapping(key, value) => {
                self.check_type(key, visited)?;
                self.check_type(&retag(value, tag.as_deref()), visited)
            }
            _ => Ok(()),
        }
    }
}

fn field_type(schema: &Schema, segment: &PathSegment) -> Option<TypeExpr> {
    let name = match segment {
        PathSegment::Index(index) => index.to_string(),
        other => other.as_name()?.to_string(),
    };
    schema.get(&name).map(|field| field.declared_type())
}

fn unknown_field(schema: &Schema, segment: &PathSegment) -> ResolveError {
    ResolveError::UnknownField {
        schema: schema.name().to_string(),
        field: segment.to_string(),
    }
}
