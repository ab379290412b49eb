//! Discriminated union resolution.
//!
//! A union of record variants is discriminated by a tag field that every
//! variant declares as a closed literal set. The contract is checked the
//! first time a given union is resolved; the resulting tag table is cached
//! for the life of the process, keyed by everything the table is built
//! from: each variant's name and the declared type of its tag field.

use std::sync::{Arc, LazyLock, RwLock};

use ahash::AHashMap;
use formpath_document::Literal;
use indexmap::IndexSet;
use tracing::debug;

use crate::category::unwrap_optional;
use crate::error::ResolveError;
use crate::schema::{Schema, TypeExpr};

/// Outcome of resolving a discriminated union.
#[derive(Debug, Clone)]
pub struct VariantResolution {
    /// The chosen variant, or the probe schema when no tag was observed.
    pub schema: Arc<Schema>,
    /// Every tag value accepted by the union, in declaration order.
    pub all_tags: Vec<Literal>,
    pub is_probe: bool,
}

#[derive(Debug)]
struct TagTable {
    /// Tag literals per variant, same order as the variants.
    per_variant: Vec<Vec<Literal>>,
    all: Vec<Literal>,
}

/// Variant names with their declared tag field types, and the tag name.
type TableKey = (Vec<(String, Option<TypeExpr>)>, String);

static TAG_TABLES: LazyLock<RwLock<AHashMap<TableKey, Result<Arc<TagTable>, ResolveError>>>> =
    LazyLock::new(|| RwLock::new(AHashMap::new()));

/// Resolve the variant selected by `observed` among `variants`.
///
/// Without an observed tag, a probe schema holding only the tag field is
/// returned so a caller can offer a choice before committing to a branch.
pub fn resolve_discriminated(
    variants: &[Arc<Schema>],
    tag: &str,
    observed: Option<&Literal>,
) -> Result<VariantResolution, ResolveError> {
    let table = tag_table(variants, tag)?;

    let Some(observed) = observed else {
        let names: Vec<&str> = variants.iter().map(|v| v.name()).collect();
        let probe = Schema::probe(
            format!("{}Discriminator", names.join("Or")),
            tag,
            table.all.clone(),
        );
        debug!(tag, variants = ?names, "no tag value observed, using probe schema");
        return Ok(VariantResolution {
            schema: Arc::new(probe),
            all_tags: table.all.clone(),
            is_probe: true,
        });
    };

    let position = table
        .per_variant
        .iter()
        .position(|accepted| accepted.contains(observed))
        .ok_or_else(|| ResolveError::InvalidDiscriminator {
            tag: tag.to_string(),
            value: observed.to_string(),
            allowed: table.all.clone(),
        })?;
    let schema = variants[position].clone();
    debug!(tag, value = %observed, variant = schema.name(), "resolved variant");
    Ok(VariantResolution {
        schema,
        all_tags: table.all.clone(),
        is_probe: false,
    })
}

fn tag_table(variants: &[Arc<Schema>], tag: &str) -> Result<Arc<TagTable>, ResolveError> {
    let key: TableKey = (
        variants
            .iter()
            .map(|v| (v.name().to_string(), v.get(tag).map(|field| field.ty.clone())))
            .collect(),
        tag.to_string(),
    );
    if let Some(cached) = TAG_TABLES
        .read()
        .ok()
        .and_then(|tables| tables.get(&key).cloned())
    {
        return cached;
    }
    let built = build_tag_table(variants, tag).map(Arc::new);
    if let Ok(mut tables) = TAG_TABLES.write() {
        tables.insert(key, built.clone());
    }
    built
}

fn build_tag_table(variants: &[Arc<Schema>], tag: &str) -> Result<TagTable, ResolveError> {
    let mut per_variant = Vec::with_capacity(variants.len());
    let mut all: IndexSet<Literal> = IndexSet::new();
    let mut owners: AHashMap<Literal, &str> = AHashMap::new();

    for variant in variants {
        let literals = variant
            .get(tag)
            .map(|field| unwrap_optional(&field.ty))
            .and_then(|ty| match ty {
                TypeExpr::Literal(values) if !values.is_empty() => Some(values),
                _ => None,
            })
            .ok_or_else(|| ResolveError::MissingDiscriminatorContract {
                schema: variant.name().to_string(),
                tag: tag.to_string(),
            })?;

        for literal in &literals {
            if let Some(first) = owners.insert(literal.clone(), variant.name())
                && first != variant.name()
            {
                return Err(ResolveError::AmbiguousDiscriminator {
                    tag: tag.to_string(),
                    value: literal.clone(),
                    first: first.to_string(),
                    second: variant.name().to_string(),
                });
            }
            all.insert(literal.clone());
        }
        per_variant.push(literals);
    }

    Ok(TagTable {
        per_variant,
        all: all.into_iter().collect(),
    })
}
