//! Type classification.
//!
//! Renderers switch on [`TypeCategory`], never on the raw [`TypeExpr`].
//! Classification is total: anything unrecognised is `Unknown`.

use std::sync::{LazyLock, RwLock};

use ahash::AHashMap;

use crate::schema::{FieldDescriptor, TypeExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Scalar,
    EnumeratedLiteral,
    Record,
    DiscriminatedRecord,
    ScalarSequence,
    LiteralSequence,
    RecordSequence,
    DiscriminatedRecordSequence,
    UnknownSequence,
    ScalarMapping,
    LiteralMapping,
    RecordMapping,
    DiscriminatedRecordMapping,
    UnknownMapping,
    Unknown,
}

impl TypeCategory {
    pub fn is_sequence(self) -> bool {
        matches!(
            self,
            Self::ScalarSequence
                | Self::LiteralSequence
                | Self::RecordSequence
                | Self::DiscriminatedRecordSequence
                | Self::UnknownSequence
        )
    }

    pub fn is_mapping(self) -> bool {
        matches!(
            self,
            Self::ScalarMapping
                | Self::LiteralMapping
                | Self::RecordMapping
                | Self::DiscriminatedRecordMapping
                | Self::UnknownMapping
        )
    }

    /// Category of the items of a sequence or mapping category.
    pub fn item(self) -> Option<TypeCategory> {
        Some(match self {
            Self::ScalarSequence | Self::ScalarMapping => Self::Scalar,
            Self::LiteralSequence | Self::LiteralMapping => Self::EnumeratedLiteral,
            Self::RecordSequence | Self::RecordMapping => Self::Record,
            Self::DiscriminatedRecordSequence | Self::DiscriminatedRecordMapping => {
                Self::DiscriminatedRecord
            }
            Self::UnknownSequence | Self::UnknownMapping => Self::Unknown,
            _ => return None,
        })
    }

    fn sequence_of(item: TypeCategory) -> Self {
        match item {
            Self::Scalar => Self::ScalarSequence,
            Self::EnumeratedLiteral => Self::LiteralSequence,
            Self::Record => Self::RecordSequence,
            Self::DiscriminatedRecord => Self::DiscriminatedRecordSequence,
            _ => Self::UnknownSequence,
        }
    }

    fn mapping_of(item: TypeCategory) -> Self {
        match item {
            Self::Scalar => Self::ScalarMapping,
            Self::EnumeratedLiteral => Self::LiteralMapping,
            Self::Record => Self::RecordMapping,
            Self::DiscriminatedRecord => Self::DiscriminatedRecordMapping,
            _ => Self::UnknownMapping,
        }
    }
}

type CacheKey = (TypeExpr, Option<String>, bool);

static CLASSIFICATIONS: LazyLock<RwLock<AHashMap<CacheKey, TypeCategory>>> =
    LazyLock::new(|| RwLock::new(AHashMap::new()));

/// Strip the nullable wrapper from `ty`.
///
/// Nested unions are flattened and every `Null` arm is dropped; a single
/// remaining arm replaces the union. Applying this twice is the same as
/// applying it once.
pub fn unwrap_optional(ty: &TypeExpr) -> TypeExpr {
    let TypeExpr::Union(_) = ty else {
        return ty.clone();
    };
    let mut arms = Vec::new();
    collect_non_null_arms(ty, &mut arms);
    match arms.len() {
        0 => TypeExpr::Null,
        1 => arms.remove(0),
        _ => TypeExpr::Union(arms),
    }
}

fn collect_non_null_arms(ty: &TypeExpr, out: &mut Vec<TypeExpr>) {
    match ty {
        TypeExpr::Union(arms) => {
            for arm in arms {
                collect_non_null_arms(arm, out);
            }
        }
        TypeExpr::Null => {}
        other => out.push(other.clone()),
    }
}

/// Unwrap optional and embedded discriminator wrappers.
///
/// Returns the bare type and the discriminator tag name, preferring an
/// explicitly supplied one over a tag embedded in the type.
pub fn split_discriminator(ty: &TypeExpr, discriminator: Option<&str>) -> (TypeExpr, Option<String>) {
    let mut tag = discriminator.map(str::to_string);
    let mut current = unwrap_optional(ty);
    while let TypeExpr::Tagged { inner, tag: embedded } = current {
        if tag.is_none() {
            tag = Some(embedded);
        }
        current = unwrap_optional(&inner);
    }
    (current, tag)
}

/// Attach a discriminator carried by a container to its item type.
///
/// A field declared as a sequence or mapping of variants names the tag once
/// for the whole container; each item is discriminated by it.
pub fn retag(item: &TypeExpr, tag: Option<&str>) -> TypeExpr {
    match tag {
        Some(tag) => TypeExpr::Tagged {
            inner: Box::new(item.clone()),
            tag: tag.to_string(),
        },
        None => item.clone(),
    }
}

/// Classify a declared type.
///
/// Sequences and mappings are unwrapped only at `depth == 0`, so a
/// sequence of sequences is an `UnknownSequence`.
pub fn classify(ty: &TypeExpr, discriminator: Option<&str>, depth: usize) -> TypeCategory {
    let key: CacheKey = (ty.clone(), discriminator.map(str::to_string), depth > 0);
    if let Some(category) = CLASSIFICATIONS
        .read()
        .ok()
        .and_then(|cache| cache.get(&key).copied())
    {
        return category;
    }
    let category = classify_uncached(ty, discriminator, depth);
    if let Ok(mut cache) = CLASSIFICATIONS.write() {
        cache.insert(key, category);
    }
    category
}

/// Classify a field using its declared type and discriminator.
pub fn classify_field(field: &FieldDescriptor) -> TypeCategory {
    classify(&field.ty, field.discriminator.as_deref(), 0)
}

fn classify_uncached(ty: &TypeExpr, discriminator: Option<&str>, depth: usize) -> TypeCategory {
    let (ty, tag) = split_discriminator(ty, discriminator);
    match &ty {
        TypeExpr::Primitive(_) => TypeCategory::Scalar,
        TypeExpr::Literal(_) => TypeCategory::EnumeratedLiteral,
        TypeExpr::Record(_) | TypeExpr::Named(_) => TypeCategory::Record,
        TypeExpr::Union(arms) => {
            if tag.is_some() && arms.iter().all(TypeExpr::is_record) {
                TypeCategory::DiscriminatedRecord
            } else if arms.iter().all(|arm| matches!(arm, TypeExpr::Primitive(_))) {
                TypeCategory::Scalar
            } else {
                TypeCategory::Unknown
            }
        }
        TypeExpr::Sequence(item) if depth == 0 => {
            TypeCategory::sequence_of(classify(item, tag.as_deref(), depth + 1))
        }
        TypeExpr::Mapping(_, value) if depth == 0 => {
            TypeCategory::mapping_of(classify(value, tag.as_deref(), depth + 1))
        }
        _ => TypeCategory::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn cat() -> TypeExpr {
        TypeExpr::record(Schema::new("Cat").into_arc())
    }

    fn dog() -> TypeExpr {
        TypeExpr::named("Dog")
    }

    #[test]
    fn test_unwrap_optional_is_idempotent() {
        let types = [
            TypeExpr::optional(TypeExpr::text()),
            TypeExpr::optional(TypeExpr::optional(TypeExpr::integer())),
            TypeExpr::Union(vec![TypeExpr::text(), TypeExpr::integer(), TypeExpr::Null]),
            TypeExpr::Union(vec![TypeExpr::Null]),
            TypeExpr::sequence(TypeExpr::optional(TypeExpr::text())),
            TypeExpr::tagged([cat(), dog()], "species"),
            TypeExpr::Any,
        ];
        for ty in types {
            let once = unwrap_optional(&ty);
            assert_eq!(unwrap_optional(&once), once, "{ty}");
        }
    }

    #[test]
    fn test_unwrap_optional_single_arm() {
        assert_eq!(
            unwrap_optional(&TypeExpr::optional(TypeExpr::text())),
            TypeExpr::text()
        );
        assert_eq!(
            unwrap_optional(&TypeExpr::Union(vec![
                TypeExpr::text(),
                TypeExpr::Null,
                TypeExpr::integer()
            ])),
            TypeExpr::Union(vec![TypeExpr::text(), TypeExpr::integer()])
        );
    }

    #[test]
    fn test_scalars_and_literals() {
        assert_eq!(classify(&TypeExpr::text(), None, 0), TypeCategory::Scalar);
        assert_eq!(
            classify(&TypeExpr::optional(TypeExpr::boolean()), None, 0),
            TypeCategory::Scalar
        );
        assert_eq!(
            classify(&TypeExpr::Union(vec![TypeExpr::text(), TypeExpr::float()]), None, 0),
            TypeCategory::Scalar
        );
        assert_eq!(
            classify(&TypeExpr::literal(["a", "b"]), None, 0),
            TypeCategory::EnumeratedLiteral
        );
    }

    #[test]
    fn test_records_and_unions() {
        assert_eq!(classify(&cat(), None, 0), TypeCategory::Record);
        assert_eq!(classify(&dog(), None, 0), TypeCategory::Record);
        let union = TypeExpr::Union(vec![cat(), dog()]);
        assert_eq!(classify(&union, None, 0), TypeCategory::Unknown);
        assert_eq!(
            classify(&union, Some("species"), 0),
            TypeCategory::DiscriminatedRecord
        );
        assert_eq!(
            classify(&TypeExpr::optional(TypeExpr::tagged([cat(), dog()], "species")), None, 0),
            TypeCategory::DiscriminatedRecord
        );
    }

    #[test]
    fn test_containers() {
        let cases = [
            (TypeExpr::sequence(TypeExpr::integer()), TypeCategory::ScalarSequence),
            (TypeExpr::sequence(TypeExpr::literal(["x"])), TypeCategory::LiteralSequence),
            (TypeExpr::sequence(cat()), TypeCategory::RecordSequence),
            (
                TypeExpr::sequence(TypeExpr::tagged([cat(), dog()], "species")),
                TypeCategory::DiscriminatedRecordSequence,
            ),
            (TypeExpr::sequence(TypeExpr::Any), TypeCategory::UnknownSequence),
            (
                TypeExpr::mapping(TypeExpr::text(), TypeExpr::float()),
                TypeCategory::ScalarMapping,
            ),
            (
                TypeExpr::mapping(TypeExpr::text(), dog()),
                TypeCategory::RecordMapping,
            ),
            (
                TypeExpr::mapping(TypeExpr::text(), TypeExpr::tagged([cat(), dog()], "species")),
                TypeCategory::DiscriminatedRecordMapping,
            ),
        ];
        for (ty, expected) in cases {
            assert_eq!(classify(&ty, None, 0), expected, "{ty}");
            assert_eq!(expected.item().map(|item| item.is_sequence()), Some(false));
        }
    }

    #[test]
    fn test_field_discriminator_applies_to_items() {
        let field = FieldDescriptor::new(
            "pets",
            TypeExpr::sequence(TypeExpr::Union(vec![cat(), dog()])),
        )
        .with_discriminator("species");
        assert_eq!(
            classify_field(&field),
            TypeCategory::DiscriminatedRecordSequence
        );
        assert_eq!(
            classify(
                &TypeExpr::mapping(TypeExpr::text(), TypeExpr::Union(vec![cat(), dog()])),
                Some("species"),
                0
            ),
            TypeCategory::DiscriminatedRecordMapping
        );
    }

    #[test]
    fn test_nested_containers_are_depth_bounded() {
        let nested = TypeExpr::sequence(TypeExpr::sequence(TypeExpr::text()));
        assert_eq!(classify(&nested, None, 0), TypeCategory::UnknownSequence);
        let nested_map = TypeExpr::mapping(
            TypeExpr::text(),
            TypeExpr::sequence(TypeExpr::text()),
        );
        assert_eq!(classify(&nested_map, None, 0), TypeCategory::UnknownMapping);
        assert_eq!(
            classify(&TypeExpr::sequence(TypeExpr::text()), None, 1),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_classification_is_stable() {
        let ty = TypeExpr::sequence(cat());
        let first = classify(&ty, None, 0);
        for _ in 0..3 {
            assert_eq!(classify(&ty, None, 0), first);
        }
    }
}
