//! Properties that must hold for any schema and input.

use std::sync::Arc;

use formpath_document::{FormPath, Literal, MappingAddressing, AccessConfig, Value};
use formpath_schema::{
    FieldDescriptor, ResolveError, Resolver, Schema, SchemaLookup, SchemaRegistry, TypeCategory,
    TypeExpr, classify, resolve_discriminated, unwrap_optional,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with(
            Schema::new("Node")
                .field(FieldDescriptor::new("label", TypeExpr::text()))
                .field(
                    FieldDescriptor::new("children", TypeExpr::sequence(TypeExpr::named("Node")))
                        .optional(),
                )
                .field(
                    FieldDescriptor::new(
                        "attributes",
                        TypeExpr::mapping(TypeExpr::text(), TypeExpr::named("Attribute")),
                    )
                    .optional(),
                ),
        )
        .with(
            Schema::new("Attribute")
                .field(FieldDescriptor::new("value", TypeExpr::Any))
                .field(FieldDescriptor::new("weight", TypeExpr::float()).optional()),
        )
}

fn node(registry: &SchemaRegistry) -> Arc<Schema> {
    registry.lookup("Node").unwrap()
}

#[test]
fn test_unwrap_optional_idempotent_for_nested_unions() {
    let types = [
        TypeExpr::optional(TypeExpr::optional(TypeExpr::named("Node"))),
        TypeExpr::Union(vec![
            TypeExpr::Null,
            TypeExpr::Union(vec![TypeExpr::text(), TypeExpr::Null]),
            TypeExpr::integer(),
        ]),
        TypeExpr::sequence(TypeExpr::optional(TypeExpr::text())),
        TypeExpr::Null,
    ];
    for ty in types {
        let once = unwrap_optional(&ty);
        assert_eq!(unwrap_optional(&once), once);
    }
}

#[test]
fn test_sequence_of_sequences_is_unknown() {
    let ty = TypeExpr::sequence(TypeExpr::sequence(TypeExpr::integer()));
    assert_eq!(classify(&ty, None, 0), TypeCategory::UnknownSequence);
}

#[test]
fn test_construct_round_trip_on_leaf_paths() {
    let registry = registry();
    let input = Value::from(json!({
        "label": "root",
        "children": [
            {"label": "a", "children": [{"label": "a1"}]},
            {"label": "b", "attributes": {"color": {"value": "red", "weight": 0.5}}},
        ],
        "attributes": {"size": {"value": 3}},
    }));
    let resolver = Resolver::new(&registry);
    let built = resolver.construct(&input, &node(&registry)).unwrap();

    for path in [
        "label",
        "children:0:label",
        "children:0:children:0:label",
        "children:1:attributes:color:value",
        "children:1:attributes:color:weight",
        "attributes:size:value",
    ] {
        let path: FormPath = path.parse().unwrap();
        assert_eq!(
            resolver.resolve_value(&built, &path).unwrap(),
            resolver.resolve_value(&input, &path).unwrap(),
            "{path}"
        );
    }
}

#[test]
fn test_discriminator_is_deterministic() {
    let variants = vec![
        Schema::new("Circle")
            .field(FieldDescriptor::new("shape", TypeExpr::literal(["circle"])))
            .into_arc(),
        Schema::new("Square")
            .field(FieldDescriptor::new("shape", TypeExpr::literal(["square", "box"])))
            .into_arc(),
    ];
    let observed = Literal::from("box");
    let first = resolve_discriminated(&variants, "shape", Some(&observed)).unwrap();
    for _ in 0..5 {
        let again = resolve_discriminated(&variants, "shape", Some(&observed)).unwrap();
        assert_eq!(again.schema.name(), first.schema.name());
        assert_eq!(again.all_tags, first.all_tags);
    }
    for _ in 0..2 {
        let err = resolve_discriminated(&variants, "shape", Some(&Literal::from("triangle")))
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidDiscriminator { .. }));
    }
}

#[test]
fn test_repair_of_valid_payload_is_identity() {
    let registry = registry();
    let resolver = Resolver::new(&registry);
    let input = Value::from(json!({
        "label": "root",
        "children": [{"label": "leaf", "children": []}],
        "attributes": {"size": {"value": 3, "weight": 1.0}},
    }));
    let payload = resolver.construct(&input, &node(&registry)).unwrap();

    let repaired = resolver
        .validate_with_repair(&payload, &node(&registry))
        .unwrap();

    assert!(repaired.substitutions.is_empty());
    assert_eq!(repaired.value, payload);
}

#[test]
fn test_contract_check_terminates_on_recursive_schema() {
    let registry = registry();
    let resolver = Resolver::new(&registry);
    assert_eq!(resolver.check_contracts(&node(&registry)), Ok(()));
}

#[test]
fn test_positional_mapping_access_is_opt_in() {
    let registry = registry();
    let input = Value::from(json!({"attributes": {"size": {"value": 3}}}));
    let path: FormPath = "attributes:0:value".parse().unwrap();

    let strict = Resolver::new(&registry);
    assert!(matches!(
        strict.resolve_value(&input, &path),
        Err(ResolveError::BadSegment { .. })
    ));

    let legacy = Resolver::new(&registry).with_config(
        AccessConfig::default().with_mapping_addressing(MappingAddressing::KeyThenPosition),
    );
    assert_eq!(
        legacy.resolve_value(&input, &path).unwrap(),
        Some(&Value::Integer(3))
    );
}

#[test]
fn test_construct_round_trip_through_union_without_tag() {
    let registry = SchemaRegistry::new()
        .with(
            Schema::new("Circle")
                .field(FieldDescriptor::new("shape", TypeExpr::literal(["circle"])))
                .field(FieldDescriptor::new("radius", TypeExpr::float())),
        )
        .with(
            Schema::new("Square")
                .field(FieldDescriptor::new("shape", TypeExpr::literal(["square"])))
                .field(FieldDescriptor::new("side", TypeExpr::float())),
        )
        .with(Schema::new("Canvas").field(FieldDescriptor::new(
            "figure",
            TypeExpr::tagged([TypeExpr::named("Circle"), TypeExpr::named("Square")], "shape"),
        )));
    let resolver = Resolver::new(&registry);
    let input = Value::from(json!({"figure": {"radius": 2.5, "label": {"text": "r"}}}));
    let built = resolver
        .construct(&input, &registry.lookup("Canvas").unwrap())
        .unwrap();

    for path in ["figure:radius", "figure:label:text"] {
        let path: FormPath = path.parse().unwrap();
        assert_eq!(
            resolver.resolve_value(&built, &path).unwrap(),
            resolver.resolve_value(&input, &path).unwrap(),
            "{path}"
        );
    }
}
