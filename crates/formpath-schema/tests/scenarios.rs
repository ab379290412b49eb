//! End-to-end scenarios: construction, path reads, variant resolution and
//! repair against host-declared schemas.

use std::sync::Arc;

use formpath_document::{FieldState, FormPath, Literal, Record, Value};
use formpath_schema::{
    FieldDescriptor, ResolveError, Resolver, Schema, SchemaLookup, SchemaRegistry, TypeExpr,
    ValidationErrorKind, resolve_discriminated,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn path(s: &str) -> FormPath {
    s.parse().unwrap()
}

#[test]
fn test_construct_keeps_raw_leaves_and_unset_fields() {
    let registry = SchemaRegistry::new()
        .with(Schema::new("Item").field(FieldDescriptor::new("c", TypeExpr::integer())))
        .with(
            Schema::new("Root")
                .field(FieldDescriptor::new("a", TypeExpr::integer()))
                .field(FieldDescriptor::new(
                    "b",
                    TypeExpr::sequence(TypeExpr::named("Item")),
                )),
        );
    let root = registry.lookup("Root").unwrap();
    let input = Value::from(json!({"a": "5", "b": [{"c": 1}, {}]}));

    let built = Resolver::new(&registry).construct(&input, &root).unwrap();

    assert_eq!(built.get("a"), Some(&Value::from("5")));
    let Some(Value::Array(items)) = built.get("b") else {
        panic!("expected b to be a sequence, got {built:?}");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        Value::Record(Record::new("Item").with_field("c", 1))
    );
    let Value::Record(second) = &items[1] else {
        panic!("expected a record, got {:?}", items[1]);
    };
    assert_eq!(second.field_state("c"), FieldState::Absent);
}

#[test]
fn test_resolve_value_through_nested_sequence() {
    let registry = SchemaRegistry::new();
    let root = Value::from(json!({"x": {"li": [10, 20]}}));
    let got = Resolver::new(&registry)
        .resolve_value(&root, &path("x:li:1"))
        .unwrap();
    assert_eq!(got, Some(&Value::Integer(20)));
}

fn pets() -> Vec<Arc<Schema>> {
    vec![
        Schema::new("ScenarioCat")
            .field(FieldDescriptor::new("species", TypeExpr::literal(["cat"])))
            .field(FieldDescriptor::new("meows", TypeExpr::boolean()))
            .into_arc(),
        Schema::new("ScenarioDog")
            .field(FieldDescriptor::new("species", TypeExpr::literal(["dog"])))
            .field(FieldDescriptor::new("barks", TypeExpr::boolean()))
            .into_arc(),
    ]
}

#[test]
fn test_discriminated_resolution() {
    let variants = pets();

    let probe = resolve_discriminated(&variants, "species", None).unwrap();
    assert!(probe.is_probe);
    let fields: Vec<_> = probe
        .schema
        .fields()
        .map(|field| (field.name.clone(), field.ty.clone()))
        .collect();
    assert_eq!(
        fields,
        vec![("species".to_string(), TypeExpr::literal(["cat", "dog"]))]
    );

    let dog = resolve_discriminated(&variants, "species", Some(&Literal::from("dog"))).unwrap();
    assert_eq!(dog.schema.name(), "ScenarioDog");

    let bird = resolve_discriminated(&variants, "species", Some(&Literal::from("bird")));
    assert_eq!(
        bird.unwrap_err(),
        ResolveError::InvalidDiscriminator {
            tag: "species".into(),
            value: "\"bird\"".into(),
            allowed: vec![Literal::from("cat"), Literal::from("dog")],
        }
    );
}

fn person(age: FieldDescriptor) -> (SchemaRegistry, Arc<Schema>) {
    let mut registry = SchemaRegistry::new();
    let person = registry.register(
        Schema::new("Person")
            .field(FieldDescriptor::new("name", TypeExpr::text()))
            .field(age),
    );
    (registry, person)
}

#[test]
fn test_repair_substitutes_default_for_missing_field() {
    let (registry, person) = person(FieldDescriptor::new("age", TypeExpr::integer()).with_default(0));
    let payload = Value::from(json!({"name": "Ann"}));

    let repaired = Resolver::new(&registry)
        .validate_with_repair(&payload, &person)
        .unwrap();

    assert_eq!(repaired.substitutions, vec![path("age")]);
    assert_eq!(
        repaired.value,
        Value::Record(
            Record::new("Person")
                .with_field("name", "Ann")
                .with_field("age", 0)
        )
    );
}

#[test]
fn test_repair_without_default_returns_original_failure() {
    let (registry, person) = person(FieldDescriptor::new("age", TypeExpr::integer()));
    let payload = Value::from(json!({"name": "Ann"}));
    let resolver = Resolver::new(&registry);

    let original = resolver.validate(&payload, &person).unwrap_err();
    let failure = resolver.validate_with_repair(&payload, &person).unwrap_err();

    assert_eq!(failure, original);
    assert_eq!(
        failure.errors[0].kind,
        ValidationErrorKind::MissingRequiredField { field: "age".into() }
    );
}
