//! Declared types, schemas and field descriptors.
//!
//! Schemas are defined once by the host application and never mutated.
//! A schema's identity is its name: two `Arc<Schema>` with the same name
//! are the same declared type.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use formpath_document::{Literal, Value};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::DateTime => write!(f, "datetime"),
        }
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Primitive(PrimitiveType),
    /// Closed set of accepted literals (enumerations included).
    Literal(Vec<Literal>),
    Record(Arc<Schema>),
    /// Record referenced by name, resolved through a [`SchemaLookup`].
    /// This is how a schema refers to itself.
    Named(String),
    Union(Vec<TypeExpr>),
    Null,
    Sequence(Box<TypeExpr>),
    Mapping(Box<TypeExpr>, Box<TypeExpr>),
    /// A union that carries its own discriminator tag name.
    Tagged { inner: Box<TypeExpr>, tag: String },
    Any,
}

impl TypeExpr {
    pub fn text() -> Self {
        Self::Primitive(PrimitiveType::Text)
    }

    pub fn integer() -> Self {
        Self::Primitive(PrimitiveType::Integer)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveType::Float)
    }

    pub fn boolean() -> Self {
        Self::Primitive(PrimitiveType::Boolean)
    }

    pub fn literal<L: Into<Literal>>(values: impl IntoIterator<Item = L>) -> Self {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn record(schema: Arc<Schema>) -> Self {
        Self::Record(schema)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// `inner | null`
    pub fn optional(inner: TypeExpr) -> Self {
        Self::Union(vec![inner, Self::Null])
    }

    pub fn sequence(item: TypeExpr) -> Self {
        Self::Sequence(Box::new(item))
    }

    pub fn mapping(key: TypeExpr, value: TypeExpr) -> Self {
        Self::Mapping(Box::new(key), Box::new(value))
    }

    /// Union of records discriminated by `tag`.
    pub fn tagged(variants: impl IntoIterator<Item = TypeExpr>, tag: impl Into<String>) -> Self {
        Self::Tagged {
            inner: Box::new(Self::Union(variants.into_iter().collect())),
            tag: tag.into(),
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_) | Self::Named(_))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{}", p),
            Self::Literal(values) => {
                write!(f, "literal(")?;
                for (i, value) in values.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
            Self::Record(schema) => write!(f, "{}", schema.name()),
            Self::Named(name) => write!(f, "{}", name),
            Self::Union(arms) => {
                for (i, arm) in arms.iter().enumerate() {
                    if i != 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", arm)?;
                }
                Ok(())
            }
            Self::Null => write!(f, "null"),
            Self::Sequence(item) => write!(f, "sequence<{}>", item),
            Self::Mapping(key, value) => write!(f, "mapping<{}, {}>", key, value),
            Self::Tagged { inner, tag } => write!(f, "{} (by {})", inner, tag),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Declared default of a field.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    Value(Value),
    Factory(fn() -> Value),
}

impl DefaultValue {
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Factory(factory) => factory(),
        }
    }
}

/// Host field-level validation, run after the value has the declared type.
#[derive(Clone)]
pub struct FieldValidator {
    pub name: &'static str,
    pub check: fn(&Value) -> Result<(), String>,
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldValidator").field(&self.name).finish()
    }
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeExpr,
    pub discriminator: Option<String>,
    pub default: Option<DefaultValue>,
    pub required: bool,
    pub validators: Vec<FieldValidator>,
}

impl FieldDescriptor {
    /// A required field without default.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            discriminator: None,
            default: None,
            required: true,
            validators: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Does not change `required`: a required field with a default still
    /// fails validation when absent, and repair substitutes the default.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn with_default_factory(mut self, factory: fn() -> Value) -> Self {
        self.default = Some(DefaultValue::Factory(factory));
        self
    }

    pub fn with_discriminator(mut self, tag: impl Into<String>) -> Self {
        self.discriminator = Some(tag.into());
        self
    }

    pub fn with_validator(
        mut self,
        name: &'static str,
        check: fn(&Value) -> Result<(), String>,
    ) -> Self {
        self.validators.push(FieldValidator { name, check });
        self
    }

    /// The declared type with a field-level discriminator folded in.
    pub fn declared_type(&self) -> TypeExpr {
        match &self.discriminator {
            Some(tag) => TypeExpr::Tagged {
                inner: Box::new(self.ty.clone()),
                tag: tag.clone(),
            },
            None => self.ty.clone(),
        }
    }
}

/// A named record type with an ordered, fixed set of fields.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Synthetic schema holding only the discriminator `tag`, typed as the
    /// closed set of every tag value the union accepts.
    pub fn probe(name: impl Into<String>, tag: &str, tags: Vec<Literal>) -> Self {
        Self::new(name).field(FieldDescriptor::new(tag, TypeExpr::Literal(tags)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn into_arc(self) -> Arc<Schema> {
        Arc::new(self)
    }
}

/// Name to schema lookup supplied by the host application.
///
/// Needed to follow [`TypeExpr::Named`] references and to restore a schema
/// from a stored identifier.
pub trait SchemaLookup {
    fn lookup(&self, name: &str) -> Option<Arc<Schema>>;
}

impl<F> SchemaLookup for F
where
    F: Fn(&str) -> Option<Arc<Schema>>,
{
    fn lookup(&self, name: &str) -> Option<Arc<Schema>> {
        self(name)
    }
}

/// Ordered set of schemas registered by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema`, replacing any schema with the same name.
    pub fn register(&mut self, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.name().to_string(), schema.clone());
        schema
    }

    pub fn with(mut self, schema: Schema) -> Self {
        self.register(schema);
        self
    }
}

impl SchemaLookup for SchemaRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }
}
