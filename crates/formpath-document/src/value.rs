use core::fmt;

use crate::prelude_internal::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    Text,
    Array,
    Map,
    Record,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Text => write!(f, "text"),
            Self::Array => write!(f, "array"),
            Self::Map => write!(f, "map"),
            Self::Record => write!(f, "record"),
        }
    }
}

/// A runtime value held by the form state.
///
/// Untrusted input arrives as `Map`s; partial construction and validation
/// turn the maps that correspond to declared schemas into `Record`s.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Array(Vec<Value>),
    Map(Map),
    Record(Record),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Array(_) => ValueKind::Array,
            Self::Map(_) => ValueKind::Map,
            Self::Record(_) => ValueKind::Record,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Named entries of a `Map` or the present fields of a `Record`.
    ///
    /// Both shapes are read the same way when input is untrusted.
    pub fn entries(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            Self::Record(record) => Some(&record.fields),
            _ => None,
        }
    }

    pub fn entries_mut(&mut self) -> Option<&mut Map> {
        match self {
            Self::Map(map) => Some(map),
            Self::Record(record) => Some(&mut record.fields),
            _ => None,
        }
    }

    /// Reads a named entry, see [`Value::entries`].
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries().and_then(|entries| entries.get(name))
    }

    /// The literal this value denotes, if it can be one.
    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            Self::Text(s) => Some(Literal::Text(s.clone())),
            Self::Integer(i) => Some(Literal::Integer(*i)),
            Self::Bool(b) => Some(Literal::Bool(*b)),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Text(s) => Value::Text(s),
            Literal::Integer(i) => Value::Integer(i),
            Literal::Bool(b) => Value::Bool(b),
        }
    }
}

/// A member of a closed literal set, e.g. a discriminator tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Literal {
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => write!(f, "{:?}", s),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Text(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

/// Instance of a named schema.
///
/// A field missing from `fields` is absent; a field holding [`Value::Null`]
/// was explicitly nulled. See [`Record::field_state`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub schema: String,
    pub fields: Map,
}

/// Tri-state view of a record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldState<'a> {
    Absent,
    Null,
    Present(&'a Value),
}

impl<'a> FieldState<'a> {
    pub fn value(self) -> Option<&'a Value> {
        match self {
            FieldState::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl Record {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            fields: Map::default(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    pub fn field_state(&self, name: &str) -> FieldState<'_> {
        match self.fields.get(name) {
            None => FieldState::Absent,
            Some(Value::Null) => FieldState::Null,
            Some(value) => FieldState::Present(value),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_state_distinguishes_null_from_absent() {
        let record = Record::new("Person")
            .with_field("name", "Ada")
            .with_field("nickname", Value::Null);

        assert_eq!(
            record.field_state("name"),
            FieldState::Present(&Value::Text("Ada".into()))
        );
        assert_eq!(record.field_state("nickname"), FieldState::Null);
        assert_eq!(record.field_state("age"), FieldState::Absent);
    }

    #[test]
    fn test_entries_reads_maps_and_records_alike() {
        let map: Map = [("a", Value::Integer(1))].into_iter().collect();
        let record = Record::new("R").with_field("a", 1);
        assert_eq!(Value::Map(map).get("a"), Some(&Value::Integer(1)));
        assert_eq!(Value::Record(record).get("a"), Some(&Value::Integer(1)));
        assert_eq!(Value::Integer(3).get("a"), None);
    }

    #[test]
    fn test_as_literal() {
        assert_eq!(Value::from("cat").as_literal(), Some(Literal::from("cat")));
        assert_eq!(Value::Float(1.5).as_literal(), None);
    }
}
