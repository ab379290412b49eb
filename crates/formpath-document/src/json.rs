//! Conversion between form payloads in JSON and [`Value`].
//!
//! Incoming JSON objects always become [`Value::Map`]; only partial
//! construction or validation against a schema turns them into records.

use serde_json::{Number, Value as JsonValue};
use thiserror::Error;

use crate::prelude_internal::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JsonConversionError {
    #[error("Invalid number: cannot represent {0} as JSON number")]
    InvalidNumber(f64),
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => number_to_value(&n),
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(object) => Value::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Integer(i)
    } else {
        // u64 beyond i64::MAX and real numbers both land here
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl Value {
    /// Convert back to JSON. Records become plain objects.
    pub fn to_json(&self) -> Result<JsonValue, JsonConversionError> {
        Ok(match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => JsonValue::Number(
                Number::from_f64(*f).ok_or(JsonConversionError::InvalidNumber(*f))?,
            ),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Array(items) => {
                JsonValue::Array(items.iter().map(Value::to_json).collect::<Result<_, _>>()?)
            }
            Value::Map(map) => map_to_json(map)?,
            Value::Record(record) => map_to_json(&record.fields)?,
        })
    }
}

fn map_to_json(map: &Map) -> Result<JsonValue, JsonConversionError> {
    let mut object = serde_json::Map::new();
    for (key, value) in map {
        object.insert(key.clone(), value.to_json()?);
    }
    Ok(JsonValue::Object(object))
}
