//! Instance values and path addressing for formpath.
//!
//! This crate knows nothing about schemas. It provides the runtime value
//! model a form state holder works with, the `:`-separated path grammar,
//! and value-side navigation (`resolve_value` / `set_at_path`).

/// A type-safe value model for form instances.
pub mod value;

/// Insertion-ordered string-keyed map.
pub mod map;

/// Path grammar: parsing, serialization and relative rewriting.
pub mod path;

/// Reading and writing values at a path.
pub mod access;

/// Configuration of value access.
pub mod config;

/// Conversion from and to `serde_json` values.
pub mod json;

pub use access::{PathAccessError, resolve_value, set_at_path};
pub use config::{AccessConfig, MappingAddressing};
pub use map::Map;
pub use path::{FormPath, PathParseError, PathSegment, SEP};
pub use value::{FieldState, Literal, Record, Value, ValueKind};

pub(crate) mod prelude_internal {
    #![allow(unused_imports)]
    pub use crate::config::{AccessConfig, MappingAddressing};
    pub use crate::map::Map;
    pub use crate::path::{FormPath, PathSegment};
    pub use crate::value::{FieldState, Literal, Record, Value, ValueKind};
    pub use thisisplural::Plural;
}
