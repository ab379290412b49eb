//! Schema-side resolution for formpath.
//!
//! Given host-declared [`Schema`]s, this crate classifies declared types
//! for renderers, resolves discriminated unions, walks paths over types,
//! reconstructs untrusted input into partial instances and validates
//! payloads, repairing them with declared defaults where possible.
//!
//! Everything that needs to follow a named schema goes through a
//! [`Resolver`], which holds the host's [`SchemaLookup`].

pub mod category;
mod construct;
pub mod discriminated;
pub mod error;
pub mod repair;
pub mod resolve;
pub mod schema;
pub mod validate;
pub mod visibility;

pub use category::{TypeCategory, classify, classify_field, split_discriminator, unwrap_optional};
pub use discriminated::{VariantResolution, resolve_discriminated};
pub use error::ResolveError;
pub use repair::Repaired;
pub use resolve::Resolver;
pub use schema::{
    DefaultValue, FieldDescriptor, FieldValidator, PrimitiveType, Schema, SchemaLookup,
    SchemaRegistry, TypeExpr,
};
pub use validate::{FieldError, ValidationErrorKind, ValidationFailure};
pub use visibility::{FilterOperator, UnknownOperator, VisibilityFilter};
