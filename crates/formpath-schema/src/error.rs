use formpath_document::access::PathAccessError;
use formpath_document::{FormPath, Literal};
use thiserror::Error;

/// Errors raised while resolving paths, types and variants.
///
/// `BadSegment` is expected during interactive editing and callers on a
/// read path usually fall back to defaults. The discriminator errors are
/// contract violations and should reach the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("bad segment at '{path}': {reason}")]
    BadSegment { path: FormPath, reason: String },

    #[error("invalid discriminator value {value} for '{tag}', expected one of {}", display_literals(.allowed))]
    InvalidDiscriminator {
        tag: String,
        value: String,
        allowed: Vec<Literal>,
    },

    #[error("variant {schema} does not declare '{tag}' as a closed literal set")]
    MissingDiscriminatorContract { schema: String, tag: String },

    #[error("discriminator value {value} of '{tag}' is claimed by both {first} and {second}")]
    AmbiguousDiscriminator {
        tag: String,
        value: Literal,
        first: String,
        second: String,
    },

    #[error("schema '{name}' is not known to the lookup")]
    UnknownSchema { name: String },

    #[error("schema {schema} has no field '{field}'")]
    UnknownField { schema: String, field: String },
}

impl From<PathAccessError> for ResolveError {
    fn from(err: PathAccessError) -> Self {
        ResolveError::BadSegment {
            path: err.path,
            reason: err.kind.to_string(),
        }
    }
}

impl ResolveError {
    /// True for errors that reflect a defect in the schema definitions
    /// rather than in the data being edited.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ResolveError::MissingDiscriminatorContract { .. }
                | ResolveError::AmbiguousDiscriminator { .. }
                | ResolveError::UnknownSchema { .. }
        )
    }
}

pub(crate) fn display_literals(values: &[Literal]) -> String {
    let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
