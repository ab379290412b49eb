use core::fmt::{self, Display};
use core::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::prelude_internal::*;

/// Reserved separator between path segments.
pub const SEP: char = ':';

/// Token for [`PathSegment::Root`].
pub const ROOT_TOKEN: &str = "_root_";

/// Token for [`PathSegment::Parent`].
pub const PARENT_TOKEN: &str = "_parent_";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{[\w|{}]+\}\}$").expect("placeholder pattern is valid"));

/// Returns true if `segment` is a `{{...}}` item template.
pub fn is_placeholder(segment: &str) -> bool {
    PLACEHOLDER.is_match(segment)
}

/// Route from a root instance (or schema) to a nested value (or type).
///
/// The empty path is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Plural)]
#[plural(len, is_empty, iter, into_iter, from_iter)]
pub struct FormPath(pub Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A name that is read as a record field, or as a map key when the
    /// container turns out to be a keyed mapping.
    Field(String),
    /// A map key built programmatically, never produced by the parser.
    ///
    /// The grammar has no escaping, so a key that is all digits, contains
    /// `:` or spells a sentinel or template does not survive a
    /// display/parse cycle. Check [`PathSegment::is_displayable`] first
    /// when the path is going to be serialized.
    Key(String),
    /// Position in an ordered sequence.
    Index(usize),
    /// Not-yet-materialized item, e.g. `{{idx}}`. Never resolves to a value.
    Placeholder(String),
    /// `_root_`: restart from the document root.
    Root,
    /// `_parent_`: go up one level.
    Parent,
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    pub fn key(key: impl Into<String>) -> Self {
        PathSegment::Key(key.into())
    }

    /// The name carried by a `Field` or `Key` segment.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PathSegment::Field(name) | PathSegment::Key(name) => Some(name),
            _ => None,
        }
    }

    /// Whether displaying this segment and parsing it back yields an
    /// equal segment, with `Key` read back as `Field`.
    pub fn is_displayable(&self) -> bool {
        match self {
            PathSegment::Field(name) | PathSegment::Key(name) => {
                !name.contains(SEP) && matches!(parse_segment(name, 0), Ok(PathSegment::Field(_)))
            }
            _ => true,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, PathSegment::Root | PathSegment::Parent)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) | PathSegment::Key(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::Placeholder(template) => write!(f, "{}", template),
            PathSegment::Root => write!(f, "{}", ROOT_TOKEN),
            PathSegment::Parent => write!(f, "{}", PARENT_TOKEN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("empty segment at position {position}")]
    EmptySegment { position: usize },
    #[error("malformed item template '{segment}'")]
    MalformedPlaceholder { segment: String },
    #[error("index '{segment}' does not fit in usize")]
    IndexOverflow { segment: String },
    #[error("'{segment}' is only allowed at the start of a path")]
    MisplacedSentinel { segment: String },
}

impl FormPath {
    pub fn root() -> Self {
        FormPath(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parse(s: &str) -> Result<Self, PathParseError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for (position, raw) in s.split(SEP).enumerate() {
            let segment = parse_segment(raw, position)?;
            if segment.is_sentinel() && segments.iter().any(|s: &PathSegment| !s.is_sentinel()) {
                return Err(PathParseError::MisplacedSentinel {
                    segment: raw.to_string(),
                });
            }
            segments.push(segment);
        }
        Ok(FormPath(segments))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// New path with `segment` appended.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut path = self.clone();
        path.0.push(segment);
        path
    }

    pub fn join(&self, other: &FormPath) -> Self {
        let mut path = self.clone();
        path.0.extend(other.0.iter().cloned());
        path
    }

    /// The path without its last segment, `None` at the root.
    pub fn parent(&self) -> Option<FormPath> {
        self.split_last().map(|(parent, _)| parent)
    }

    pub fn split_last(&self) -> Option<(FormPath, &PathSegment)> {
        let (last, rest) = self.0.split_last()?;
        Some((FormPath(rest.to_vec()), last))
    }

    /// The first `len` segments.
    pub fn prefix(&self, len: usize) -> FormPath {
        FormPath(self.0[..len.min(self.0.len())].to_vec())
    }

    pub fn is_relative(&self) -> bool {
        self.0.first().is_some_and(PathSegment::is_sentinel)
    }

    /// Rewrite this path, relative to `base`, into an absolute one.
    ///
    /// `_root_` restarts from the document root and `_parent_` drops one
    /// segment from what has been built so far. Going above the root stays
    /// at the root.
    pub fn rebase(&self, base: &FormPath) -> FormPath {
        let mut resolved = base.0.clone();
        for segment in &self.0 {
            match segment {
                PathSegment::Root => resolved.clear(),
                PathSegment::Parent => {
                    resolved.pop();
                }
                other => resolved.push(other.clone()),
            }
        }
        FormPath(resolved)
    }
}

fn parse_segment(raw: &str, position: usize) -> Result<PathSegment, PathParseError> {
    if raw.is_empty() {
        return Err(PathParseError::EmptySegment { position });
    }
    if raw == ROOT_TOKEN {
        return Ok(PathSegment::Root);
    }
    if raw == PARENT_TOKEN {
        return Ok(PathSegment::Parent);
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse()
            .map(PathSegment::Index)
            .map_err(|_| PathParseError::IndexOverflow {
                segment: raw.to_string(),
            });
    }
    if raw.contains(['{', '}']) {
        if is_placeholder(raw) {
            return Ok(PathSegment::Placeholder(raw.to_string()));
        }
        return Err(PathParseError::MalformedPlaceholder {
            segment: raw.to_string(),
        });
    }
    Ok(PathSegment::Field(raw.to_string()))
}

impl FromStr for FormPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormPath::parse(s)
    }
}

impl Display for FormPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, "{}", SEP)?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl From<Vec<PathSegment>> for FormPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        FormPath(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str) -> PathSegment {
        PathSegment::field(name)
    }

    #[test]
    fn test_key_display_is_lossy_for_unescapable_keys() {
        let reparsed = |segment: PathSegment| {
            FormPath::parse(&FormPath(vec![segment]).to_string()).unwrap_or_default()
        };
        assert!(PathSegment::key("summer").is_displayable());
        assert_eq!(reparsed(PathSegment::key("summer")), FormPath(vec![field("summer")]));

        for key in ["3", "a:b", "_root_", "{{i}}", ""] {
            assert!(!PathSegment::key(key).is_displayable(), "{key:?}");
        }
        assert_eq!(
            reparsed(PathSegment::key("3")),
            FormPath(vec![PathSegment::Index(3)])
        );
        assert_eq!(reparsed(PathSegment::key("a:b")).len(), 2);
        assert!(PathSegment::Index(3).is_displayable());
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert!(FormPath::parse("").unwrap().is_root());
    }

    #[test]
    fn test_parse_mixed_segments() {
        let path: FormPath = "pets:0:tags:{{idx}}".parse().unwrap();
        assert_eq!(
            path,
            FormPath(vec![
                field("pets"),
                PathSegment::Index(0),
                field("tags"),
                PathSegment::Placeholder("{{idx}}".into()),
            ])
        );
    }

    #[test]
    fn test_nested_template_is_placeholder() {
        let path = FormPath::parse("items:{{{{idx}}}}").unwrap();
        assert_eq!(
            path.segments()[1],
            PathSegment::Placeholder("{{{{idx}}}}".into())
        );
    }

    #[test]
    fn test_malformed_template_is_rejected() {
        for bad in ["items:{{idx}", "items:{idx}}", "items:{{}}", "items:a{{b}}"] {
            assert!(
                matches!(
                    FormPath::parse(bad),
                    Err(PathParseError::MalformedPlaceholder { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_segment_is_rejected() {
        assert_eq!(
            FormPath::parse("a::b"),
            Err(PathParseError::EmptySegment { position: 1 })
        );
        assert_eq!(
            FormPath::parse("a:"),
            Err(PathParseError::EmptySegment { position: 1 })
        );
    }

    #[test]
    fn test_index_overflow() {
        assert!(matches!(
            FormPath::parse("a:99999999999999999999999999"),
            Err(PathParseError::IndexOverflow { .. })
        ));
    }

    #[test]
    fn test_sentinels_only_as_prefix() {
        let path = FormPath::parse("_parent_:_parent_:name").unwrap();
        assert!(path.is_relative());
        assert!(matches!(
            FormPath::parse("a:_root_:b"),
            Err(PathParseError::MisplacedSentinel { .. })
        ));
    }

    #[test]
    fn test_display_is_inverse_of_parse() {
        for s in ["", "a", "x:li:1", "_root_:office", "pets:{{idx}}:name", "_parent_:a:3"] {
            assert_eq!(FormPath::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_child_and_split_last() {
        let path = FormPath::parse("a:b").unwrap();
        let child = path.child(PathSegment::Index(2));
        assert_eq!(child.to_string(), "a:b:2");
        let (parent, last) = child.split_last().unwrap();
        assert_eq!(parent, path);
        assert_eq!(last, &PathSegment::Index(2));
        assert_eq!(FormPath::root().parent(), None);
    }

    #[test]
    fn test_rebase() {
        let base = FormPath::parse("pets:1:owner").unwrap();
        let cases = [
            ("_root_:office", "office"),
            ("_parent_:name", "pets:1:name"),
            ("_parent_:_parent_:_parent_:_parent_:x", "x"),
            ("age", "pets:1:owner:age"),
        ];
        for (relative, expected) in cases {
            let rebased = FormPath::parse(relative).unwrap().rebase(&base);
            assert_eq!(rebased.to_string(), expected);
        }
    }
}
