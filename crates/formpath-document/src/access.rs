//! Reading and writing instance values at a [`FormPath`].
//!
//! Reads are lenient: an absent record field, an explicit null in the
//! middle of a path, or a `{{...}}` placeholder all resolve to "no value"
//! so the caller can fall back to schema defaults. Addressing something
//! that does not exist in a concrete container is a [`PathAccessError`].
//! Writes never create intermediate containers.

use thiserror::Error;

use crate::prelude_internal::*;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("bad segment at '{path}': {kind}")]
pub struct PathAccessError {
    /// Path up to and including the offending segment.
    pub path: FormPath,
    pub kind: BadSegmentKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadSegmentKind {
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no entry with key '{key}'")]
    MissingKey { key: String },
    #[error("a {kind} cannot be addressed with '{segment}'")]
    Unaddressable { kind: ValueKind, segment: String },
    #[error("'{segment}' is only valid in visibility expressions")]
    Sentinel { segment: String },
    #[error("cannot write through item template '{template}'")]
    Placeholder { template: String },
}

/// Read the value at `path` below `root`.
///
/// `Ok(None)` means the location exists in the shape but has no current
/// value. An explicit null at the end of the path is returned as
/// `Some(&Value::Null)`.
pub fn resolve_value<'a>(
    root: &'a Value,
    path: &FormPath,
    config: &AccessConfig,
) -> Result<Option<&'a Value>, PathAccessError> {
    let mut current = root;
    for (depth, segment) in path.segments().iter().enumerate() {
        let fail = |kind| PathAccessError {
            path: path.prefix(depth + 1),
            kind,
        };
        let next = match (current, segment) {
            (_, PathSegment::Root | PathSegment::Parent) => {
                return Err(fail(BadSegmentKind::Sentinel {
                    segment: segment.to_string(),
                }));
            }
            (_, PathSegment::Placeholder(_)) => return Ok(None),
            (Value::Null, _) => return Ok(None),
            (Value::Record(record), _) => match record.fields.get(&segment_key(segment)) {
                Some(value) => value,
                None => return Ok(None),
            },
            (Value::Map(map), _) => {
                map_entry(map, segment, config.mapping_addressing).map_err(fail)?
            }
            (Value::Array(items), PathSegment::Index(index)) => {
                items.get(*index).ok_or_else(|| {
                    fail(BadSegmentKind::IndexOutOfRange {
                        index: *index,
                        len: items.len(),
                    })
                })?
            }
            (other, _) => {
                return Err(fail(BadSegmentKind::Unaddressable {
                    kind: other.kind(),
                    segment: segment.to_string(),
                }));
            }
        };
        current = next;
    }
    Ok(Some(current))
}

/// Write `value` at `path` below `root`, returning the value it replaced.
///
/// Every segment but the last must already exist.
pub fn set_at_path(
    root: &mut Value,
    path: &FormPath,
    value: Value,
    config: &AccessConfig,
) -> Result<Option<Value>, PathAccessError> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Ok(Some(core::mem::replace(root, value)));
    };
    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        current = step_mut(current, segment, config.mapping_addressing).map_err(|kind| {
            PathAccessError {
                path: path.prefix(depth + 1),
                kind,
            }
        })?;
    }
    assign(current, last, value, config.mapping_addressing).map_err(|kind| PathAccessError {
        path: path.clone(),
        kind,
    })
}

fn segment_key(segment: &PathSegment) -> String {
    match segment {
        PathSegment::Index(index) => index.to_string(),
        other => other.to_string(),
    }
}

fn check_addressable(segment: &PathSegment) -> Result<(), BadSegmentKind> {
    match segment {
        PathSegment::Root | PathSegment::Parent => Err(BadSegmentKind::Sentinel {
            segment: segment.to_string(),
        }),
        PathSegment::Placeholder(template) => Err(BadSegmentKind::Placeholder {
            template: template.clone(),
        }),
        _ => Ok(()),
    }
}

fn map_entry<'a>(
    map: &'a Map,
    segment: &PathSegment,
    addressing: MappingAddressing,
) -> Result<&'a Value, BadSegmentKind> {
    let key = segment_key(segment);
    if let Some(value) = map.get(&key) {
        return Ok(value);
    }
    if let (PathSegment::Index(index), MappingAddressing::KeyThenPosition) = (segment, addressing)
    {
        return map
            .get_index(*index)
            .map(|(_, value)| value)
            .ok_or(BadSegmentKind::IndexOutOfRange {
                index: *index,
                len: map.len(),
            });
    }
    Err(BadSegmentKind::MissingKey { key })
}

fn step_mut<'a>(
    current: &'a mut Value,
    segment: &PathSegment,
    addressing: MappingAddressing,
) -> Result<&'a mut Value, BadSegmentKind> {
    check_addressable(segment)?;
    let key = segment_key(segment);
    match (current, segment) {
        (Value::Record(record), _) => record
            .fields
            .get_mut(&key)
            .ok_or(BadSegmentKind::MissingKey { key }),
        (Value::Map(map), _) => {
            if map.contains_key(&key) {
                return map.get_mut(&key).ok_or(BadSegmentKind::MissingKey { key });
            }
            match (segment, addressing) {
                (PathSegment::Index(index), MappingAddressing::KeyThenPosition) => {
                    let len = map.len();
                    map.get_index_mut(*index)
                        .map(|(_, value)| value)
                        .ok_or(BadSegmentKind::IndexOutOfRange { index: *index, len })
                }
                _ => Err(BadSegmentKind::MissingKey { key }),
            }
        }
        (Value::Array(items), PathSegment::Index(index)) => {
            let len = items.len();
            items
                .get_mut(*index)
                .ok_or(BadSegmentKind::IndexOutOfRange { index: *index, len })
        }
        (other, _) => Err(BadSegmentKind::Unaddressable {
            kind: other.kind(),
            segment: segment.to_string(),
        }),
    }
}

fn assign(
    target: &mut Value,
    segment: &PathSegment,
    value: Value,
    addressing: MappingAddressing,
) -> Result<Option<Value>, BadSegmentKind> {
    check_addressable(segment)?;
    let key = segment_key(segment);
    match (target, segment) {
        (Value::Record(record), _) => Ok(record.fields.insert(key, value)),
        (Value::Map(map), PathSegment::Index(index))
            if addressing == MappingAddressing::KeyThenPosition && !map.contains_key(&key) =>
        {
            let len = map.len();
            let (_, slot) = map
                .get_index_mut(*index)
                .ok_or(BadSegmentKind::IndexOutOfRange { index: *index, len })?;
            Ok(Some(core::mem::replace(slot, value)))
        }
        (Value::Map(map), _) => Ok(map.insert(key, value)),
        (Value::Array(items), PathSegment::Index(index)) => {
            let len = items.len();
            let slot = items
                .get_mut(*index)
                .ok_or(BadSegmentKind::IndexOutOfRange { index: *index, len })?;
            Ok(Some(core::mem::replace(slot, value)))
        }
        (other, _) => Err(BadSegmentKind::Unaddressable {
            kind: other.kind(),
            segment: segment.to_string(),
        }),
    }
}
