//! Dict-path reads and writes against nested JSON documents.
//!
//! A dict path is a fixed, non-empty sequence of keys locating a value deep
//! inside a JSON structure. The path `["revision", "code"]` names the string
//! in `{"revision": {"code": "..."}}`. Paths are declared at type-definition
//! time; this is not a query language.

use serde_json::{Map, Value};

/// One segment of a dict path: an object key or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seg {
    /// Object key.
    Key(&'static str),
    /// Array index.
    Index(usize),
}

impl std::fmt::Display for Seg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seg::Key(key) => write!(f, "{key}"),
            Seg::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Errors raised while walking a dict path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum PathError {
    /// An object along the path has no entry for the requested key.
    #[error("key `{key}` not found at depth {depth}")]
    MissingKey {
        /// The key that was absent.
        key: String,
        /// Zero-based position of the failing segment.
        depth: usize,
    },
    /// An array along the path is shorter than the requested index.
    #[error("index {index} out of range at depth {depth}")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// Zero-based position of the failing segment.
        depth: usize,
    },
    /// The path tried to descend into a value that is not an object or array.
    #[error("cannot descend into non-container value at depth {depth}")]
    NotAContainer {
        /// Zero-based position of the failing segment.
        depth: usize,
    },
    /// Dict paths must contain at least one segment.
    #[error("dict paths must not be empty")]
    Empty,
}

/// Reads the value at `path` inside `base`.
///
/// Fails if any segment is absent, out of range, or indexes into a
/// non-container value.
pub fn get<'a>(base: &'a Value, path: &[Seg]) -> Result<&'a Value, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let mut cur = base;
    for (depth, seg) in path.iter().enumerate() {
        cur = match (*seg, cur) {
            (Seg::Key(key), Value::Object(map)) => map.get(key).ok_or(PathError::MissingKey {
                key: key.to_owned(),
                depth,
            })?,
            (Seg::Index(index), Value::Array(items)) => items
                .get(index)
                .ok_or(PathError::IndexOutOfRange { index, depth })?,
            _ => return Err(PathError::NotAContainer { depth }),
        };
    }
    Ok(cur)
}

/// Writes `value` at `path` inside `base`.
///
/// Missing intermediate keys are filled in with empty objects. Existing
/// intermediate values are never replaced, even when they are not containers;
/// descending into one fails instead. `Index` segments never grow arrays.
pub fn set(base: &mut Value, path: &[Seg], value: Value) -> Result<(), PathError> {
    let (last, walk) = path.split_last().ok_or(PathError::Empty)?;
    let mut cur = base;
    for (depth, seg) in walk.iter().enumerate() {
        cur = match (*seg, cur) {
            (Seg::Key(key), Value::Object(map)) => map
                .entry(key.to_owned())
                .or_insert_with(|| Value::Object(Map::new())),
            (Seg::Index(index), Value::Array(items)) => items
                .get_mut(index)
                .ok_or(PathError::IndexOutOfRange { index, depth })?,
            _ => return Err(PathError::NotAContainer { depth }),
        };
    }
    let depth = path.len() - 1;
    match (*last, cur) {
        (Seg::Key(key), Value::Object(map)) => {
            map.insert(key.to_owned(), value);
        }
        (Seg::Index(index), Value::Array(items)) => {
            let slot = items
                .get_mut(index)
                .ok_or(PathError::IndexOutOfRange { index, depth })?;
            *slot = value;
        }
        _ => return Err(PathError::NotAContainer { depth }),
    }
    Ok(())
}
