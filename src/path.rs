//! Materialized path codec
//!
//! A department's path is the `/`-delimited chain of ancestor ids including
//! the department itself, e.g. `/1/4/9`. Paths are derived values; only the
//! hierarchy service writes them.

use crate::error::{HierarchyError, HierarchyResult};

/// Path segment delimiter
pub const DELIMITER: char = '/';

/// Encode an ancestor id chain (inclusive of self) into a path string.
pub fn encode(ids: &[i64]) -> HierarchyResult<String> {
    if ids.is_empty() {
        return Err(HierarchyError::InvalidPath("empty id chain".to_string()));
    }
    let mut out = String::new();
    for id in ids {
        out.push(DELIMITER);
        out.push_str(&id.to_string());
    }
    Ok(out)
}

/// Decode a path string back into its ancestor id chain.
pub fn decode(path: &str) -> HierarchyResult<Vec<i64>> {
    let rest = path
        .strip_prefix(DELIMITER)
        .ok_or_else(|| HierarchyError::InvalidPath(path.to_string()))?;
    if rest.is_empty() {
        return Err(HierarchyError::InvalidPath(path.to_string()));
    }

    rest.split(DELIMITER)
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| HierarchyError::InvalidPath(path.to_string()))
        })
        .collect()
}

/// Whether `ancestor` is a strict prefix of `path` on a segment boundary.
///
/// `/1/2` is a prefix of `/1/2/3` but not of `/1/20`, and a path is never
/// a prefix of itself.
pub fn is_prefix_of(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(DELIMITER)
}

/// Append a node id to its parent's path. Pass `None` for roots.
pub fn append(parent_path: Option<&str>, id: i64) -> String {
    match parent_path {
        Some(p) => format!("{}{}{}", p, DELIMITER, id),
        None => format!("{}{}", DELIMITER, id),
    }
}

/// Depth derived from a path: 0 for roots.
pub fn level_of(path: &str) -> HierarchyResult<i32> {
    Ok(decode(path)?.len() as i32 - 1)
}
