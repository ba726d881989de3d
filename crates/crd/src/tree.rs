//! Typed navigation over decoded attribute trees
//!
//! Paths are slices of mapping keys walked from a root value. Every accessor
//! tells apart a field that is absent (or explicitly `null`) from one that is
//! present with the wrong shape.

use serde_yaml::{Mapping, Sequence, Value};
use thiserror::Error;

/// Why a path could not be resolved to the requested type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("'{path}' is missing")]
    Missing { path: String },

    #[error("'{path}' must be {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl PathError {
    pub fn path(&self) -> &str {
        match self {
            PathError::Missing { path } | PathError::WrongType { path, .. } => path,
        }
    }
}

/// Short name of a value's shape, used in diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn display_path(path: &[&str]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

/// Walk `path` from `root`.
///
/// Returns `Ok(None)` when the final or any intermediate key is absent or
/// `null`, and an error when an intermediate node is not a mapping.
pub fn lookup<'v>(root: &'v Value, path: &[&str]) -> Result<Option<&'v Value>, PathError> {
    let mut node = root;
    for (depth, key) in path.iter().enumerate() {
        let mapping = node.as_mapping().ok_or_else(|| PathError::WrongType {
            path: display_path(&path[..depth]),
            expected: "a mapping",
            found: type_name(node),
        })?;

        match mapping.get(*key) {
            None | Some(Value::Null) => return Ok(None),
            Some(next) => node = next,
        }
    }
    Ok(Some(node))
}

/// Like [`lookup`], but an absent value is an error
pub fn get<'v>(root: &'v Value, path: &[&str]) -> Result<&'v Value, PathError> {
    lookup(root, path)?.ok_or_else(|| PathError::Missing {
        path: display_path(path),
    })
}

fn require<'v, T: ?Sized>(
    value: &'v Value,
    path: &[&str],
    expected: &'static str,
    cast: impl FnOnce(&'v Value) -> Option<&'v T>,
) -> Result<&'v T, PathError> {
    cast(value).ok_or_else(|| PathError::WrongType {
        path: display_path(path),
        expected,
        found: type_name(value),
    })
}

pub fn get_mapping<'v>(root: &'v Value, path: &[&str]) -> Result<&'v Mapping, PathError> {
    require(get(root, path)?, path, "a mapping", Value::as_mapping)
}

pub fn get_sequence<'v>(root: &'v Value, path: &[&str]) -> Result<&'v Sequence, PathError> {
    require(get(root, path)?, path, "a sequence", Value::as_sequence)
}

pub fn get_str<'v>(root: &'v Value, path: &[&str]) -> Result<&'v str, PathError> {
    require(get(root, path)?, path, "a string", Value::as_str)
}

/// A mapping that may be left out, but must be a mapping when given
pub fn get_optional_mapping<'v>(
    root: &'v Value,
    path: &[&str],
) -> Result<Option<&'v Mapping>, PathError> {
    lookup(root, path)?
        .map(|value| require(value, path, "a mapping", Value::as_mapping))
        .transpose()
}

/// Render a scalar the way it reads in the source document.
///
/// Absent and `null` values render as an empty string; composite values are
/// rendered as compact JSON.
pub fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        serde_yaml::from_str(
            r#"
spec:
  group: example.com
  port: 8080
  names:
    kind: Widget
  versions:
    - name: v1
  empty: null
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_get_str() {
        let doc = doc();
        assert_eq!(get_str(&doc, &["spec", "group"]), Ok("example.com"));
        assert_eq!(get_str(&doc, &["spec", "names", "kind"]), Ok("Widget"));
    }

    #[test]
    fn test_missing_and_null_are_the_same() {
        let doc = doc();
        assert_eq!(
            get_str(&doc, &["spec", "absent"]),
            Err(PathError::Missing {
                path: "spec.absent".to_string()
            })
        );
        assert_eq!(lookup(&doc, &["spec", "empty"]), Ok(None));
        assert_eq!(lookup(&doc, &["spec", "empty", "deeper"]), Ok(None));
    }

    #[test]
    fn test_wrong_type() {
        let doc = doc();
        assert_eq!(
            get_str(&doc, &["spec", "port"]),
            Err(PathError::WrongType {
                path: "spec.port".to_string(),
                expected: "a string",
                found: "integer",
            })
        );
        assert_eq!(
            get_mapping(&doc, &["spec", "group", "x"]).unwrap_err().path(),
            "spec.group"
        );
        assert!(get_sequence(&doc, &["spec", "names"]).is_err());
        assert_eq!(get_sequence(&doc, &["spec", "versions"]).unwrap().len(), 1);
    }

    #[test]
    fn test_optional_mapping() {
        let doc = doc();
        assert!(get_optional_mapping(&doc, &["spec", "absent"]).unwrap().is_none());
        assert!(get_optional_mapping(&doc, &["spec", "empty"]).unwrap().is_none());
        assert!(get_optional_mapping(&doc, &["spec", "names"]).unwrap().is_some());
        assert!(get_optional_mapping(&doc, &["spec", "group"]).is_err());
    }

    #[test]
    fn test_root_path() {
        let scalar = Value::String("x".to_string());
        let err = get_mapping(&scalar, &[]).unwrap_err();
        assert_eq!(err.path(), "<root>");
    }

    #[test]
    fn test_render() {
        let doc = doc();
        assert_eq!(render(lookup(&doc, &["spec", "group"]).unwrap()), "example.com");
        assert_eq!(render(lookup(&doc, &["spec", "port"]).unwrap()), "8080");
        assert_eq!(render(None), "");
        assert_eq!(
            render(lookup(&doc, &["spec", "names"]).unwrap()),
            r#"{"kind":"Widget"}"#
        );
    }
}
