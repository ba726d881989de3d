//! Decoding of framed documents into attribute trees

use crate::stream::{DocumentFormat, RawDocument};
use crate::tree;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// API group that serves CustomResourceDefinition objects
pub const CRD_API_GROUP: &str = "apiextensions.k8s.io";

/// Errors raised while framing or decoding a document
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document must be a mapping, found {found}")]
    NotAnObject { found: &'static str },

    #[error("document has no '{field}' (expected a non-empty string)")]
    MissingCoordinate { field: &'static str },
}

/// The declared identity of a document (`apiVersion` and `kind`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCoordinates {
    /// `apiVersion` exactly as written in the document
    pub api_version: String,

    pub kind: String,
}

impl SchemaCoordinates {
    /// Read `apiVersion` and `kind` from the top level of a document
    pub fn from_tree(root: &Value) -> Result<Self, DecodeError> {
        let field = |name: &'static str| match tree::get_str(root, &[name]) {
            Ok(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(DecodeError::MissingCoordinate { field: name }),
        };

        Ok(Self {
            api_version: field("apiVersion")?,
            kind: field("kind")?,
        })
    }

    /// API group part of `apiVersion` (empty for the core group)
    pub fn group(&self) -> &str {
        self.api_version
            .rsplit_once('/')
            .map_or("", |(group, _)| group)
    }

    /// Version part of `apiVersion`
    pub fn version(&self) -> &str {
        self.api_version
            .rsplit_once('/')
            .map_or(self.api_version.as_str(), |(_, version)| version)
    }

    /// Whether this is a CRD served through the removed `v1beta1` API
    pub fn is_deprecated_crd_api(&self) -> bool {
        self.group() == CRD_API_GROUP && self.version() == "v1beta1"
    }
}

impl fmt::Display for SchemaCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version, self.kind)
    }
}

/// A document turned into a generic tree, along with its coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDocument {
    pub tree: Value,
    pub coordinates: SchemaCoordinates,
}

/// Decode one framed document.
///
/// YAML documents go through `serde_yaml`; JSON documents are read with
/// `serde_json` straight into the same tree type, so callers never need to
/// know which syntax the input used.
pub fn decode(doc: &RawDocument<'_>) -> Result<DecodedDocument, DecodeError> {
    let root: Value = match doc.format {
        DocumentFormat::Yaml => serde_yaml::from_slice(doc.bytes)?,
        DocumentFormat::Json => serde_json::from_slice(doc.bytes)?,
    };

    if !root.is_mapping() {
        return Err(DecodeError::NotAnObject {
            found: tree::type_name(&root),
        });
    }

    let coordinates = SchemaCoordinates::from_tree(&root)?;
    debug!(
        "Decoded document {} at line {} as {}",
        doc.index, doc.line, coordinates
    );

    Ok(DecodedDocument {
        tree: root,
        coordinates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::DocumentStream;

    fn decode_str(input: &str) -> Result<DecodedDocument, DecodeError> {
        let doc = DocumentStream::new(input.as_bytes())
            .next()
            .expect("input holds a document")?;
        decode(&doc)
    }

    #[test]
    fn test_yaml_document() {
        let decoded = decode_str(
            r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
spec:
  group: example.com
"#,
        )
        .unwrap();

        assert_eq!(decoded.coordinates.api_version, "apiextensions.k8s.io/v1");
        assert_eq!(decoded.coordinates.kind, "CustomResourceDefinition");
        assert_eq!(
            decoded.tree["spec"]["group"],
            Value::String("example.com".to_string())
        );
    }

    #[test]
    fn test_json_document_yields_same_tree_as_yaml() {
        let json = decode_str(
            r#"{"apiVersion": "apiextensions.k8s.io/v1beta1", "kind": "CustomResourceDefinition", "spec": {"versions": [{"name": "v1"}]}}"#,
        )
        .unwrap();
        let yaml = decode_str(
            "apiVersion: apiextensions.k8s.io/v1beta1\nkind: CustomResourceDefinition\nspec:\n  versions:\n    - name: v1\n",
        )
        .unwrap();

        assert_eq!(json, yaml);
        assert!(json.coordinates.is_deprecated_crd_api());
    }

    #[test]
    fn test_api_version_is_kept_verbatim() {
        let decoded = decode_str("apiVersion: Example.COM/V1Beta1\nkind: Thing\n").unwrap();
        assert_eq!(decoded.coordinates.api_version, "Example.COM/V1Beta1");
        assert_eq!(decoded.coordinates.group(), "Example.COM");
        assert_eq!(decoded.coordinates.version(), "V1Beta1");
        assert!(!decoded.coordinates.is_deprecated_crd_api());
    }

    #[test]
    fn test_core_group_coordinates() {
        let decoded = decode_str("apiVersion: v1\nkind: ConfigMap\n").unwrap();
        assert_eq!(decoded.coordinates.group(), "");
        assert_eq!(decoded.coordinates.version(), "v1");
    }

    #[test]
    fn test_missing_coordinates() {
        let err = decode_str("kind: CustomResourceDefinition\n").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingCoordinate { field: "apiVersion" }
        ));

        let err = decode_str("apiVersion: apiextensions.k8s.io/v1\nkind: ''\n").unwrap_err();
        assert!(matches!(err, DecodeError::MissingCoordinate { field: "kind" }));

        let err = decode_str("apiVersion: 1\nkind: Thing\n").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingCoordinate { field: "apiVersion" }
        ));
    }

    #[test]
    fn test_non_mapping_document() {
        let err = decode_str("- a\n- b\n").unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { found: "sequence" }));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = decode_str("apiVersion: [unclosed\n").unwrap_err();
        assert!(matches!(err, DecodeError::Yaml(_)));
    }
}
