//! CRD field extraction

use crate::tree::{self, PathError};
use crate::types::{CrdRecord, VersionEntry};
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

/// Structural problems in a CRD document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no spec in document: {0}")]
    MissingSpec(PathError),

    #[error("invalid group: {0}")]
    InvalidGroup(PathError),

    #[error("invalid kind: {0}")]
    InvalidKind(PathError),

    #[error("invalid versions: {0}")]
    InvalidVersions(PathError),

    #[error("spec.versions[{index}] must be a mapping, found {found}")]
    InvalidVersionEntry { index: usize, found: &'static str },

    #[error("spec.versions[{index}]: {source}")]
    InvalidSchemaShape { index: usize, source: PathError },
}

/// Pulls the reported fields out of a decoded CRD document
pub struct CrdParser;

impl Default for CrdParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CrdParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract group, kind and per-version schema presence
    pub fn extract(&self, doc: &Value) -> Result<CrdRecord, ExtractError> {
        tree::get_mapping(doc, &["spec"]).map_err(ExtractError::MissingSpec)?;

        let group = tree::get_str(doc, &["spec", "group"]).map_err(ExtractError::InvalidGroup)?;
        let kind =
            tree::get_str(doc, &["spec", "names", "kind"]).map_err(ExtractError::InvalidKind)?;
        let versions = tree::get_sequence(doc, &["spec", "versions"])
            .map_err(ExtractError::InvalidVersions)?;

        let versions = versions
            .iter()
            .enumerate()
            .map(|(index, version)| self.extract_version(index, version))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Extracted CRD {}/{} with {} versions",
            group,
            kind,
            versions.len()
        );

        Ok(CrdRecord {
            group: group.to_string(),
            kind: kind.to_string(),
            versions,
        })
    }

    fn extract_version(&self, index: usize, version: &Value) -> Result<VersionEntry, ExtractError> {
        let entry = version
            .as_mapping()
            .ok_or(ExtractError::InvalidVersionEntry {
                index,
                found: tree::type_name(version),
            })?;

        let name = tree::render(entry.get("name"));

        let schema = tree::get_optional_mapping(version, &["schema"])
            .map_err(|source| ExtractError::InvalidSchemaShape { index, source })?;
        let has_schema = schema
            .and_then(|schema| schema.get("openAPIV3Schema"))
            .is_some_and(|openapi| !openapi.is_null());

        Ok(VersionEntry { name, has_schema })
    }
}
