//! CRD types and data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Facts extracted from one CustomResourceDefinition document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrdRecord {
    /// API group (`spec.group`)
    pub group: String,

    /// Resource kind (`spec.names.kind`)
    pub kind: String,

    /// Entries of `spec.versions`, in declaration order
    pub versions: Vec<VersionEntry>,
}

impl CrdRecord {
    /// Origin of the resource group
    pub fn source(&self) -> Source {
        Source::classify(&self.group)
    }
}

/// One entry of `spec.versions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub name: String,

    /// Whether `schema.openAPIV3Schema` is set
    pub has_schema: bool,
}

/// Where a resource group comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "1P")]
    FirstParty,

    #[serde(rename = "OSS")]
    OpenSource,
}

impl Source {
    const FIRST_PARTY_MARKERS: [&'static str; 2] = ["gke", "google"];

    /// Classify a group by case-sensitive substring match on vendor markers
    pub fn classify(group: &str) -> Self {
        if Self::FIRST_PARTY_MARKERS
            .iter()
            .any(|marker| group.contains(marker))
        {
            Source::FirstParty
        } else {
            Source::OpenSource
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Source::FirstParty => "1P",
            Source::OpenSource => "OSS",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
