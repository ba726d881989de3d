//! krm-linter library
//!
//! Reports, for every version of every CustomResourceDefinition in a YAML or
//! JSON stream, its group, kind, origin and whether it carries an OpenAPI v3
//! validation schema.

pub mod cli;
pub mod report;

pub use krm_crd::{
    CrdParser, CrdRecord, DecodeError, DocumentStream, ExtractError, RawDocument,
    SchemaCoordinates, Source, VersionEntry,
};
pub use report::{ReportRow, ReportWriter};

use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const CRD_KIND: &str = "CustomResourceDefinition";

/// Settings for one run of the linter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    /// File holding one or more CRD documents
    pub input: PathBuf,
}

impl LintConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Read the whole input file
    pub async fn read_input(&self) -> LintResult<Vec<u8>> {
        tokio::fs::read(&self.input)
            .await
            .map_err(|source| LintError::Read {
                path: self.input.clone(),
                source,
            })
    }
}

/// What was learned from a single document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    /// Zero-based position of the document in the stream
    pub index: usize,

    /// Line on which the document starts
    pub line: usize,

    pub coordinates: SchemaCoordinates,
    pub record: CrdRecord,
}

impl DocumentReport {
    pub fn rows(&self) -> Vec<ReportRow> {
        ReportRow::from_record(&self.record, &self.coordinates)
    }
}

/// Totals for a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintSummary {
    pub documents: usize,
    pub rows: usize,
}

/// Drives documents through decoding and extraction.
///
/// Iterating a `Linter` yields one result per document, so callers decide
/// whether to stop at the first failure; [`Linter::run`] stops.
pub struct Linter<'a> {
    stream: DocumentStream<'a>,
    parser: CrdParser,
}

impl<'a> Linter<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            stream: DocumentStream::new(input),
            parser: CrdParser::new(),
        }
    }

    /// Start again from the first document
    pub fn rewind(&mut self) {
        self.stream.rewind();
    }

    fn process(&self, doc: RawDocument<'_>) -> LintResult<DocumentReport> {
        let decoded = krm_crd::decode(&doc).map_err(|source| LintError::Decode {
            line: doc.line,
            source,
        })?;

        let coordinates = decoded.coordinates;
        if coordinates.kind != CRD_KIND {
            debug!(
                "Document at line {} is a {}, not a {}",
                doc.line, coordinates.kind, CRD_KIND
            );
        }
        if coordinates.is_deprecated_crd_api() {
            warn!(
                "Document at line {} uses the deprecated {} API",
                doc.line, coordinates.api_version
            );
        }

        let record = self
            .parser
            .extract(&decoded.tree)
            .map_err(|source| LintError::Extract {
                line: doc.line,
                source,
            })?;

        Ok(DocumentReport {
            index: doc.index,
            line: doc.line,
            coordinates,
            record,
        })
    }

    /// Write rows for every document, aborting on the first error.
    ///
    /// Rows of documents processed before the failure stay written.
    pub fn run<W: Write>(self, writer: &mut ReportWriter<W>) -> LintResult<LintSummary> {
        let mut summary = LintSummary::default();

        for report in self {
            let rows = report?.rows();
            writer.write_rows(&rows)?;

            summary.documents += 1;
            summary.rows += rows.len();
        }

        info!(
            "Reported {} versions across {} CRDs",
            summary.rows, summary.documents
        );
        Ok(summary)
    }
}

impl Iterator for Linter<'_> {
    type Item = LintResult<DocumentReport>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match self.stream.next()? {
            Ok(doc) => self.process(doc),
            Err(source) => Err(LintError::Stream(source)),
        };
        Some(result)
    }
}

/// Application error types
#[derive(thiserror::Error, Debug)]
pub enum LintError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed document stream")]
    Stream(#[source] DecodeError),

    #[error("failed to decode document at line {line}")]
    Decode { line: usize, source: DecodeError },

    #[error("malformed CRD in document at line {line}")]
    Extract { line: usize, source: ExtractError },

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for the main application
pub type LintResult<T> = Result<T, LintError>;
