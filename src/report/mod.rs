//! Report rows and the writer that emits them

use krm_crd::{CrdRecord, SchemaCoordinates, Source};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// One line of the report: a single version of a single CRD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub source: Source,

    /// `apiVersion` of the CustomResourceDefinition object itself
    pub crd_api_version: String,

    pub has_schema: bool,
}

impl ReportRow {
    /// Fan a record out into one row per declared version, in order
    pub fn from_record(record: &CrdRecord, coordinates: &SchemaCoordinates) -> Vec<ReportRow> {
        let source = record.source();
        record
            .versions
            .iter()
            .map(|version| ReportRow {
                group: record.group.clone(),
                version: version.name.clone(),
                kind: record.kind.clone(),
                source,
                crd_api_version: coordinates.api_version.clone(),
                has_schema: version.has_schema,
            })
            .collect()
    }
}

impl fmt::Display for ReportRow {
    // group, version, kind, source, two empty placeholder columns, apiVersion, schema
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {},,, {}, {}",
            self.group, self.version, self.kind, self.source, self.crd_api_version, self.has_schema
        )
    }
}

/// Writes rows to a sink, one per line, in the order they are given
pub struct ReportWriter<W: Write> {
    out: W,
    rows: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, rows: 0 }
    }

    pub fn write_row(&mut self, row: &ReportRow) -> io::Result<()> {
        writeln!(self.out, "{row}")?;
        self.rows += 1;
        Ok(())
    }

    /// Write every row, then flush so they reach the sink before the next document
    pub fn write_rows(&mut self, rows: &[ReportRow]) -> io::Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        self.out.flush()
    }

    /// Number of rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krm_crd::VersionEntry;
    use rstest::rstest;

    fn record(group: &str) -> CrdRecord {
        CrdRecord {
            group: group.to_string(),
            kind: "Widget".to_string(),
            versions: vec![
                VersionEntry {
                    name: "v1".to_string(),
                    has_schema: true,
                },
                VersionEntry {
                    name: "v1alpha1".to_string(),
                    has_schema: false,
                },
            ],
        }
    }

    fn coordinates() -> SchemaCoordinates {
        SchemaCoordinates {
            api_version: "apiextensions.k8s.io/v1".to_string(),
            kind: "CustomResourceDefinition".to_string(),
        }
    }

    #[test]
    fn test_rows_follow_version_order() {
        let rows = ReportRow::from_record(&record("example.com"), &coordinates());
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].to_string(),
            "example.com, v1, Widget, OSS,,, apiextensions.k8s.io/v1, true"
        );
        assert_eq!(
            rows[1].to_string(),
            "example.com, v1alpha1, Widget, OSS,,, apiextensions.k8s.io/v1, false"
        );
    }

    #[rstest]
    #[case("example.com", "OSS")]
    #[case("gke.example.com", "1P")]
    #[case("storage.googleapis.com", "1P")]
    #[case("Google.example.com", "OSS")]
    fn test_source_column(#[case] group: &str, #[case] label: &str) {
        let rows = ReportRow::from_record(&record(group), &coordinates());
        for row in &rows {
            let line = row.to_string();
            let columns: Vec<_> = line.split(", ").collect();
            assert_eq!(columns[0], group);
            assert_eq!(columns[3], format!("{label},,"));
        }
    }

    #[test]
    fn test_no_versions_no_rows() {
        let mut empty = record("example.com");
        empty.versions.clear();
        assert!(ReportRow::from_record(&empty, &coordinates()).is_empty());
    }

    #[test]
    fn test_writer_emits_one_line_per_row() {
        let rows = ReportRow::from_record(&record("example.com"), &coordinates());
        let mut writer = ReportWriter::new(Vec::new());
        writer.write_rows(&rows).unwrap();
        writer.write_rows(&rows[..1]).unwrap();

        assert_eq!(writer.rows_written(), 3);
        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], lines[2]);
        assert!(output.ends_with('\n'));
    }
}
