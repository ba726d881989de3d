//! Framing of multi-document YAML and JSON streams
//!
//! A [`DocumentStream`] walks a byte buffer and hands out one [`RawDocument`]
//! per document without looking at what the document contains. The framing
//! is picked once per buffer: if the first meaningful byte is `{` the whole
//! buffer is treated as a sequence of concatenated JSON values, otherwise it
//! is split on YAML `---` separator lines.

use crate::decode::DecodeError;
use serde::de::IgnoredAny;

const SEPARATOR: &[u8] = b"---";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Syntax a document was framed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

/// One document's bytes, exactly as they appear in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDocument<'a> {
    pub bytes: &'a [u8],
    pub format: DocumentFormat,

    /// Zero-based position among the non-empty documents of the stream
    pub index: usize,

    /// One-based line of the input on which the document starts
    pub line: usize,
}

/// Lazy iterator over the documents of a buffer.
///
/// Yields `None` at end of stream and `Some(Err(_))` when the framing itself
/// is broken; after an error the stream stays finished until [`rewind`] is
/// called.
///
/// [`rewind`]: DocumentStream::rewind
#[derive(Debug, Clone)]
pub struct DocumentStream<'a> {
    buf: &'a [u8],
    format: DocumentFormat,
    start: usize,
    pos: usize,
    line: usize,
    index: usize,
    failed: bool,
}

impl<'a> DocumentStream<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        let start = if buf.starts_with(UTF8_BOM) {
            UTF8_BOM.len()
        } else {
            0
        };

        let format = match buf[start..].iter().find(|b| !b.is_ascii_whitespace()) {
            Some(&b'{') => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        };

        Self {
            buf,
            format,
            start,
            pos: start,
            line: 1,
            index: 0,
            failed: false,
        }
    }

    /// Framing selected for this buffer
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Restart iteration from the first document
    pub fn rewind(&mut self) {
        self.pos = self.start;
        self.line = 1;
        self.index = 0;
        self.failed = false;
    }

    fn emit(&mut self, bytes: &'a [u8], line: usize) -> RawDocument<'a> {
        let doc = RawDocument {
            bytes,
            format: self.format,
            index: self.index,
            line,
        };
        self.index += 1;
        doc
    }

    fn fail(&mut self, line: usize, message: impl Into<String>) -> DecodeError {
        self.failed = true;
        DecodeError::Syntax {
            line,
            message: message.into(),
        }
    }

    fn next_yaml(&mut self) -> Option<Result<RawDocument<'a>, DecodeError>> {
        let buf = self.buf;
        while self.pos < buf.len() {
            let doc_start = self.pos;
            let doc_line = self.line;
            let mut doc_end = buf.len();

            while self.pos < buf.len() {
                let line_start = self.pos;
                let line_no = self.line;
                let line_end = buf[line_start..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(buf.len(), |i| line_start + i + 1);

                self.pos = line_end;
                self.line += 1;

                let line = &buf[line_start..line_end];
                if let Some(trailing) = line.strip_prefix(SEPARATOR) {
                    let trailing = trailing.trim_ascii();
                    if !trailing.is_empty() && !trailing.starts_with(b"#") {
                        return Some(Err(self.fail(
                            line_no,
                            "only a comment may follow the '---' document separator",
                        )));
                    }
                    doc_end = line_start;
                    break;
                }
            }

            let bytes = &buf[doc_start..doc_end];
            if !is_blank(bytes) {
                return Some(Ok(self.emit(bytes, doc_line)));
            }
        }

        None
    }

    fn next_json(&mut self) -> Option<Result<RawDocument<'a>, DecodeError>> {
        let buf = self.buf;
        let rest = &buf[self.pos..];
        let mut values = serde_json::Deserializer::from_slice(rest).into_iter::<IgnoredAny>();

        match values.next()? {
            Ok(_) => {
                let raw = &rest[..values.byte_offset()];
                let leading = raw.len() - raw.trim_ascii_start().len();
                let line = self.line + count_lines(&raw[..leading]);

                self.pos += raw.len();
                self.line += count_lines(raw);

                Some(Ok(self.emit(&raw[leading..], line)))
            }
            Err(e) => {
                let line = self.line + e.line().saturating_sub(1);
                Some(Err(self.fail(line, e.to_string())))
            }
        }
    }
}

impl<'a> Iterator for DocumentStream<'a> {
    type Item = Result<RawDocument<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.format {
            DocumentFormat::Yaml => self.next_yaml(),
            DocumentFormat::Json => self.next_json(),
        }
    }
}

/// True when a chunk holds nothing but whitespace and comments
fn is_blank(bytes: &[u8]) -> bool {
    bytes.split(|&b| b == b'\n').all(|line| {
        let line = line.trim_ascii();
        line.is_empty() || line.starts_with(b"#")
    })
}

fn count_lines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}
