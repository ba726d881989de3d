//! CRD (CustomResourceDefinition) stream decoding and field extraction
//!
//! The pipeline is split into independent stages: [`DocumentStream`] frames a
//! buffer into raw documents, [`decode`] turns one document into a
//! [`serde_yaml::Value`] tree plus its [`SchemaCoordinates`], and [`CrdParser`]
//! pulls a [`CrdRecord`] out of the tree using the typed accessors in [`tree`].

pub mod decode;
pub mod parser;
pub mod stream;
pub mod tree;
pub mod types;

pub use decode::{decode, DecodeError, DecodedDocument, SchemaCoordinates};
pub use parser::{CrdParser, ExtractError};
pub use stream::{DocumentFormat, DocumentStream, RawDocument};
pub use tree::PathError;
pub use types::{CrdRecord, Source, VersionEntry};
