//! Where the mapping blob comes from.
//!
//! A Traktor settings file (`.tsi`) is XML; the controller mappings live
//! base64-encoded in the `Value` attribute of one `Entry` element. A raw
//! source reads an already-extracted blob.

mod tsi;

pub use tsi::{CONTROLLER_ENTRY_NAME, RawBlobSource, TsiFileSource, extract_mapping_blob};

use thiserror::Error;

/// Yields the binary blob the mapping decoder consumes.
pub trait BlobSource {
    fn mapping_blob(&mut self) -> Result<Vec<u8>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("invalid base64 in entry value: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("no Entry named {name:?} in settings file")]
    EntryMissing { name: String },
}

impl From<roxmltree::Error> for SourceError {
    fn from(value: roxmltree::Error) -> Self {
        SourceError::Xml(value.to_string())
    }
}
