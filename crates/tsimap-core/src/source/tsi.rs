use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use super::{BlobSource, SourceError};

/// Entry holding the controller mappings in a settings file.
pub const CONTROLLER_ENTRY_NAME: &str = "DeviceIO.Config.Controller";

const ENTRY_ELEMENT: &str = "Entry";
const NAME_ATTRIBUTE: &str = "Name";
const VALUE_ATTRIBUTE: &str = "Value";

/// Settings-file source: XML wrapper around a base64 blob.
pub struct TsiFileSource {
    text: String,
    entry_name: String,
}

impl TsiFileSource {
    pub fn open(path: &Path, entry_name: &str) -> Result<Self, SourceError> {
        let bytes = fs::read(path)?;
        Ok(Self {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            entry_name: entry_name.to_string(),
        })
    }
}

impl BlobSource for TsiFileSource {
    fn mapping_blob(&mut self) -> Result<Vec<u8>, SourceError> {
        extract_mapping_blob(&self.text, &self.entry_name)
    }
}

/// Source for a blob that was already extracted and decoded.
pub struct RawBlobSource {
    data: Vec<u8>,
}

impl RawBlobSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Ok(Self {
            data: fs::read(path)?,
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl BlobSource for RawBlobSource {
    fn mapping_blob(&mut self) -> Result<Vec<u8>, SourceError> {
        Ok(self.data.clone())
    }
}

/// Find the first `Entry` named `entry_name` and base64-decode its value.
///
/// ASCII whitespace inside the value is ignored. A missing `Value`
/// attribute yields an empty blob.
///
/// # Examples
/// ```
/// use tsimap_core::extract_mapping_blob;
///
/// let xml = r#"<NIXML><Entry Name="DeviceIO.Config.Controller" Value="REVWSQ=="/></NIXML>"#;
/// let blob = extract_mapping_blob(xml, "DeviceIO.Config.Controller").unwrap();
/// assert_eq!(blob, b"DEVI");
/// ```
pub fn extract_mapping_blob(xml_text: &str, entry_name: &str) -> Result<Vec<u8>, SourceError> {
    let document = roxmltree::Document::parse(xml_text)?;
    let entry = document
        .descendants()
        .filter(|node| node.has_tag_name(ENTRY_ELEMENT))
        .find(|node| node.attribute(NAME_ATTRIBUTE) == Some(entry_name))
        .ok_or_else(|| SourceError::EntryMissing {
            name: entry_name.to_string(),
        })?;

    let Some(value) = entry.attribute(VALUE_ATTRIBUTE) else {
        debug!(entry = entry_name, "entry has no value, using empty blob");
        return Ok(Vec::new());
    };
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let blob = STANDARD.decode(cleaned)?;
    debug!(entry = entry_name, bytes = blob.len(), "extracted mapping blob");
    Ok(blob)
}
