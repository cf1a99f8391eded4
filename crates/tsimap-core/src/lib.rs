//! tsimap core library for decoding Traktor controller mappings.
//!
//! Traktor stores controller mappings as a binary blob of nested tagged
//! frames, base64-encoded inside an XML settings file (`.tsi`). This crate
//! turns that blob into flat, serializable mapping records:
//! sources yield the blob, the frame layer discovers frames
//! (layout/reader/header/walker), the mapping layer resolves devices,
//! bindings and settings, and the report layer adds summaries and checks.
//! Decoding is byte-oriented and side-effect free; all I/O is isolated in
//! `source` and `report`.
//!
//! Invariants:
//! - Decoding never fails on malformed bytes; faults degrade to absent fields,
//!   skipped entries or minimal records.
//! - Binding and definition tables are complete before any record resolves
//!   against them.
//! - Report output is deterministic for a given input file.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use tsimap_core::decode_tsi_file;
//!
//! let report = decode_tsi_file(Path::new("controller.tsi"))?;
//! for mapping in &report.mappings {
//!     println!("{} {:?}", mapping.device_name, mapping.binding.binding_name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod binding;
pub mod checks;
pub mod enums;
pub mod frame;
pub mod mapping;
mod report;
pub mod source;

pub use binding::{BindingName, MidiEvent, note_name_to_number, parse_binding_name};
pub use checks::{Issue, Severity, check_records};
pub use enums::{
    CatalogEnum, Coded, ControllerType, DeckScope, DeviceTarget, EncoderMode, InteractionMode,
    MappingType, Resolution,
};
pub use frame::{FrameError, FrameNode, FrameTag, WalkEvent, walk, walk_events};
pub use mapping::{
    BindingInfo, MappingDecoder, MappingRecord, MappingSettings, MidiRangeCheck, NeverAcceptTail,
    OutputTail, TailCheck, decode,
};
pub use report::{DecodeError, decode_source, decode_tsi_file};
pub use source::{
    BlobSource, CONTROLLER_ENTRY_NAME, RawBlobSource, SourceError, TsiFileSource,
    extract_mapping_blob,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the input has no usable modification time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoded mappings of one input file, with summary and checks.
///
/// # Examples
/// ```
/// use tsimap_core::make_stub_report;
///
/// let report = make_stub_report("controller.tsi", 123);
/// assert_eq!(report.report_version, tsimap_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 modification time of the input.
    pub generated_at: String,
    pub input: InputInfo,
    pub summary: DecodeSummary,
    /// Records in device order, then mapping-list order.
    pub mappings: Vec<MappingRecord>,
    /// Check findings in record order.
    pub issues: Vec<Issue>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use tsimap_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "tsimap".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "tsimap");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input file metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input file size in bytes.
    pub bytes: u64,
    /// Size of the extracted mapping blob, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_bytes: Option<u64>,
}

/// Record counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSummary {
    /// Device frames found in the blob, with or without mappings.
    pub devices: u64,
    pub mappings_total: u64,
    pub inputs: u64,
    pub outputs: u64,
}

/// Build a stub report with base fields filled and nothing decoded.
///
/// # Examples
/// ```
/// use tsimap_core::make_stub_report;
///
/// let report = make_stub_report("controller.tsi", 123);
/// assert!(report.mappings.is_empty());
/// assert_eq!(report.input.blob_bytes, None);
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "tsimap".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
            blob_bytes: None,
        },
        summary: DecodeSummary::default(),
        mappings: vec![],
        issues: vec![],
    }
}
