//! Controller mapping decode.
//!
//! A device frame carries a wide-text name and one or more device-data
//! frames. Each device-data frame holds an optional target-info frame, the
//! MIDI definition lists and a mappings container. The container holds
//! binding lists (id to binding name) and mapping lists; each mapping entry
//! has a fixed head and one settings frame.
//! - `layout`: tags and fixed sizes
//! - `tables`: per-container and per-device lookup tables
//! - `settings`: settings frame and the optional OUT tail
//! - `parser`: device, container and mapping traversal
//! - `record`: decoded output

pub mod layout;
pub mod parser;
pub mod record;
pub mod settings;
pub mod tables;

pub use parser::MappingDecoder;
pub use record::{BindingInfo, MappingRecord, MappingSettings};
pub use settings::{MidiRangeCheck, NeverAcceptTail, OutputTail, TailCheck, decode_settings};
pub use tables::{BindingEntry, BindingTable, DefinitionTable, MidiDefinition};

/// Decode all mapping records in `data` with the default tail check.
pub fn decode(data: &[u8]) -> Vec<MappingRecord> {
    MappingDecoder::new().decode(data)
}
