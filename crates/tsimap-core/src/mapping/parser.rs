use tracing::{debug, warn};

use crate::binding::parse_binding_name;
use crate::enums::{Coded, DeviceTarget};
use crate::frame::reader::{decode_wide, hex_string};
use crate::frame::{ByteCursor, FrameError, FrameHeader, read_frame_header, walk};

use super::layout;
use super::record::{BindingInfo, MappingRecord, MappingSettings};
use super::settings::{MidiRangeCheck, TailCheck, decode_settings};
use super::tables::{
    BindingEntry, BindingTable, DefinitionTable, MidiDefinition, normalize_control_id,
};

/// Decodes device mapping records from a controller blob.
///
/// # Examples
/// ```
/// use tsimap_core::{MappingDecoder, NeverAcceptTail};
///
/// let records = MappingDecoder::new().decode(&[]);
/// assert!(records.is_empty());
///
/// let strict = MappingDecoder::with_tail_check(NeverAcceptTail);
/// assert!(strict.decode(b"junk").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MappingDecoder<C = MidiRangeCheck> {
    tail_check: C,
}

impl MappingDecoder<MidiRangeCheck> {
    pub fn new() -> Self {
        Self::default()
    }
}

struct DeviceContext<'a> {
    name: &'a str,
    name_raw_hex: &'a str,
    target: Coded<DeviceTarget>,
}

struct MappingHead {
    binding_id: u32,
    mapping_type: u32,
    controller_id: u32,
}

impl<C: TailCheck> MappingDecoder<C> {
    pub fn with_tail_check(tail_check: C) -> Self {
        Self { tail_check }
    }

    /// Decode every device frame found anywhere in `data`.
    ///
    /// Records come out in device order, then mapping-list order. Malformed
    /// pieces are skipped or degraded; decoding itself never fails.
    pub fn decode(&self, data: &[u8]) -> Vec<MappingRecord> {
        let mut records = Vec::new();
        for node in walk(data) {
            if node.tag == layout::DEVICE {
                records.extend(self.decode_device(data, node.payload_start(), node.end));
            }
        }
        records
    }

    fn decode_device(&self, data: &[u8], start: usize, end: usize) -> Vec<MappingRecord> {
        let mut cursor = ByteCursor::with_range(data, start, end);
        let name_bytes = match cursor.read_wide_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(offset = start, %err, "unreadable device name, skipping device");
                return Vec::new();
            }
        };
        let name = decode_wide(name_bytes);
        let name_raw_hex = hex_string(name_bytes);
        debug!(device = %name, offset = start, "decoding device");

        let mut records = Vec::new();
        for child in immediate_children(cursor) {
            if child.tag == layout::DEVICE_DATA {
                records.extend(self.decode_device_data(data, &child, &name, &name_raw_hex));
            }
        }
        records
    }

    fn decode_device_data(
        &self,
        data: &[u8],
        frame: &FrameHeader,
        name: &str,
        name_raw_hex: &str,
    ) -> Vec<MappingRecord> {
        let mut target = Coded::from_raw(0);
        let mut definitions = DefinitionTable::default();
        let mut records = Vec::new();

        for child in immediate_children(payload_cursor(data, frame)) {
            match child.tag {
                layout::TARGET_INFO => match payload_cursor(data, &child).read_u32() {
                    Ok(raw) => target = Coded::from_raw(raw),
                    Err(err) => debug!(offset = child.offset, %err, "unreadable device target"),
                },
                layout::MIDI_DEFINITIONS => read_definitions(data, &child, &mut definitions),
                layout::MAPPINGS_CONTAINER => {
                    let device = DeviceContext {
                        name,
                        name_raw_hex,
                        target,
                    };
                    records.extend(self.decode_container(data, &child, &device, &definitions));
                }
                _ => {}
            }
        }
        records
    }

    /// Build the binding table from every binding list first, then decode
    /// every mapping list against it; producers write the lists in either
    /// order.
    fn decode_container(
        &self,
        data: &[u8],
        frame: &FrameHeader,
        device: &DeviceContext<'_>,
        definitions: &DefinitionTable,
    ) -> Vec<MappingRecord> {
        let children = immediate_children(payload_cursor(data, frame));

        let mut bindings = BindingTable::default();
        for list in children.iter().filter(|c| c.tag == layout::BINDING) {
            read_bindings(data, list, &mut bindings);
        }
        debug!(
            device = %device.name,
            bindings = bindings.len(),
            definitions = definitions.len(),
            "resolved container tables"
        );

        let mut records = Vec::new();
        for list in children.iter().filter(|c| c.tag == layout::MAPPING_LIST) {
            for entry in counted_entries(data, list) {
                if entry.tag != layout::MAPPING_ENTRY {
                    continue;
                }
                if let Some(record) =
                    self.decode_mapping(data, &entry, device, &bindings, definitions)
                {
                    records.push(record);
                }
            }
        }
        records
    }

    fn decode_mapping(
        &self,
        data: &[u8],
        entry: &FrameHeader,
        device: &DeviceContext<'_>,
        bindings: &BindingTable,
        definitions: &DefinitionTable,
    ) -> Option<MappingRecord> {
        let mut cursor = payload_cursor(data, entry);
        let head = match read_mapping_head(&mut cursor) {
            Ok(head) => head,
            Err(err) => {
                warn!(offset = entry.offset, %err, "truncated mapping entry, skipping");
                return None;
            }
        };

        let settings = match read_frame_header(&mut cursor) {
            Ok(frame) if frame.tag == layout::MAPPING_SETTINGS => {
                decode_settings(data, &frame, head.mapping_type, &self.tail_check)
            }
            Ok(frame) => {
                warn!(
                    offset = entry.offset,
                    tag = %frame.tag,
                    "unexpected frame in mapping entry, keeping identity only"
                );
                MappingSettings::default()
            }
            Err(err) => {
                warn!(
                    offset = entry.offset,
                    %err,
                    "missing settings frame, keeping identity only"
                );
                MappingSettings::default()
            }
        };

        Some(MappingRecord {
            device_name: device.name.to_string(),
            device_name_raw_hex: Some(device.name_raw_hex.to_string()),
            device_target: device.target,
            controller_id: head.controller_id,
            binding_id: head.binding_id,
            mapping_type: Coded::from_raw(head.mapping_type),
            binding: enrich(head.binding_id, bindings, definitions),
            settings,
        })
    }
}

fn read_mapping_head(cursor: &mut ByteCursor<'_>) -> Result<MappingHead, FrameError> {
    Ok(MappingHead {
        binding_id: cursor.read_u32()?,
        mapping_type: cursor.read_u32()?,
        controller_id: cursor.read_u32()?,
    })
}

fn enrich(binding_id: u32, bindings: &BindingTable, definitions: &DefinitionTable) -> BindingInfo {
    let Some(entry) = bindings.get(binding_id) else {
        return BindingInfo::default();
    };
    let parsed = parse_binding_name(&entry.name);
    let definition = definitions.get(&entry.name);

    BindingInfo {
        binding_name: Some(entry.name.clone()),
        binding_name_raw_hex: Some(entry.raw_hex.clone()),
        midi_channel: parsed.channel,
        midi_event: parsed.event,
        midi_number: parsed.number,
        midi_note_name: parsed.note_name,
        encoder_mode: definition.map(|d| d.encoder_mode),
        default_velocity: definition.map(|d| d.default_velocity),
        native_control_id: definition.map(|d| d.control_id),
    }
}

/// Merge the inputs and outputs definition lists into `table`.
fn read_definitions(data: &[u8], frame: &FrameHeader, table: &mut DefinitionTable) {
    for list in immediate_children(payload_cursor(data, frame)) {
        if list.tag != layout::MIDI_IN_DEFINITIONS && list.tag != layout::MIDI_OUT_DEFINITIONS {
            continue;
        }
        for entry in counted_entries(data, &list) {
            if entry.tag != layout::MIDI_DEFINITION {
                continue;
            }
            match read_definition(&mut payload_cursor(data, &entry)) {
                Ok((name, definition)) => {
                    table.insert(name, definition);
                }
                Err(err) => debug!(offset = entry.offset, %err, "skipping MIDI definition"),
            }
        }
    }
}

fn read_definition(cursor: &mut ByteCursor<'_>) -> Result<(String, MidiDefinition), FrameError> {
    let name = cursor.read_wide_text()?;
    for _ in 0..layout::DEFINITION_RESERVED_SLOTS {
        cursor.read_u32()?;
    }
    let default_velocity = cursor.read_f32()?;
    let encoder_mode = Coded::from_raw(cursor.read_u32()?);
    let control_id = normalize_control_id(cursor.read_u32()?);
    Ok((
        name,
        MidiDefinition {
            default_velocity,
            encoder_mode,
            control_id,
        },
    ))
}

fn read_bindings(data: &[u8], list: &FrameHeader, table: &mut BindingTable) {
    for entry in counted_entries(data, list) {
        if entry.tag != layout::BINDING {
            continue;
        }
        let mut cursor = payload_cursor(data, &entry);
        let parsed = cursor
            .read_u32()
            .and_then(|id| cursor.read_wide_bytes().map(|bytes| (id, bytes)));
        match parsed {
            Ok((id, bytes)) => {
                table.insert(
                    id,
                    BindingEntry {
                        name: decode_wide(bytes),
                        raw_hex: hex_string(bytes),
                    },
                );
            }
            Err(err) => debug!(offset = entry.offset, %err, "skipping binding entry"),
        }
    }
}

fn payload_cursor<'a>(data: &'a [u8], frame: &FrameHeader) -> ByteCursor<'a> {
    ByteCursor::with_range(data, frame.payload_start, frame.payload_end)
}

/// Sequential headers from the cursor position to its end.
fn immediate_children(mut cursor: ByteCursor<'_>) -> Vec<FrameHeader> {
    let mut children = Vec::new();
    while !cursor.is_at_end() {
        match read_frame_header(&mut cursor) {
            Ok(header) => {
                cursor.seek(header.payload_end);
                children.push(header);
            }
            Err(err) => {
                debug!(%err, "stopping child scan");
                break;
            }
        }
    }
    children
}

/// Entries of a list frame: a u32 count, then that many frames.
fn counted_entries(data: &[u8], list: &FrameHeader) -> Vec<FrameHeader> {
    let mut cursor = payload_cursor(data, list);
    let count = match cursor.read_u32() {
        Ok(count) => count,
        Err(err) => {
            debug!(offset = list.offset, %err, "list without count");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for _ in 0..count {
        match read_frame_header(&mut cursor) {
            Ok(header) => {
                cursor.seek(header.payload_end);
                entries.push(header);
            }
            Err(err) => {
                debug!(
                    offset = list.offset,
                    declared = count,
                    found = entries.len(),
                    %err,
                    "list shorter than declared"
                );
                break;
            }
        }
    }
    entries
}
