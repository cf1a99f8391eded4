use std::collections::HashMap;

use crate::enums::{Coded, EncoderMode};

use super::layout;

/// Binding name with its undecoded UTF-16 bytes in hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    pub name: String,
    pub raw_hex: String,
}

/// Binding id to name, scoped to one mappings container.
///
/// Later inserts override earlier ones, so several binding lists in one
/// container merge in discovery order.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: HashMap<u32, BindingEntry>,
}

impl BindingTable {
    pub fn insert(&mut self, id: u32, entry: BindingEntry) -> Option<BindingEntry> {
        self.entries.insert(id, entry)
    }

    pub fn get(&self, id: u32) -> Option<&BindingEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-binding MIDI defaults from the device's definition lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiDefinition {
    pub default_velocity: f32,
    pub encoder_mode: Coded<EncoderMode>,
    /// -1 when the producer stored the all-ones sentinel.
    pub control_id: i64,
}

/// Binding name to MIDI definition, scoped to one device.
#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    entries: HashMap<String, MidiDefinition>,
}

impl DefinitionTable {
    pub fn insert(&mut self, name: String, definition: MidiDefinition) -> Option<MidiDefinition> {
        self.entries.insert(name, definition)
    }

    pub fn get(&self, name: &str) -> Option<&MidiDefinition> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn normalize_control_id(raw: u32) -> i64 {
    if raw == layout::NO_CONTROL_ID {
        -1
    } else {
        i64::from(raw)
    }
}
