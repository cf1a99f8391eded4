use serde::{Deserialize, Serialize};

use crate::binding::MidiEvent;
use crate::enums::{
    Coded, ControllerType, DeckScope, DeviceTarget, EncoderMode, InteractionMode, MappingType,
    Resolution,
};

/// One decoded controller mapping.
///
/// Identity fields are always present; everything in [`BindingInfo`] and
/// [`MappingSettings`] may be absent. Both are flattened when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub device_name: String,
    /// UTF-16BE bytes of the device name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name_raw_hex: Option<String>,
    pub device_target: Coded<DeviceTarget>,
    /// Application control the mapping drives.
    pub controller_id: u32,
    pub binding_id: u32,
    pub mapping_type: Coded<MappingType>,
    #[serde(flatten)]
    pub binding: BindingInfo,
    #[serde(flatten)]
    pub settings: MappingSettings,
}

impl MappingRecord {
    pub fn is_output(&self) -> bool {
        self.mapping_type.value == Some(MappingType::Out)
    }
}

/// Binding enrichment resolved through the container and device tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_name_raw_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_channel: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_event: Option<MidiEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_note_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder_mode: Option<Coded<EncoderMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_velocity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_control_id: Option<i64>,
}

/// Fields of the settings frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_type: Option<Coded<ControllerType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_mode: Option<Coded<InteractionMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deck_scope: Option<Coded<DeckScope, i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_repeat: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invert: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_takeover: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotary_sensitivity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotary_acceleration: Option<f32>,
    /// Only kept in DIRECT mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_value_to: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_raw_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod1_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod1_value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod2_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod2_value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_min_controller: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_max_controller: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_min_midi: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_max_midi: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_invert: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_blend: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Coded<Resolution>>,
}

impl MappingSettings {
    /// Whether the OUT-only LED/resolution block was accepted.
    pub fn has_output_tail(&self) -> bool {
        self.led_min_midi.is_some() && self.led_max_midi.is_some()
    }
}
