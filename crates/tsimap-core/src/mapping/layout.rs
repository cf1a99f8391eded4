use crate::frame::FrameTag;

pub const DEVICE: FrameTag = FrameTag::new(b"DEVI");
pub const DEVICE_DATA: FrameTag = FrameTag::new(b"DDAT");
pub const TARGET_INFO: FrameTag = FrameTag::new(b"DDIF");
pub const MIDI_DEFINITIONS: FrameTag = FrameTag::new(b"DDDC");
pub const MIDI_IN_DEFINITIONS: FrameTag = FrameTag::new(b"DDCI");
pub const MIDI_OUT_DEFINITIONS: FrameTag = FrameTag::new(b"DDCO");
pub const MIDI_DEFINITION: FrameTag = FrameTag::new(b"DCDT");
pub const MAPPINGS_CONTAINER: FrameTag = FrameTag::new(b"DDCB");
/// Used both for the binding list and for each entry inside it.
pub const BINDING: FrameTag = FrameTag::new(b"DCBM");
pub const MAPPING_LIST: FrameTag = FrameTag::new(b"CMAS");
pub const MAPPING_ENTRY: FrameTag = FrameTag::new(b"CMAI");
pub const MAPPING_SETTINGS: FrameTag = FrameTag::new(b"CMAD");

/// Reserved u32 slots between the definition name and its default velocity.
pub const DEFINITION_RESERVED_SLOTS: usize = 2;

/// Size of the OUT-only LED/resolution block at the end of a settings frame.
pub const OUTPUT_TAIL_LEN: usize = 40;
pub const MIDI_VALUE_MAX: u32 = 127;

/// Trailing floats with a smaller magnitude are treated as unset.
pub const FLOAT_EPSILON: f32 = 1e-20;

/// All-ones native control id.
pub const NO_CONTROL_ID: u32 = 0xFFFF_FFFF;
