use tracing::debug;

use crate::enums::{CatalogEnum, Coded, InteractionMode, MappingType};
use crate::frame::reader::{decode_wide, hex_string};
use crate::frame::{ByteCursor, FrameError, FrameHeader};

use super::layout;
use super::record::MappingSettings;

/// The OUT-only LED/resolution block as read, before acceptance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputTail {
    pub led_min_controller: f32,
    pub led_max_controller: f32,
    pub led_min_midi: u32,
    pub led_max_midi: u32,
    pub led_invert: u32,
    pub led_blend: u32,
    pub resolution: u32,
}

impl OutputTail {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, FrameError> {
        let led_min_controller = cursor.read_f32()?;
        cursor.read_u32()?;
        let led_max_controller = cursor.read_f32()?;
        let led_min_midi = cursor.read_u32()?;
        let led_max_midi = cursor.read_u32()?;
        let led_invert = cursor.read_u32()?;
        let led_blend = cursor.read_u32()?;
        cursor.read_u32()?;
        let resolution = cursor.read_u32()?;
        cursor.read_u32()?;
        Ok(Self {
            led_min_controller,
            led_max_controller,
            led_min_midi,
            led_max_midi,
            led_invert,
            led_blend,
            resolution,
        })
    }
}

/// Decides whether a candidate OUT tail belongs to the settings layout.
///
/// The tail has no version marker, so acceptance is a heuristic. Implement
/// this to replace it.
pub trait TailCheck {
    /// `ends_at_frame_end` is true when the tail consumed the settings frame
    /// exactly.
    fn accept(&self, tail: &OutputTail, ends_at_frame_end: bool) -> bool;
}

/// Default check: the tail must end the frame and both LED MIDI bounds must
/// be valid 7-bit values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidiRangeCheck;

impl TailCheck for MidiRangeCheck {
    fn accept(&self, tail: &OutputTail, ends_at_frame_end: bool) -> bool {
        ends_at_frame_end
            && tail.led_min_midi <= layout::MIDI_VALUE_MAX
            && tail.led_max_midi <= layout::MIDI_VALUE_MAX
    }
}

/// Never accepts a tail; LED and resolution fields stay absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAcceptTail;

impl TailCheck for NeverAcceptTail {
    fn accept(&self, _tail: &OutputTail, _ends_at_frame_end: bool) -> bool {
        false
    }
}

/// Reads optional fields: a short read yields `None` without advancing.
struct FieldReader<'a> {
    cursor: ByteCursor<'a>,
}

impl FieldReader<'_> {
    fn u32(&mut self) -> Option<u32> {
        self.cursor.read_u32().ok()
    }

    fn f32(&mut self) -> Option<f32> {
        self.cursor.read_f32().ok()
    }

    fn skip(&mut self, slots: usize) {
        for _ in 0..slots {
            let _ = self.cursor.read_u32();
        }
    }

    /// On an overlong text the rest of the frame is treated as consumed.
    fn wide_bytes(&mut self) -> Option<Vec<u8>> {
        match self.cursor.read_wide_bytes() {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(_) => {
                self.cursor.seek(self.cursor.end());
                None
            }
        }
    }
}

/// Decode a settings frame for a mapping of the given raw direction.
pub fn decode_settings<C: TailCheck>(
    data: &[u8],
    frame: &FrameHeader,
    mapping_type_raw: u32,
    tail_check: &C,
) -> MappingSettings {
    let mut fields = FieldReader {
        cursor: ByteCursor::with_range(data, frame.payload_start, frame.payload_end),
    };

    fields.skip(1);
    let controller_type = fields.u32().map(Coded::from_raw);
    let interaction_raw = fields.u32();
    let deck_scope = fields.u32().map(|raw| Coded::from_raw(raw as i32));
    let auto_repeat = fields.u32();
    let invert = fields.u32();
    let soft_takeover = fields.u32();
    let rotary_sensitivity = fields.f32();
    let rotary_acceleration = fields.f32();
    fields.skip(2);
    let set_value_to = fields.f32();
    let comment_bytes = fields.wide_bytes().filter(|bytes| !bytes.is_empty());
    let mod1_id = fields.u32();
    fields.skip(1);
    let mod1_value = fields.u32();
    let mod2_id = fields.u32();
    fields.skip(1);
    let mod2_value = fields.u32();
    fields.skip(1);

    // The slot carries unrelated data outside DIRECT mode.
    let set_value_to = if interaction_raw == Some(InteractionMode::Direct.raw()) {
        set_value_to
    } else {
        None
    };

    let mut settings = MappingSettings {
        controller_type,
        interaction_mode: interaction_raw.map(Coded::from_raw),
        deck_scope,
        auto_repeat,
        invert,
        soft_takeover,
        rotary_sensitivity,
        rotary_acceleration,
        set_value_to,
        comment: comment_bytes.as_deref().map(decode_wide),
        comment_raw_hex: comment_bytes.as_deref().map(hex_string),
        mod1_id,
        mod1_value,
        mod2_id,
        mod2_value,
        ..MappingSettings::default()
    };

    if mapping_type_raw == MappingType::Out.raw() {
        if let Some(tail) = read_output_tail(&mut fields.cursor, tail_check) {
            settings.led_min_controller = sanitize_float(tail.led_min_controller);
            settings.led_max_controller = sanitize_float(tail.led_max_controller);
            settings.led_min_midi = Some(tail.led_min_midi);
            settings.led_max_midi = Some(tail.led_max_midi);
            settings.led_invert = Some(tail.led_invert);
            settings.led_blend = Some(tail.led_blend);
            settings.resolution = Some(Coded::from_raw(tail.resolution));
        }
    }

    settings
}

/// Try the tail on a copy of the cursor; commit only when accepted.
fn read_output_tail<C: TailCheck>(
    cursor: &mut ByteCursor<'_>,
    tail_check: &C,
) -> Option<OutputTail> {
    if cursor.remaining() < layout::OUTPUT_TAIL_LEN {
        return None;
    }
    let mut probe = cursor.clone();
    let tail = OutputTail::read(&mut probe).ok()?;
    if !tail_check.accept(&tail, probe.is_at_end()) {
        debug!(
            offset = cursor.position(),
            trailing = cursor.remaining(),
            led_min_midi = tail.led_min_midi,
            led_max_midi = tail.led_max_midi,
            "rejected output tail"
        );
        return None;
    }
    *cursor = probe;
    Some(tail)
}

/// NaN and near-zero bit patterns are unset slots.
fn sanitize_float(value: f32) -> Option<f32> {
    if value.is_nan() || value.abs() < layout::FLOAT_EPSILON {
        None
    } else {
        Some(value)
    }
}
