//! Controller binding identifiers such as `Ch07.CC.064` or `Ch05.Note.C#3`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const CHANNEL_PREFIX: &str = "Ch";
const MIN_SEGMENTS: usize = 3;
const SEMITONES_PER_OCTAVE: i64 = 12;

/// MIDI event family of a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MidiEvent {
    Note,
    Cc,
    /// Any other event, uppercased.
    Other(String),
}

impl MidiEvent {
    fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        match upper.as_str() {
            "NOTE" => MidiEvent::Note,
            "CC" | "CONTROL" => MidiEvent::Cc,
            _ => MidiEvent::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MidiEvent::Note => "NOTE",
            MidiEvent::Cc => "CC",
            MidiEvent::Other(name) => name,
        }
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MidiEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MidiEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(MidiEvent::parse(&raw))
    }
}

/// Parsed binding name. Every part is optional; an unparseable name yields
/// [`BindingName::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingName {
    pub channel: Option<i64>,
    pub event: Option<MidiEvent>,
    pub number: Option<i64>,
    /// Musical note name for NOTE bindings, or the unparsed tail.
    pub note_name: Option<String>,
}

/// Parse `Ch<digits>.<Event>.<Tail>`.
///
/// # Examples
/// ```
/// use tsimap_core::{MidiEvent, parse_binding_name};
///
/// let parsed = parse_binding_name("Ch05.Note.C#3");
/// assert_eq!(parsed.channel, Some(5));
/// assert_eq!(parsed.event, Some(MidiEvent::Note));
/// assert_eq!(parsed.number, Some(49));
/// assert_eq!(parsed.note_name.as_deref(), Some("C#3"));
/// ```
pub fn parse_binding_name(name: &str) -> BindingName {
    if !name.starts_with(CHANNEL_PREFIX) {
        return BindingName::default();
    }
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() < MIN_SEGMENTS {
        return BindingName::default();
    }

    let channel = parse_decimal(&parts[0][CHANNEL_PREFIX.len()..]);
    let event = MidiEvent::parse(parts[1]);
    let tail = parts[2].trim();

    if event == MidiEvent::Note {
        if let Some(number) = note_name_to_number(tail) {
            return BindingName {
                channel,
                event: Some(event),
                number: Some(number),
                note_name: Some(tail.to_string()),
            };
        }
    }

    let number = parse_decimal(tail).or_else(|| parse_hex(tail));
    let note_name = if number.is_none() {
        Some(tail.to_string())
    } else {
        None
    };
    BindingName {
        channel,
        event: Some(event),
        number,
        note_name,
    }
}

/// `[A-Ga-g][#b]?-?digits` to a MIDI note number with C-1 = 0.
///
/// Pitches below zero or beyond the `i64` range are not note names.
pub fn note_name_to_number(text: &str) -> Option<i64> {
    let mut chars = text.chars();
    let natural = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let digits = octave.strip_prefix('-').unwrap_or(octave);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let octave: i64 = octave.parse().ok()?;
    let number = octave
        .checked_add(1)?
        .checked_mul(SEMITONES_PER_OCTAVE)?
        .checked_add(natural + accidental)?;
    (number >= 0).then_some(number)
}

fn parse_decimal(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

fn parse_hex(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    i64::from_str_radix(digits, 16).ok()
}
