//! Semantic checks over decoded records.
//!
//! Checks never affect decoding; they only annotate the report. Each issue
//! carries a stable id so tooling can filter on it.

use serde::{Deserialize, Serialize};

use crate::binding::MidiEvent;
use crate::enums::InteractionMode;
use crate::mapping::MappingRecord;

pub const NOTE_RANGE: &str = "TSI-NOTE-RANGE";
pub const LED_ON_INPUT: &str = "TSI-LED-ON-INPUT";
pub const SET_VALUE_MODE: &str = "TSI-SET-VALUE-MODE";
pub const DECK_SCOPE: &str = "TSI-DECK-SCOPE";

const NOTE_MAX: i64 = 127;
/// Deck scopes a four-deck layout can address, plus the device-target marker.
const DECK_SCOPE_RANGE: std::ops::RangeInclusive<i32> = -1..=3;

/// Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// One finding against one record.
///
/// # Examples
/// ```
/// use tsimap_core::{Issue, Severity};
///
/// let issue = Issue {
///     id: "TSI-NOTE-RANGE".to_string(),
///     severity: Severity::Error,
///     record: 0,
///     message: "note number 130 outside 0..=127".to_string(),
/// };
/// assert!(issue.is_blocking());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable identifier (e.g., `TSI-DECK-SCOPE`).
    pub id: String,
    pub severity: Severity,
    /// Index into the report's mapping list.
    pub record: usize,
    pub message: String,
}

impl Issue {
    fn new(id: &str, severity: Severity, record: usize, message: String) -> Self {
        Self {
            id: id.to_string(),
            severity,
            record,
            message,
        }
    }

    /// Errors and warnings fail a strict run; info does not.
    pub fn is_blocking(&self) -> bool {
        self.severity <= Severity::Warning
    }
}

/// Run every check over `records`, in record order.
pub fn check_records(records: &[MappingRecord]) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (index, record) in records.iter().enumerate() {
        check_note_range(index, record, &mut issues);
        check_led_on_input(index, record, &mut issues);
        check_set_value_mode(index, record, &mut issues);
        check_deck_scope(index, record, &mut issues);
    }
    issues
}

fn check_note_range(index: usize, record: &MappingRecord, issues: &mut Vec<Issue>) {
    if record.binding.midi_event != Some(MidiEvent::Note) {
        return;
    }
    if let Some(number) = record.binding.midi_number {
        if !(0..=NOTE_MAX).contains(&number) {
            issues.push(Issue::new(
                NOTE_RANGE,
                Severity::Error,
                index,
                format!("note number {number} outside 0..={NOTE_MAX}"),
            ));
        }
    }
}

fn check_led_on_input(index: usize, record: &MappingRecord, issues: &mut Vec<Issue>) {
    let settings = &record.settings;
    let has_led_floats =
        settings.led_min_controller.is_some() || settings.led_max_controller.is_some();
    if !record.is_output() && has_led_floats && settings.led_min_midi.is_none() {
        issues.push(Issue::new(
            LED_ON_INPUT,
            Severity::Warning,
            index,
            "input mapping carries LED controller values without LED MIDI range".to_string(),
        ));
    }
}

fn check_set_value_mode(index: usize, record: &MappingRecord, issues: &mut Vec<Issue>) {
    let settings = &record.settings;
    let direct = settings
        .interaction_mode
        .is_some_and(|mode| mode.value == Some(InteractionMode::Direct));
    if settings.set_value_to.is_some() && !direct {
        issues.push(Issue::new(
            SET_VALUE_MODE,
            Severity::Info,
            index,
            "set-value present while interaction mode is not DIRECT".to_string(),
        ));
    }
}

fn check_deck_scope(index: usize, record: &MappingRecord, issues: &mut Vec<Issue>) {
    if let Some(scope) = record.settings.deck_scope {
        if !DECK_SCOPE_RANGE.contains(&scope.raw) {
            issues.push(Issue::new(
                DECK_SCOPE,
                Severity::Warning,
                index,
                format!("deck scope {} outside -1..=3", scope.raw),
            ));
        }
    }
}
