//! Text renderings of decoded records: JSON report, CSV table, frame tree.

use std::fmt::{Display, Write as _};

use anyhow::{Context, anyhow};
use csv::WriterBuilder;
use tsimap_core::{CatalogEnum, Coded, FrameNode, Issue, MappingRecord, Report, WalkEvent};

use crate::CliError;

/// Column order of the CSV table.
pub const CSV_COLUMNS: &[&str] = &[
    "device_name",
    "device_target",
    "mapping_type",
    "controller_id",
    "binding_id",
    "binding_name",
    "midi_channel",
    "midi_event",
    "midi_number",
    "midi_note_name",
    "encoder_mode",
    "default_velocity",
    "native_control_id",
    "controller_type",
    "interaction_mode",
    "deck_scope",
    "auto_repeat",
    "invert",
    "soft_takeover",
    "rotary_sensitivity",
    "rotary_acceleration",
    "set_value_to",
    "comment",
    "mod1_id",
    "mod1_value",
    "mod2_id",
    "mod2_value",
    "led_min_controller",
    "led_max_controller",
    "led_min_midi",
    "led_max_midi",
    "led_invert",
    "led_blend",
    "resolution",
];

pub fn serialize_report(report: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

/// One header line, then one line per record; absent fields are empty.
pub fn records_to_csv(records: &[MappingRecord]) -> anyhow::Result<String> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(CSV_COLUMNS)
        .context("failed to write CSV header")?;
    for record in records {
        let mut row = Row::default();
        let binding = &record.binding;
        let settings = &record.settings;

        row.text(Some(&record.device_name));
        row.coded(Some(record.device_target));
        row.coded(Some(record.mapping_type));
        row.value(Some(record.controller_id));
        row.value(Some(record.binding_id));
        row.text(binding.binding_name.as_deref());
        row.value(binding.midi_channel);
        row.text(binding.midi_event.as_ref().map(|event| event.as_str()));
        row.value(binding.midi_number);
        row.text(binding.midi_note_name.as_deref());
        row.coded(binding.encoder_mode);
        row.value(binding.default_velocity);
        row.value(binding.native_control_id);

        row.coded(settings.controller_type);
        row.coded(settings.interaction_mode);
        row.coded(settings.deck_scope);
        row.value(settings.auto_repeat);
        row.value(settings.invert);
        row.value(settings.soft_takeover);
        row.value(settings.rotary_sensitivity);
        row.value(settings.rotary_acceleration);
        row.value(settings.set_value_to);
        row.text(settings.comment.as_deref());
        row.value(settings.mod1_id);
        row.value(settings.mod1_value);
        row.value(settings.mod2_id);
        row.value(settings.mod2_value);
        row.value(settings.led_min_controller);
        row.value(settings.led_max_controller);
        row.value(settings.led_min_midi);
        row.value(settings.led_max_midi);
        row.value(settings.led_invert);
        row.value(settings.led_blend);
        row.coded(settings.resolution);

        wtr.write_record(&row.cells).with_context(|| {
            format!("failed to write CSV row for controller {}", record.controller_id)
        })?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|err| anyhow!("failed to flush CSV: {}", err.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

#[derive(Default)]
struct Row {
    cells: Vec<String>,
}

impl Row {
    fn value<T: Display>(&mut self, value: Option<T>) {
        self.cells
            .push(value.map(|v| v.to_string()).unwrap_or_default());
    }

    fn coded<T>(&mut self, value: Option<Coded<T, T::Raw>>)
    where
        T: CatalogEnum,
        T::Raw: Display,
    {
        self.cells
            .push(value.map(|coded| coded.label()).unwrap_or_default());
    }

    fn text(&mut self, value: Option<&str>) {
        self.cells
            .push(value.map(str::to_string).unwrap_or_default());
    }
}

pub fn format_issues(issues: &[Issue]) -> String {
    let mut out = String::from("Issues:\n");
    for issue in issues {
        let _ = writeln!(
            out,
            "  {} {} record {}: {}",
            issue.severity.as_str(),
            issue.id,
            issue.record,
            issue.message
        );
    }
    out
}

/// Indented frame tree; skipped regions only when `show_skipped`.
pub fn format_frame_tree(events: impl Iterator<Item = WalkEvent>, show_skipped: bool) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            WalkEvent::Frame(node) => write_node(&mut out, &node),
            WalkEvent::Skipped {
                start,
                end,
                bounds_faults,
            } if show_skipped => {
                let _ = writeln!(
                    out,
                    "~ skipped {start}..{end} ({} bytes, {bounds_faults} bounds faults)",
                    end - start
                );
            }
            WalkEvent::Skipped { .. } => {}
        }
    }
    out
}

fn write_node(out: &mut String, node: &FrameNode) {
    let _ = writeln!(
        out,
        "{:indent$}{} @{}..{} payload={} children={}",
        "",
        node.tag,
        node.start,
        node.end,
        node.end - node.payload_start(),
        node.children,
        indent = node.depth * 2
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsimap_core::{BindingInfo, MappingSettings, walk_events};

    fn record() -> MappingRecord {
        MappingRecord {
            device_name: "Pad, Main".to_string(),
            device_name_raw_hex: None,
            device_target: Coded::from_raw(1),
            controller_id: 42,
            binding_id: 5,
            mapping_type: Coded::from_raw(0),
            binding: BindingInfo::default(),
            settings: MappingSettings::default(),
        }
    }

    #[test]
    fn csv_header_matches_columns() {
        let csv = records_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().next(), Some(CSV_COLUMNS.join(",").as_str()));
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn csv_row_has_one_cell_per_column() {
        let mut record = record();
        record.device_name = "Pad".to_string();
        record.settings.interaction_mode = Some(Coded::from_raw(99));
        record.settings.deck_scope = Some(Coded::from_raw(-1));

        let csv = records_to_csv(&[record]).unwrap();
        let row: Vec<&str> = csv.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(row.len(), CSV_COLUMNS.len());
        assert_eq!(row[0], "Pad");
        assert_eq!(row[1], "DECK_A");
        assert_eq!(row[2], "IN");
        assert_eq!(row[3], "42");
        assert_eq!(row[5], "");
        assert_eq!(row[14], "99");
        assert_eq!(row[15], "DEVICE_TARGET_DECK");
    }

    #[test]
    fn csv_quotes_cells_with_separators() {
        let mut record = record();
        record.settings.comment = Some("say \"hi\"".to_string());
        let csv = records_to_csv(&[record]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Pad, Main\",DECK_A,"));
        assert!(row.contains(",\"say \"\"hi\"\"\","));
    }

    #[test]
    fn csv_reads_back_with_csv_reader() {
        let mut record = record();
        record.settings.comment = Some("line one\nline two".to_string());
        let csv = records_to_csv(&[record]).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), CSV_COLUMNS.len());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "Pad, Main");
        assert_eq!(&rows[0][22], "line one\nline two");
    }

    #[test]
    fn pretty_and_compact_conflict() {
        let report = tsimap_core::make_stub_report("controller.tsi", 0);
        assert!(serialize_report(&report, true, true).is_err());
        assert!(!serialize_report(&report, false, false).unwrap().contains('\n'));
    }

    #[test]
    fn frame_tree_indents_by_depth() {
        let mut data = b"DDAT".to_vec();
        data.extend_from_slice(&12u32.to_be_bytes());
        data.extend_from_slice(b"DDIF");
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(&1u32.to_be_bytes());

        let tree = format_frame_tree(walk_events(&data), false);
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[0], "DDAT @0..20 payload=12 children=1");
        assert_eq!(lines[1], "  DDIF @8..20 payload=4 children=0");
    }
}
