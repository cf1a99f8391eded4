use std::path::{Path, PathBuf};

use assert_cmd::Command;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("tsimap"))
}

fn be32(value: u32) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

fn wide(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut out = be32(units.len() as u32);
    for unit in units {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

fn frame(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend(be32(payload.len() as u32));
    out.extend_from_slice(payload);
    out
}

fn list(tag: &[u8; 4], entries: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = be32(entries.len() as u32);
    payload.extend(entries.concat());
    frame(tag, &payload)
}

fn settings(interaction_mode: u32, deck_scope: u32) -> Vec<u8> {
    let mut out = be32(0);
    out.extend(be32(1));
    out.extend(be32(interaction_mode));
    out.extend(be32(deck_scope));
    out.extend([0u8; 32]);
    out.extend(wide("Main"));
    out.extend([0u8; 28]);
    frame(b"CMAD", &out)
}

fn mapping(binding_id: u32, controller_id: u32, settings: Vec<u8>) -> Vec<u8> {
    let mut payload = be32(binding_id);
    payload.extend(be32(0));
    payload.extend(be32(controller_id));
    payload.extend(settings);
    frame(b"CMAI", &payload)
}

fn binding(id: u32, name: &str) -> Vec<u8> {
    let mut payload = be32(id);
    payload.extend(wide(name));
    frame(b"DCBM", &payload)
}

/// One device with a clean CC mapping and, optionally, an out-of-range note.
fn blob(with_bad_note: bool) -> Vec<u8> {
    let mut bindings = vec![binding(5, "Ch01.CC.010")];
    let mut mappings = vec![mapping(5, 42, settings(3, 0xFFFF_FFFF))];
    if with_bad_note {
        bindings.push(binding(6, "Ch02.Note.130"));
        mappings.push(mapping(6, 43, settings(2, 0)));
    }
    let container = frame(
        b"DDCB",
        &[list(b"DCBM", &bindings), list(b"CMAS", &mappings)].concat(),
    );
    let mut device = wide("Pad, Main");
    device.extend(frame(b"DDAT", &[frame(b"DDIF", &be32(1)), container].concat()));
    frame(b"DEVI", &device)
}

fn write_tsi(dir: &Path, name: &str, blob: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>\n<NIXML><TraktorSettings>\n<Entry Name=\"DeviceIO.Config.Controller\" Type=\"3\" Value=\"{}\"></Entry>\n</TraktorSettings></NIXML>\n",
        STANDARD.encode(blob)
    );
    std::fs::write(&path, xml).expect("write tsi");
    path
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_supports_dump_and_decode() {
    cmd().args(["tsi", "dump", "--help"]).assert().success();
    cmd().args(["tsi", "decode", "--help"]).assert().success();
    cmd().args(["tsi", "frames", "--help"]).assert().success();
}

#[test]
fn version_includes_build_metadata() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")).and(contains("(")));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.tsi");

    cmd()
        .args(["tsi", "dump"])
        .arg(missing)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn non_tsi_input_is_rejected_without_raw() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("controller.bin");
    std::fs::write(&input, blob(false)).expect("write blob");

    cmd()
        .args(["tsi", "dump"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("unsupported input format").and(contains("--raw")));

    let assert = cmd()
        .args(["tsi", "dump", "--raw"])
        .arg(&input)
        .assert()
        .success();
    assert_eq!(stdout_json(&assert)["summary"]["mappings_total"], 1);
}

#[test]
fn dump_writes_json_to_stdout() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(false));

    let assert = cmd()
        .args(["tsi", "dump"])
        .arg(input)
        .arg("--stdout")
        .assert()
        .success();
    let report = stdout_json(&assert);
    let mapping = &report["mappings"][0];
    assert_eq!(report["tool"]["name"], "tsimap");
    assert_eq!(mapping["device_name"], "Pad, Main");
    assert_eq!(mapping["binding_name"], "Ch01.CC.010");
    assert_eq!(mapping["midi_event"], "CC");
    assert_eq!(mapping["midi_number"], 10);
    assert_eq!(mapping["deck_scope"]["raw"], -1);
    assert_eq!(mapping["interaction_mode"]["value"], "DIRECT");
    assert_eq!(mapping["comment"], "Main");
}

#[test]
fn glob_input_resolves_single_file() {
    let temp = TempDir::new().expect("tempdir");
    write_tsi(temp.path(), "Traktor.tsi", &blob(false));
    let pattern = temp.path().join("*.tsi");

    cmd().args(["tsi", "dump"]).arg(&pattern).assert().success();

    write_tsi(temp.path(), "Backup.tsi", &blob(false));
    cmd()
        .args(["tsi", "dump"])
        .arg(&pattern)
        .assert()
        .failure()
        .stderr(contains("multiple files match pattern"));
}

#[test]
fn report_and_csv_are_written() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(false));
    let report = temp.path().join("out").join("report.json");
    let csv = temp.path().join("out").join("mappings.csv");

    cmd()
        .args(["tsi", "dump"])
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--csv")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicates::str::is_empty())
        .stderr(contains("OK: report written").and(contains("OK: csv written")));

    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("read report"))
            .expect("report json");
    assert_eq!(json["summary"]["devices"], 1);

    let table = std::fs::read_to_string(&csv).expect("read csv");
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("device_name,device_target,mapping_type,"));
    assert!(lines[1].starts_with("\"Pad, Main\",DECK_A,IN,42,5,Ch01.CC.010,1,CC,10,"));
}

#[test]
fn report_path_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(false));

    cmd()
        .args(["tsi", "dump"])
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("must differ from input"));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(false));

    cmd()
        .args(["tsi", "dump"])
        .arg(input)
        .arg("--stdout")
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(false));

    cmd()
        .args(["tsi", "dump"])
        .arg(input)
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(false));

    cmd()
        .args(["tsi", "dump"])
        .arg(input)
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn list_issues_outputs_ids() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(true));

    cmd()
        .args(["tsi", "dump"])
        .arg(input)
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .arg("--list-issues")
        .assert()
        .success()
        .stderr(contains("Issues:").and(contains("error TSI-NOTE-RANGE record 1")));
}

#[test]
fn strict_fails_only_when_issues_present() {
    let temp = TempDir::new().expect("tempdir");
    let clean = write_tsi(temp.path(), "Clean.tsi", &blob(false));
    let noisy = write_tsi(temp.path(), "Noisy.tsi", &blob(true));

    cmd()
        .args(["tsi", "dump", "--strict"])
        .arg(clean)
        .assert()
        .success();
    cmd()
        .args(["tsi", "dump", "--strict"])
        .arg(noisy)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("mapping issues detected"));
}

#[test]
fn missing_entry_suggests_entry_name() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(false));

    cmd()
        .args(["tsi", "dump"])
        .arg(input)
        .args(["--entry-name", "DeviceIO.Config.Keyboard"])
        .assert()
        .failure()
        .stderr(contains("DeviceIO.Config.Keyboard").and(contains("--entry-name")));
}

#[test]
fn frames_prints_tree() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_tsi(temp.path(), "Traktor.tsi", &blob(false));

    cmd()
        .args(["tsi", "frames"])
        .arg(input)
        .assert()
        .success()
        .stdout(
            contains("DEVI @0..")
                .and(contains("\n  DDAT @"))
                .and(contains("\n        CMAI @"))
                .and(contains("skipped").not()),
        );
}

#[test]
fn frames_can_show_skipped_regions() {
    let temp = TempDir::new().expect("tempdir");
    let mut data = vec![0xFF; 9];
    data.extend(blob(false));
    let input = temp.path().join("controller.bin");
    std::fs::write(&input, data).expect("write blob");

    cmd()
        .args(["tsi", "walk", "--raw", "--show-skipped"])
        .arg(input)
        .assert()
        .success()
        .stdout(contains("~ skipped 0..9 (9 bytes, 0 bounds faults)").and(contains("DEVI @9..")));
}
