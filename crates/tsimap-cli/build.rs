use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TSIMAP_BUILD_COMMIT");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let commit = env_value("TSIMAP_BUILD_COMMIT")
        .or_else(|| git(&["describe", "--always", "--dirty", "--abbrev=9"]))
        .unwrap_or_else(|| UNKNOWN.to_string());

    // Packagers pin the date for reproducible builds.
    let build_date = env_value("SOURCE_DATE_EPOCH")
        .map(|epoch| format!("@{epoch}"))
        .or_else(|| git(&["log", "-1", "--format=%cs"]))
        .unwrap_or_else(|| UNKNOWN.to_string());

    println!("cargo:rustc-env=TSIMAP_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=TSIMAP_BUILD_DATE={build_date}");
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}
