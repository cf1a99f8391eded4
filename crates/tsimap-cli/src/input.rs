//! Input path resolution and output path guards.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glob::glob;

use crate::CliError;

const TSI_EXTENSION: &str = "tsi";
const LISTED_MATCHES: usize = 3;

/// Expand a glob pattern to exactly one file; plain paths pass through.
pub fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let pattern_error = |detail: String| {
        CliError::new(
            format!("invalid input pattern '{pattern}'"),
            Some(format!("pattern error: {detail}")),
        )
    };
    let mut matches = Vec::new();
    for entry in glob(&pattern).map_err(|err| pattern_error(err.msg.to_string()))? {
        let path = entry.map_err(|err| pattern_error(err.to_string()))?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{pattern}'"),
            Some("check the path or quote the pattern; expected a .tsi file".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed: Vec<String> = matches
                .iter()
                .take(LISTED_MATCHES)
                .map(|path| path.display().to_string())
                .collect();
            if count > LISTED_MATCHES {
                listed.push("...".to_string());
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{pattern}' ({count} matches); matches: {}",
                    listed.join(", ")
                ),
                Some("pass a single settings file, or run once per file".to_string()),
            ))
        }
    }
}

/// The input must be an existing file; without `raw` it must be a `.tsi`.
pub fn validate_input_file(input: &Path, raw: bool) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .tsi file, or --raw for an extracted blob".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .tsi file, or --raw for an extracted blob".to_string()),
        ));
    }
    if raw {
        return Ok(());
    }
    let is_tsi = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TSI_EXTENSION));
    if !is_tsi {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .tsi file; pass --raw to read an extracted blob".to_string()),
        ));
    }
    Ok(())
}

/// Refuse to write an output over the input file.
pub fn ensure_distinct_output(input: &Path, output: &Path, flag: &str) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory cannot contain the input.
    let Ok(parent_abs) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", output.display()))?;
    if parent_abs.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("{flag} path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::is_glob_pattern;

    #[test]
    fn detects_glob_metacharacters() {
        assert!(is_glob_pattern("settings/*.tsi"));
        assert!(is_glob_pattern("Traktor?.tsi"));
        assert!(!is_glob_pattern("Traktor Settings.tsi"));
    }
}
