use std::fs;
use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::info;

use crate::checks::check_records;
use crate::enums::MappingType;
use crate::frame::walk;
use crate::mapping::{MappingDecoder, MappingRecord, TailCheck, layout};
use crate::source::{BlobSource, CONTROLLER_ENTRY_NAME, SourceError, TsiFileSource};
use crate::{DecodeSummary, Report, make_stub_report};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode a settings file with the default entry name and tail check.
pub fn decode_tsi_file(path: &Path) -> Result<Report, DecodeError> {
    let source = TsiFileSource::open(path, CONTROLLER_ENTRY_NAME)?;
    decode_source(path, source, &MappingDecoder::new())
}

pub fn decode_source<S: BlobSource, C: TailCheck>(
    path: &Path,
    mut source: S,
    decoder: &MappingDecoder<C>,
) -> Result<Report, DecodeError> {
    let blob = source.mapping_blob()?;
    let mappings = decoder.decode(&blob);
    let issues = check_records(&mappings);

    let metadata = fs::metadata(path)?;
    let mut report = make_stub_report(&path.display().to_string(), metadata.len());
    if let Some(generated_at) = metadata.modified().ok().and_then(system_time_to_rfc3339) {
        report.generated_at = generated_at;
    }
    report.input.blob_bytes = Some(blob.len() as u64);
    report.summary = summarize(&blob, &mappings);

    info!(
        path = %path.display(),
        devices = report.summary.devices,
        mappings = mappings.len(),
        issues = issues.len(),
        "decoded mapping blob"
    );
    report.mappings = mappings;
    report.issues = issues;
    Ok(report)
}

fn summarize(blob: &[u8], mappings: &[MappingRecord]) -> DecodeSummary {
    let devices = walk(blob)
        .filter(|node| node.tag == layout::DEVICE)
        .count() as u64;
    let outputs = mappings.iter().filter(|m| m.is_output()).count() as u64;
    let inputs = mappings
        .iter()
        .filter(|m| m.mapping_type.value == Some(MappingType::In))
        .count() as u64;
    DecodeSummary {
        devices,
        mappings_total: mappings.len() as u64,
        inputs,
        outputs,
    }
}

fn system_time_to_rfc3339(time: SystemTime) -> Option<String> {
    OffsetDateTime::from(time).format(&Rfc3339).ok()
}
