//! Bulk NDJSON export and import of training records.
//!
//! Exports are one `{"messages": [...]}` object per line, with a trailing
//! newline, so downstream training pipelines can stream them. Both
//! directions re-run full validation: nothing invalid leaves the store,
//! and nothing invalid gets back in.

use reel_core::message::TrainingRecord;
use thiserror::Error;
use tracing::debug;

use crate::validate::{Violation, validate};

/// A record that could not be exported.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A record failed validation; nothing gets written past it.
    #[error("record {index} failed validation: {violation}")]
    Invalid {
        /// Zero-based position of the record in the export batch.
        index: usize,
        /// The violation that stopped the export.
        violation: Violation,
    },
    /// A record failed to serialize.
    #[error("record {index} failed to serialize: {source}")]
    Serialize {
        /// Zero-based position of the record in the export batch.
        index: usize,
        /// Underlying encoder error.
        source: serde_json::Error,
    },
}

/// A line that could not be imported.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A line was not a valid record object.
    #[error("line {line} is not a training record: {source}")]
    Parse {
        /// One-based line number in the input.
        line: usize,
        /// Underlying decoder error.
        source: serde_json::Error,
    },
    /// A line parsed but failed validation.
    #[error("line {line} failed validation: {violation}")]
    Invalid {
        /// One-based line number in the input.
        line: usize,
        /// The violation that stopped the import.
        violation: Violation,
    },
}

/// Serializes records to NDJSON, one object per line.
///
/// Every record is validated before it is encoded; the first failure aborts
/// the batch so a partial export is never mistaken for a complete one.
pub fn export_records<'a, I>(records: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a TrainingRecord>,
{
    let mut out = String::new();
    let mut exported = 0usize;
    for (index, record) in records.into_iter().enumerate() {
        validate(record).map_err(|violation| ExportError::Invalid { index, violation })?;
        let line = serde_json::to_string(record)
            .map_err(|source| ExportError::Serialize { index, source })?;
        out.push_str(&line);
        out.push('\n');
        exported += 1;
    }
    debug!(records = exported, "export batch encoded");
    Ok(out)
}

/// Parses NDJSON back into validated records.
///
/// Blank lines are skipped; error positions are one-based line numbers in
/// the input, matching what an editor or `jq` would report.
pub fn import_records(input: &str) -> Result<Vec<TrainingRecord>, ImportError> {
    let mut records = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let record: TrainingRecord =
            serde_json::from_str(raw).map_err(|source| ImportError::Parse { line, source })?;
        validate(&record).map_err(|violation| ImportError::Invalid { line, violation })?;
        records.push(record);
    }
    Ok(records)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
