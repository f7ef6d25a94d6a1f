//! `reel validate` — per-line verdicts over NDJSON record files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use reel_core::message::{SessionStatus, TrainingRecord};
use reel_record::{RecordEnvelope, derive_status, validate_declared};
use serde_json::Value;
use walkdir::WalkDir;

/// Validates every record under `path`, printing one verdict per line.
///
/// Returns `false` when any line is invalid; the caller turns that into a
/// non-zero exit.
pub fn run(path: &Path) -> Result<bool> {
    let files = collect_files(path)?;
    let mut total = 0usize;
    let mut invalid = 0usize;

    for file in &files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            if raw.trim().is_empty() {
                continue;
            }
            total += 1;
            match check_line(raw) {
                Ok(status) => println!("{}:{line}: ok ({status})", file.display()),
                Err(reason) => {
                    invalid += 1;
                    println!("{}:{line}: invalid: {reason}", file.display());
                }
            }
        }
    }

    println!("{total} records checked, {invalid} invalid");
    Ok(invalid == 0)
}

/// Checks one NDJSON line, accepting either a store envelope or a bare
/// training record.
fn check_line(raw: &str) -> Result<SessionStatus, String> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| format!("not valid json: {err}"))?;
    if value.get("record").is_some() {
        let envelope: RecordEnvelope =
            serde_json::from_value(value).map_err(|err| format!("malformed envelope: {err}"))?;
        validate_declared(&envelope.record, envelope.status).map_err(|v| v.to_string())?;
        Ok(envelope.status)
    } else {
        let record: TrainingRecord =
            serde_json::from_value(value).map_err(|err| format!("malformed record: {err}"))?;
        derive_status(&record).map_err(|v| v.to_string())
    }
}

/// A file is taken as-is; a directory is walked for `*.ndjson`.
fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("no such file or directory: {}", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "ndjson")
        {
            files.push(entry.into_path());
        }
    }
    if files.is_empty() {
        bail!("no .ndjson files under {}", path.display());
    }
    Ok(files)
}
