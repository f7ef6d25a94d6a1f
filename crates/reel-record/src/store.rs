//! Append-only on-disk record store.
//!
//! Finalized sessions land in a single `records.ndjson` file, one envelope
//! per line. Appends are validated (structure and declared status) before
//! anything touches the disk, and loads detect torn lines and duplicate
//! session ids rather than silently absorbing them.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use metrics::counter;
use reel_core::message::{SessionStatus, TrainingRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::status::validate_declared;
use crate::validate::Violation;

/// File name of the NDJSON store inside the store root.
pub const RECORDS_FILE: &str = "records.ndjson";

/// One stored session: the record plus its capture metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEnvelope {
    /// Unique session id, assigned at capture start.
    pub session_id: Uuid,
    /// Status the session finalized with; re-derived on append.
    pub status: SessionStatus,
    /// When the capture started.
    pub started_at: DateTime<Utc>,
    /// When the capture finalized.
    pub finished_at: DateTime<Utc>,
    /// Logical files changed by the session's patch.
    pub file_changes: usize,
    /// The training record itself.
    pub record: TrainingRecord,
}

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("store io: {0}")]
    Io(#[from] io::Error),
    /// Envelope could not be encoded.
    #[error("envelope failed to encode: {0}")]
    Encode(#[from] serde_json::Error),
    /// Record or declared status failed validation on append.
    #[error("record rejected: {0}")]
    Rejected(#[from] Violation),
    /// A stored line no longer parses as an envelope.
    #[error("line {line} is not a record envelope: {source}")]
    Malformed {
        /// One-based line number in the store file.
        line: usize,
        /// Underlying decoder error.
        source: serde_json::Error,
    },
    /// The same session id appears on more than one line.
    #[error("session {id} stored twice (second copy at line {line})")]
    DuplicateSession {
        /// The repeated session id.
        id: Uuid,
        /// One-based line number of the second copy.
        line: usize,
    },
}

/// NDJSON-backed store rooted at a directory.
#[derive(Clone, Debug)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Store rooted at `root`; the directory is created lazily on first append.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the backing NDJSON file.
    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        self.root.join(RECORDS_FILE)
    }

    /// Appends one envelope after re-validating it.
    ///
    /// The declared status must match what the record derives to; a client
    /// cannot store a `ready` label the transcript does not support.
    pub fn append(&self, envelope: &RecordEnvelope) -> Result<(), StoreError> {
        validate_declared(&envelope.record, envelope.status)?;
        fs::create_dir_all(&self.root)?;

        let mut line = serde_json::to_string(envelope)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.records_path())?;
        file.write_all(line.as_bytes())?;

        counter!("records_stored_total", "status" => envelope.status.as_str()).increment(1);
        info!(
            session_id = %envelope.session_id,
            status = %envelope.status,
            file_changes = envelope.file_changes,
            "record appended"
        );
        Ok(())
    }

    /// Loads every stored envelope, in append order.
    ///
    /// A missing store file is an empty store, not an error.
    pub fn load_all(&self) -> Result<Vec<RecordEnvelope>, StoreError> {
        let text = match fs::read_to_string(self.records_path()) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };

        let mut envelopes = Vec::new();
        let mut seen = HashSet::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let envelope: RecordEnvelope = serde_json::from_str(raw)
                .map_err(|source| StoreError::Malformed { line, source })?;
            if !seen.insert(envelope.session_id) {
                return Err(StoreError::DuplicateSession {
                    id: envelope.session_id,
                    line,
                });
            }
            envelopes.push(envelope);
        }
        Ok(envelopes)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
