//! # reel-record
//!
//! Validation, status derivation, persistence, and NDJSON export for
//! training records:
//!
//! - **Validation**: single forward scan enforcing id uniqueness, result
//!   ordering, apply_patch cardinality, and per-tool argument schemas
//!   (patch operation shapes, `run_cmd` grammar)
//! - **Status**: `ready` iff the record carries an applied patch and a
//!   lint/test/build run; declared statuses are re-derived, never trusted
//! - **Store**: append-only `records.ndjson` of session envelopes, with
//!   duplicate and torn-line detection on load
//! - **Export / import**: one `{"messages": [...]}` object per line,
//!   validated in both directions
//!
//! ## Crate Position
//!
//! Depends on `reel-core` for message and patch shapes and on
//! `reel-grammar` to re-parse recorded commands. `reel-session` validates
//! through this crate at finalize time; the CLI drives export and import.

#![deny(unsafe_code)]

pub mod export;
pub mod status;
pub mod store;
pub mod validate;

#[cfg(test)]
mod testutil;

pub use export::{ExportError, ImportError, export_records, import_records};
pub use status::{derive_status, validate_declared};
pub use store::{RECORDS_FILE, RecordEnvelope, RecordStore, StoreError};
pub use validate::{Violation, validate};
