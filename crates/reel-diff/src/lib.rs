//! # reel-diff
//!
//! Turns raw version-control output into a replayable patch set:
//!
//! - **Classification**: `git diff --name-status` text → typed [`Change`]
//!   records behind a glob [`PathFilter`]; malformed lines degrade to
//!   skips, never failures
//! - **Hunk extraction**: full unified diffs cut down to the body from
//!   the first `@@` marker
//! - **Compilation**: changes + a [`TreeSource`] → ordered
//!   [`PatchOperation`](reel_core::patch::PatchOperation)s (deletes →
//!   updates → creates, paths lexicographic) plus a skip report
//!
//! Everything here is pure and synchronous over already-materialized
//! input; no git process is ever spawned.
//!
//! ## Crate Position
//!
//! Depends only on `reel-core`. `reel-session` drives the classify →
//! filter → compile pipeline at finalize time; the CLI exposes the same
//! pipeline for on-disk trees.

#![deny(unsafe_code)]

pub mod classify;
pub mod compile;
pub mod hunks;
pub mod source;
pub mod unified;

pub use classify::{Change, FilterError, PathFilter, parse_name_status};
pub use compile::{
    BINARY_SNIFF_BYTES, CompileReport, SkipReason, SkippedPath, compile, is_binary,
};
pub use hunks::extract_hunk_body;
pub use source::{CapturedTree, FsTree, TreeError, TreeSource};
pub use unified::{full_context_diff, unified_diff};
