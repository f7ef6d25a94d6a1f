//! Change → patch operation compilation.
//!
//! Maps each classified [`Change`] to zero or more [`PatchOperation`]s
//! against a [`TreeSource`], degrading per path instead of failing the
//! whole set: binary or unreadable paths land in the skip report and the
//! rest of the changes still compile.

use metrics::counter;
use reel_core::patch::{PatchOperation, sort_operations};
use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::Change;
use crate::hunks::extract_hunk_body;
use crate::source::TreeSource;

/// How far into a file the null-byte binary sniff looks.
pub const BINARY_SNIFF_BYTES: usize = 8000;

/// Whether content should be treated as binary (a null byte within the
/// sniff window).
#[must_use]
pub fn is_binary(content: &[u8]) -> bool {
    content[..content.len().min(BINARY_SNIFF_BYTES)].contains(&0)
}

/// Why a changed path produced no operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Create source sniffed as binary.
    BinaryUnsupported,
    /// Modified path whose diff contains no hunk marker (mode-only change).
    NoTextualHunk,
    /// Current working-tree content could not be read.
    ContentUnreadable,
    /// Diff against the baseline could not be produced.
    UnavailableAtBaseline,
}

impl SkipReason {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BinaryUnsupported => "binary_unsupported",
            Self::NoTextualHunk => "no_textual_hunk",
            Self::ContentUnreadable => "content_unreadable",
            Self::UnavailableAtBaseline => "unavailable_at_baseline",
        }
    }
}

/// One path dropped during compilation, with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPath {
    /// Repo-relative path (the new side for a skipped rename).
    pub path: String,
    /// Why the path produced no operation.
    pub reason: SkipReason,
}

/// Result of compiling one change list.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileReport {
    /// Canonically ordered patch set.
    pub operations: Vec<PatchOperation>,
    /// Logical file changes — a rename counts once despite two operations.
    pub file_changes: usize,
    /// Paths that produced no operation.
    pub skipped: Vec<SkippedPath>,
}

impl CompileReport {
    /// Whether compilation produced no operations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Compile classified changes into a canonically ordered patch set.
///
/// - `Deleted` → `DeleteFile`.
/// - `Modified` → `UpdateFile` with the extracted hunk body; an empty body
///   skips the path.
/// - `Added` → `CreateFile` with verbatim current content; binary content
///   skips the path.
/// - `Renamed` → `DeleteFile{old}` + `CreateFile{new}`; when the new side
///   cannot produce a create, the whole pair is skipped so the set never
///   deletes without recreating.
///
/// The returned operations are sorted deletes → updates → creates, each
/// group lexicographic by path. Compilation is deterministic: the same
/// change list against the same source yields an identical report.
#[must_use]
pub fn compile(changes: &[Change], source: &dyn TreeSource) -> CompileReport {
    let mut report = CompileReport::default();

    for change in changes {
        match change {
            Change::Deleted(path) => {
                report.operations.push(PatchOperation::DeleteFile {
                    path: path.clone(),
                });
                report.file_changes += 1;
            }
            Change::Modified(path) => match source.diff_for(path) {
                Ok(diff) => {
                    let body = extract_hunk_body(&diff);
                    if body.is_empty() {
                        debug!(path, "no textual hunk, skipping modified path");
                        skip(&mut report, path, SkipReason::NoTextualHunk);
                    } else {
                        report.operations.push(PatchOperation::UpdateFile {
                            path: path.clone(),
                            diff: body.to_string(),
                        });
                        report.file_changes += 1;
                    }
                }
                Err(err) => {
                    warn!(path, error = %err, "diff unavailable, skipping modified path");
                    skip(&mut report, path, SkipReason::UnavailableAtBaseline);
                }
            },
            Change::Added(path) => match read_create(source, path) {
                Ok(op) => {
                    report.operations.push(op);
                    report.file_changes += 1;
                }
                Err(reason) => skip(&mut report, path, reason),
            },
            Change::Renamed { old_path, new_path } => match read_create(source, new_path) {
                Ok(create) => {
                    report.operations.push(PatchOperation::DeleteFile {
                        path: old_path.clone(),
                    });
                    report.operations.push(create);
                    report.file_changes += 1;
                }
                Err(reason) => {
                    warn!(
                        old_path,
                        new_path,
                        reason = reason.as_str(),
                        "skipping whole rename"
                    );
                    skip(&mut report, new_path, reason);
                }
            },
        }
    }

    sort_operations(&mut report.operations);
    report
}

/// Build the `CreateFile` for a path, or the reason it cannot exist.
fn read_create(source: &dyn TreeSource, path: &str) -> Result<PatchOperation, SkipReason> {
    let bytes = match source.current_content(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path, error = %err, "current content unreadable");
            return Err(SkipReason::ContentUnreadable);
        }
    };
    if is_binary(&bytes) {
        warn!(path, "binary content cannot be recorded, skipping");
        return Err(SkipReason::BinaryUnsupported);
    }
    Ok(PatchOperation::CreateFile {
        path: path.to_string(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn skip(report: &mut CompileReport, path: &str, reason: SkipReason) {
    counter!("compile_paths_skipped_total", "reason" => reason.as_str()).increment(1);
    report.skipped.push(SkippedPath {
        path: path.to_string(),
        reason,
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
