//! Hunk body extraction.
//!
//! A patch operation replays only the hunk body of a unified diff; the
//! `diff --git`/`index`/`---`/`+++` header lines above the first `@@` are
//! discarded.

use reel_core::patch::HUNK_MARKER;

/// Slice a full unified diff down to its replayable hunk body.
///
/// Returns the substring from the first line starting with `@@` through the
/// end of the diff, or the empty string when no hunk marker exists (pure
/// mode changes, binary placeholders). Callers must treat an empty body as
/// "emit no update for this path".
#[must_use]
pub fn extract_hunk_body(diff: &str) -> &str {
    let mut offset = 0;
    for line in diff.split_inclusive('\n') {
        if line.starts_with(HUNK_MARKER) {
            return &diff[offset..];
        }
        offset += line.len();
    }
    ""
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
