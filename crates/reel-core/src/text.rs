//! UTF-8–safe truncation and tool-output capping.
//!
//! `&str[..n]` panics when `n` lands inside a multi-byte character, so these
//! helpers snap back to the nearest char boundary. The cap is applied to
//! captured tool output before redaction, which keeps the redaction sentinel
//! from ever being split by a later trim.

/// Indicator appended to capped output.
pub const CAP_SUFFIX: &str = "\n… [output truncated]";

/// Longest prefix of `s` that is at most `max_bytes` bytes and does not
/// split a multi-byte character.
#[inline]
#[must_use]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    // floor_char_boundary is nightly-only; walk back to a boundary ourselves.
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Cap captured output at `max_bytes`, appending [`CAP_SUFFIX`] when trimming.
///
/// The result, suffix included, fits in `max_bytes` — except when `max_bytes`
/// is smaller than the suffix itself, in which case just the suffix is
/// returned. Output that already fits comes back unchanged.
#[must_use]
pub fn cap_output(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_owned();
    }
    let body_budget = max_bytes.saturating_sub(CAP_SUFFIX.len());
    let body = truncate_str(s, body_budget);
    format!("{body}{CAP_SUFFIX}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
