//! Unified diff generation.
//!
//! Produces hunk bodies in the standard format:
//!
//! ```text
//! @@ -start,count +start,count @@
//!  context line
//! -removed line
//! +added line
//! ```
//!
//! Used by tree sources that hold file content but no pre-captured diff.
//! [`full_context_diff`] emits one hunk spanning the whole file, which is
//! the shape patch replay expects.

use std::fmt::Write;

/// One step of the line-level edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    /// Line present in both versions (old index, new index).
    Keep(usize, usize),
    /// Line only at baseline (old index).
    Remove(usize),
    /// Line only in the new version (new index).
    Insert(usize),
}

/// Generate a unified diff between two texts with `context` unchanged
/// lines around each change. Returns an empty string when the texts have
/// no line-level differences.
#[must_use]
pub fn unified_diff(old: &str, new: &str, context: usize) -> String {
    if old == new {
        return String::new();
    }
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let script = edit_script(&old_lines, &new_lines);

    // Context-expanded ranges of consecutive non-Keep steps, merged when
    // their windows touch so hunks never overlap.
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut idx = 0;
    while idx < script.len() {
        if matches!(script[idx], Edit::Keep(..)) {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < script.len() && !matches!(script[idx], Edit::Keep(..)) {
            idx += 1;
        }
        let lo = start.saturating_sub(context);
        let hi = idx.saturating_add(context).min(script.len());
        match ranges.last_mut() {
            Some((_, prev_hi)) if *prev_hi >= lo => *prev_hi = hi,
            _ => ranges.push((lo, hi)),
        }
    }
    if ranges.is_empty() {
        return String::new();
    }

    // Old/new line positions before each script step, so hunk headers can
    // be computed per range without rescanning.
    let mut old_at = Vec::with_capacity(script.len() + 1);
    let mut new_at = Vec::with_capacity(script.len() + 1);
    let (mut old_pos, mut new_pos) = (0usize, 0usize);
    for step in &script {
        old_at.push(old_pos);
        new_at.push(new_pos);
        match step {
            Edit::Keep(..) => {
                old_pos += 1;
                new_pos += 1;
            }
            Edit::Remove(_) => old_pos += 1,
            Edit::Insert(_) => new_pos += 1,
        }
    }
    old_at.push(old_pos);
    new_at.push(new_pos);

    let mut out = String::new();
    for (lo, hi) in ranges {
        let old_count = old_at[hi] - old_at[lo];
        let new_count = new_at[hi] - new_at[lo];
        // A zero-length side anchors at the preceding line, per diff(1)
        let old_start = if old_count == 0 { old_at[lo] } else { old_at[lo] + 1 };
        let new_start = if new_count == 0 { new_at[lo] } else { new_at[lo] + 1 };
        let _ = writeln!(out, "@@ -{old_start},{old_count} +{new_start},{new_count} @@");
        for step in &script[lo..hi] {
            match step {
                Edit::Keep(old_idx, _) => {
                    let _ = writeln!(out, " {}", old_lines[*old_idx]);
                }
                Edit::Remove(old_idx) => {
                    let _ = writeln!(out, "-{}", old_lines[*old_idx]);
                }
                Edit::Insert(new_idx) => {
                    let _ = writeln!(out, "+{}", new_lines[*new_idx]);
                }
            }
        }
    }
    out
}

/// Generate a diff whose single hunk covers the whole file.
#[must_use]
pub fn full_context_diff(old: &str, new: &str) -> String {
    unified_diff(old, new, usize::MAX)
}

/// LCS-based edit script over line slices.
fn edit_script(old: &[&str], new: &[&str]) -> Vec<Edit> {
    let width = new.len() + 1;
    let mut lcs = vec![0u32; (old.len() + 1) * width];
    for (i, old_line) in old.iter().enumerate() {
        for (j, new_line) in new.iter().enumerate() {
            lcs[(i + 1) * width + (j + 1)] = if old_line == new_line {
                lcs[i * width + j] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + (j + 1)])
            };
        }
    }

    let mut script = Vec::with_capacity(old.len().max(new.len()));
    let (mut i, mut j) = (old.len(), new.len());
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old[i - 1] == new[j - 1] {
            script.push(Edit::Keep(i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || lcs[i * width + (j - 1)] >= lcs[(i - 1) * width + j]) {
            script.push(Edit::Insert(j - 1));
            j -= 1;
        } else {
            script.push(Edit::Remove(i - 1));
            i -= 1;
        }
    }
    script.reverse();
    script
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
