//! Name-status classification.
//!
//! Turns a raw `<status>\t<path>[\t<newPath>]` summary (the shape `git diff
//! --name-status` emits) into typed [`Change`] records, applying a
//! glob-style path filter before anything downstream sees them.

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

/// One classified change between the baseline and the current tree.
///
/// Renames are kept whole here; the compiler decomposes them into a
/// delete/create pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Path exists in both trees with different content.
    Modified(String),
    /// Path exists only in the current tree.
    Added(String),
    /// Path exists only at baseline.
    Deleted(String),
    /// Path moved; content may have changed in the same step.
    Renamed {
        /// Location at baseline.
        old_path: String,
        /// Location in the current tree.
        new_path: String,
    },
}

impl Change {
    /// The path downstream reporting refers to (the new side of a rename).
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Modified(path) | Self::Added(path) | Self::Deleted(path) => path,
            Self::Renamed { new_path, .. } => new_path,
        }
    }
}

/// A glob-pattern construction failure, naming the offending pattern.
#[derive(Debug, thiserror::Error)]
#[error("invalid glob pattern {pattern:?}: {source}")]
pub struct FilterError {
    pattern: String,
    source: globset::Error,
}

/// Include/exclude glob filter over repository-relative paths.
///
/// A path passes when it matches the include set (an empty include set
/// matches everything) and matches nothing in the exclude set.
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl PathFilter {
    /// Build a filter from include and exclude glob patterns.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, FilterError> {
        Ok(Self {
            include: build_set(include)?,
            exclude: build_set(exclude)?,
        })
    }

    /// A filter that passes every path.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            include: GlobSet::empty(),
            exclude: GlobSet::empty(),
        }
    }

    /// Whether `path` survives the filter.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let included = self.include.is_empty() || self.include.is_match(path);
        included && !self.exclude.is_match(path)
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::allow_all()
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, FilterError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| FilterError {
            pattern: pattern.clone(),
            source,
        })?;
        let _ = builder.add(glob);
    }
    builder.build().map_err(|source| FilterError {
        pattern: patterns.join(","),
        source,
    })
}

/// Parse a name-status summary into filtered, ordered [`Change`]s.
///
/// `M`, `A`, `D` map directly; any status starting with `R` (rename with
/// similarity score) maps to [`Change::Renamed`]. Lines missing a required
/// field and lines with unrecognized statuses are skipped, never fatal — one
/// bad line must not lose the rest of the summary. A rename passes the
/// filter when either endpoint does.
#[must_use]
pub fn parse_name_status(summary: &str, filter: &PathFilter) -> Vec<Change> {
    let mut changes = Vec::new();
    for line in summary.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let Some(status) = fields.next() else {
            continue;
        };
        let change = match status {
            "M" => field(fields.next()).map(Change::Modified),
            "A" => field(fields.next()).map(Change::Added),
            "D" => field(fields.next()).map(Change::Deleted),
            rename if rename.starts_with('R') => {
                match (field(fields.next()), field(fields.next())) {
                    (Some(old_path), Some(new_path)) => Some(Change::Renamed { old_path, new_path }),
                    _ => None,
                }
            }
            other => {
                debug!(status = other, line, "skipping unrecognized status");
                continue;
            }
        };
        let Some(change) = change else {
            debug!(line, "skipping malformed name-status line");
            continue;
        };
        if passes(&change, filter) {
            changes.push(change);
        } else {
            debug!(path = change.path(), "change filtered out");
        }
    }
    changes
}

fn field(value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => None,
    }
}

fn passes(change: &Change, filter: &PathFilter) -> bool {
    match change {
        Change::Modified(path) | Change::Added(path) | Change::Deleted(path) => {
            filter.matches(path)
        }
        Change::Renamed { old_path, new_path } => {
            filter.matches(old_path) || filter.matches(new_path)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
