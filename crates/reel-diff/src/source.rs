//! Tree sources feeding the compiler.
//!
//! The compiler never shells out to git; it reads a [`TreeSource`] that has
//! already materialized the name-status summary, per-path diffs, and file
//! content. [`CapturedTree`] holds captured output in memory (the editor
//! integration path, and tests); [`FsTree`] reads two on-disk trees and
//! generates diffs itself (the CLI path).

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::unified::full_context_diff;

/// Why a tree source could not produce content for a path.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Nothing captured or on disk for this path.
    #[error("no content available for {path:?}")]
    Missing {
        /// The repository-relative path asked for.
        path: String,
    },
    /// Absolute path or `..` traversal.
    #[error("path {path:?} escapes the tree root")]
    OutsideTree {
        /// The offending path.
        path: String,
    },
    /// Underlying filesystem failure other than not-found.
    #[error("io error reading tree content: {0}")]
    Io(#[from] std::io::Error),
}

/// Read access to the baseline→current change set of one workspace.
pub trait TreeSource {
    /// Raw name-status summary between baseline and the current tree.
    fn name_status(&self) -> Result<String, TreeError>;

    /// Full unified diff for one path, with enough context that the hunk
    /// body alone can replay the change.
    fn diff_for(&self, path: &str) -> Result<String, TreeError>;

    /// Exact current content of a path, undecoded.
    fn current_content(&self, path: &str) -> Result<Vec<u8>, TreeError>;

    /// Baseline content of a path, undecoded.
    fn baseline_content(&self, path: &str) -> Result<Vec<u8>, TreeError>;
}

/// In-memory tree source over already-captured version-control output.
#[derive(Debug, Clone, Default)]
pub struct CapturedTree {
    name_status: String,
    diffs: BTreeMap<String, String>,
    current: BTreeMap<String, Vec<u8>>,
    baseline: BTreeMap<String, Vec<u8>>,
}

impl CapturedTree {
    /// Start from a raw name-status summary.
    #[must_use]
    pub fn new(name_status: impl Into<String>) -> Self {
        Self {
            name_status: name_status.into(),
            ..Self::default()
        }
    }

    /// Attach a pre-captured unified diff for a path.
    #[must_use]
    pub fn with_diff(mut self, path: impl Into<String>, diff: impl Into<String>) -> Self {
        let _ = self.diffs.insert(path.into(), diff.into());
        self
    }

    /// Attach current working-tree content for a path.
    #[must_use]
    pub fn with_current(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let _ = self.current.insert(path.into(), content.into());
        self
    }

    /// Attach baseline content for a path.
    #[must_use]
    pub fn with_baseline(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let _ = self.baseline.insert(path.into(), content.into());
        self
    }
}

impl TreeSource for CapturedTree {
    fn name_status(&self) -> Result<String, TreeError> {
        Ok(self.name_status.clone())
    }

    fn diff_for(&self, path: &str) -> Result<String, TreeError> {
        if let Some(diff) = self.diffs.get(path) {
            return Ok(diff.clone());
        }
        // No captured diff; derive one when both sides were captured.
        match (self.baseline.get(path), self.current.get(path)) {
            (Some(baseline), Some(current)) => Ok(full_context_diff(
                &String::from_utf8_lossy(baseline),
                &String::from_utf8_lossy(current),
            )),
            _ => Err(TreeError::Missing {
                path: path.to_string(),
            }),
        }
    }

    fn current_content(&self, path: &str) -> Result<Vec<u8>, TreeError> {
        self.current
            .get(path)
            .cloned()
            .ok_or_else(|| TreeError::Missing {
                path: path.to_string(),
            })
    }

    fn baseline_content(&self, path: &str) -> Result<Vec<u8>, TreeError> {
        self.baseline
            .get(path)
            .cloned()
            .ok_or_else(|| TreeError::Missing {
                path: path.to_string(),
            })
    }
}

/// On-disk tree source: a current tree root, an optional baseline tree
/// root, and a caller-supplied name-status summary.
#[derive(Debug, Clone)]
pub struct FsTree {
    name_status: String,
    tree_root: PathBuf,
    base_root: Option<PathBuf>,
}

impl FsTree {
    /// Build a source over the tree rooted at `tree_root`.
    #[must_use]
    pub fn new(name_status: impl Into<String>, tree_root: impl Into<PathBuf>) -> Self {
        Self {
            name_status: name_status.into(),
            tree_root: tree_root.into(),
            base_root: None,
        }
    }

    /// Attach a baseline tree root for diff generation and baseline reads.
    #[must_use]
    pub fn with_baseline_root(mut self, base_root: impl Into<PathBuf>) -> Self {
        self.base_root = Some(base_root.into());
        self
    }

    fn read(root: &Path, path: &str) -> Result<Vec<u8>, TreeError> {
        let full = safe_join(root, path)?;
        std::fs::read(&full).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                TreeError::Missing {
                    path: path.to_string(),
                }
            } else {
                TreeError::Io(err)
            }
        })
    }
}

impl TreeSource for FsTree {
    fn name_status(&self) -> Result<String, TreeError> {
        Ok(self.name_status.clone())
    }

    fn diff_for(&self, path: &str) -> Result<String, TreeError> {
        let Some(base_root) = &self.base_root else {
            return Err(TreeError::Missing {
                path: path.to_string(),
            });
        };
        let baseline = Self::read(base_root, path)?;
        let current = Self::read(&self.tree_root, path)?;
        Ok(full_context_diff(
            &String::from_utf8_lossy(&baseline),
            &String::from_utf8_lossy(&current),
        ))
    }

    fn current_content(&self, path: &str) -> Result<Vec<u8>, TreeError> {
        Self::read(&self.tree_root, path)
    }

    fn baseline_content(&self, path: &str) -> Result<Vec<u8>, TreeError> {
        match &self.base_root {
            Some(base_root) => Self::read(base_root, path),
            None => Err(TreeError::Missing {
                path: path.to_string(),
            }),
        }
    }
}

/// Join a repository-relative path onto a root, rejecting absolute paths
/// and `..` traversal.
fn safe_join(root: &Path, rel: &str) -> Result<PathBuf, TreeError> {
    let rel_path = Path::new(rel);
    let escapes = rel_path.is_absolute()
        || rel_path
            .components()
            .any(|c| matches!(c, Component::ParentDir));
    if escapes {
        return Err(TreeError::OutsideTree {
            path: rel.to_string(),
        });
    }
    Ok(root.join(rel_path))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
