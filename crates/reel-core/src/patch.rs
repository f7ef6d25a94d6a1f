//! Patch operations and the patch-set ordering contract.
//!
//! A compiled edit is a list of [`PatchOperation`]s sorted deletes → updates
//! → creates, each group lexicographic by path. Downstream consumers diff
//! exports against each other, so the ordering is part of the wire contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker that opens every hunk in a unified diff.
pub const HUNK_MARKER: &str = "@@";

/// One file-level edit inside a patch set.
///
/// Wire shape is tagged: `{"type": "create_file" | "update_file" |
/// "delete_file", "path": ..., ...}`. Serde's tagged decoding is lenient
/// about extra fields, so the validator goes through [`PatchOperation::from_wire`]
/// instead, which enforces the full shape rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatchOperation {
    /// Create a file with exact content.
    CreateFile {
        /// Repo-relative path.
        path: String,
        /// Exact working-tree content, no trimming or normalization.
        content: String,
    },
    /// Rewrite a region of an existing file.
    UpdateFile {
        /// Repo-relative path.
        path: String,
        /// Hunk body — from the first `@@` marker to the end of the diff.
        diff: String,
    },
    /// Delete a file.
    DeleteFile {
        /// Repo-relative path.
        path: String,
    },
}

/// Why a wire value failed to decode into a [`PatchOperation`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PatchShapeError {
    /// Operation is not a JSON object.
    #[error("patch operation must be an object")]
    NotAnObject,
    /// `type` field missing or not a string.
    #[error("patch operation missing type field")]
    MissingType,
    /// `type` outside the known set.
    #[error("unknown patch operation type: {0}")]
    UnknownType(String),
    /// `path` missing, empty, or not a string.
    #[error("{op} operation missing path")]
    MissingPath {
        /// Operation type for context.
        op: &'static str,
    },
    /// `create_file` without a `content` string.
    #[error("create_file operation for {path} missing content")]
    MissingContent {
        /// Offending path.
        path: String,
    },
    /// `update_file` without a `diff` string.
    #[error("update_file operation for {path} missing diff")]
    MissingDiff {
        /// Offending path.
        path: String,
    },
    /// `update_file` whose diff has no hunk marker.
    #[error("update_file diff for {path} contains no hunk marker")]
    NoHunkMarker {
        /// Offending path.
        path: String,
    },
    /// `delete_file` carrying a `diff` or `content` field.
    #[error("delete_file operation for {path} carries {field}")]
    DeleteWithPayload {
        /// Offending path.
        path: String,
        /// The forbidden field that was present.
        field: &'static str,
    },
}

impl PatchOperation {
    /// Repo-relative path this operation touches.
    ///
    /// For a rename's two halves, each half reports its own path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::CreateFile { path, .. }
            | Self::UpdateFile { path, .. }
            | Self::DeleteFile { path } => path,
        }
    }

    /// Group rank in the patch-set total order: deletes, updates, creates.
    #[must_use]
    pub fn group_rank(&self) -> u8 {
        match self {
            Self::DeleteFile { .. } => 0,
            Self::UpdateFile { .. } => 1,
            Self::CreateFile { .. } => 2,
        }
    }

    /// Strict decode from a wire value, enforcing the shape rules serde's
    /// tagged decoding does not: a create must carry `content`, an update's
    /// `diff` must contain a hunk marker, and a delete must carry neither.
    pub fn from_wire(value: &Value) -> Result<Self, PatchShapeError> {
        let obj = value.as_object().ok_or(PatchShapeError::NotAnObject)?;
        let op_type = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(PatchShapeError::MissingType)?;

        let path_for = |op: &'static str| -> Result<String, PatchShapeError> {
            match obj.get("path").and_then(Value::as_str) {
                Some(p) if !p.is_empty() => Ok(p.to_string()),
                _ => Err(PatchShapeError::MissingPath { op }),
            }
        };

        match op_type {
            "create_file" => {
                let path = path_for("create_file")?;
                let content = obj
                    .get("content")
                    .and_then(Value::as_str)
                    .ok_or_else(|| PatchShapeError::MissingContent { path: path.clone() })?;
                Ok(Self::CreateFile {
                    path,
                    content: content.to_string(),
                })
            }
            "update_file" => {
                let path = path_for("update_file")?;
                let diff = obj
                    .get("diff")
                    .and_then(Value::as_str)
                    .ok_or_else(|| PatchShapeError::MissingDiff { path: path.clone() })?;
                if !diff.contains(HUNK_MARKER) {
                    return Err(PatchShapeError::NoHunkMarker { path });
                }
                Ok(Self::UpdateFile {
                    path,
                    diff: diff.to_string(),
                })
            }
            "delete_file" => {
                let path = path_for("delete_file")?;
                for field in ["diff", "content"] {
                    if obj.contains_key(field) {
                        return Err(PatchShapeError::DeleteWithPayload { path, field });
                    }
                }
                Ok(Self::DeleteFile { path })
            }
            other => Err(PatchShapeError::UnknownType(other.to_string())),
        }
    }

    /// Sort key implementing the patch-set total order.
    #[must_use]
    pub fn order_key(&self) -> (u8, &str) {
        (self.group_rank(), self.path())
    }
}

/// Sort operations into the canonical patch-set order.
///
/// Stable: operations with equal keys keep their input order.
pub fn sort_operations(ops: &mut [PatchOperation]) {
    ops.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn wire_tags() {
        let op = PatchOperation::CreateFile {
            path: "src/new.ts".to_string(),
            content: "export {};\n".to_string(),
        };
        let wire = serde_json::to_value(&op).unwrap();
        assert_eq!(
            wire,
            json!({"type": "create_file", "path": "src/new.ts", "content": "export {};\n"})
        );

        let op = PatchOperation::DeleteFile {
            path: "old.ts".to_string(),
        };
        let wire = serde_json::to_value(&op).unwrap();
        assert_eq!(wire, json!({"type": "delete_file", "path": "old.ts"}));
    }

    #[test]
    fn from_wire_create() {
        let op = PatchOperation::from_wire(&json!({
            "type": "create_file", "path": "a.ts", "content": "x"
        }))
        .unwrap();
        assert_eq!(op.path(), "a.ts");
        assert_eq!(op.group_rank(), 2);
    }

    #[test]
    fn from_wire_create_without_content() {
        let err = PatchOperation::from_wire(&json!({
            "type": "create_file", "path": "a.ts"
        }))
        .unwrap_err();
        assert_matches!(err, PatchShapeError::MissingContent { path } if path == "a.ts");
    }

    #[test]
    fn from_wire_update_requires_hunk_marker() {
        let ok = PatchOperation::from_wire(&json!({
            "type": "update_file", "path": "a.ts",
            "diff": "@@ -1,2 +1,2 @@\n-old\n+new\n"
        }));
        assert!(ok.is_ok());

        let err = PatchOperation::from_wire(&json!({
            "type": "update_file", "path": "a.ts", "diff": "-old\n+new\n"
        }))
        .unwrap_err();
        assert_matches!(err, PatchShapeError::NoHunkMarker { .. });
    }

    #[test]
    fn from_wire_delete_rejects_payload() {
        let err = PatchOperation::from_wire(&json!({
            "type": "delete_file", "path": "a.ts", "diff": "@@"
        }))
        .unwrap_err();
        assert_matches!(err, PatchShapeError::DeleteWithPayload { field: "diff", .. });

        let err = PatchOperation::from_wire(&json!({
            "type": "delete_file", "path": "a.ts", "content": "x"
        }))
        .unwrap_err();
        assert_matches!(err, PatchShapeError::DeleteWithPayload { field: "content", .. });
    }

    #[test]
    fn from_wire_unknown_type() {
        let err =
            PatchOperation::from_wire(&json!({"type": "rename_file", "path": "a"})).unwrap_err();
        assert_matches!(err, PatchShapeError::UnknownType(t) if t == "rename_file");
    }

    #[test]
    fn from_wire_empty_path() {
        let err = PatchOperation::from_wire(&json!({
            "type": "delete_file", "path": ""
        }))
        .unwrap_err();
        assert_matches!(err, PatchShapeError::MissingPath { op: "delete_file" });
    }

    #[test]
    fn sort_groups_then_paths() {
        let mut ops = vec![
            PatchOperation::CreateFile {
                path: "b/new.ts".to_string(),
                content: String::new(),
            },
            PatchOperation::UpdateFile {
                path: "src/a.ts".to_string(),
                diff: "@@".to_string(),
            },
            PatchOperation::DeleteFile {
                path: "z.ts".to_string(),
            },
            PatchOperation::DeleteFile {
                path: "a.ts".to_string(),
            },
            PatchOperation::CreateFile {
                path: "a/new.ts".to_string(),
                content: String::new(),
            },
        ];
        sort_operations(&mut ops);
        let keys: Vec<(u8, &str)> = ops.iter().map(PatchOperation::order_key).collect();
        assert_eq!(
            keys,
            vec![
                (0, "a.ts"),
                (0, "z.ts"),
                (1, "src/a.ts"),
                (2, "a/new.ts"),
                (2, "b/new.ts"),
            ]
        );
    }

    #[test]
    fn sort_is_stable_and_repeatable() {
        let ops = vec![
            PatchOperation::DeleteFile {
                path: "m.ts".to_string(),
            },
            PatchOperation::UpdateFile {
                path: "m.ts".to_string(),
                diff: "@@ x".to_string(),
            },
        ];
        let mut first = ops.clone();
        sort_operations(&mut first);
        let mut second = first.clone();
        sort_operations(&mut second);
        assert_eq!(first, second);
    }
}
