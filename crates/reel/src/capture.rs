//! `reel capture` — one capture session driven from on-disk trees.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use reel_diff::FsTree;
use reel_record::RecordStore;
use reel_session::Session;
use reel_settings::ReelSettings;

/// Captures the delta between `base` and `tree` as one finalized session.
///
/// The record seeds from `task`, picks up a baseline read-back for every
/// deleted or rewritten path, and closes with the compiled apply_patch
/// exchange. With `--store` the envelope is appended to the record store
/// under that root; otherwise it prints to stdout. Skipped paths go to
/// stderr either way.
pub fn run(
    settings: &ReelSettings,
    task: &str,
    base_ref: &str,
    name_status: &Path,
    tree: &Path,
    base: Option<&Path>,
    store: Option<&Path>,
) -> Result<()> {
    let summary = fs::read_to_string(name_status)
        .with_context(|| format!("failed to read {}", name_status.display()))?;

    let mut source = FsTree::new(summary, tree);
    if let Some(base) = base {
        source = source.with_baseline_root(base);
    }

    let session = Session::start(tree, base_ref, task, settings.clone())?;
    let finalized = session.finalize(&source)?;
    for skipped in &finalized.skipped {
        eprintln!("skipped {}: {:?}", skipped.path, skipped.reason);
    }

    let envelope = finalized.envelope();
    match store {
        Some(root) => {
            let store = RecordStore::new(root);
            store.append(&envelope)?;
            println!(
                "stored session {} ({}, {} files changed) in {}",
                envelope.session_id,
                envelope.status,
                envelope.file_changes,
                store.records_path().display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&envelope)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use reel_core::message::SessionStatus;

    use super::*;

    /// Lays out baseline and current trees for one modified file.
    fn tree_pair(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
        let base = dir.join("base");
        let tree = dir.join("tree");
        fs::create_dir(&base).unwrap();
        fs::create_dir(&tree).unwrap();
        fs::write(base.join("a.ts"), "const a = 1;\n").unwrap();
        fs::write(tree.join("a.ts"), "const a = 2;\n").unwrap();
        let summary = dir.join("changes.txt");
        fs::write(&summary, "M\ta.ts\n").unwrap();
        (summary, tree, base)
    }

    #[test]
    fn captures_a_modified_file_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let (summary, tree, base) = tree_pair(dir.path());

        let settings = ReelSettings::default();
        run(
            &settings,
            "Bump the constant.",
            "main",
            &summary,
            &tree,
            Some(base.as_path()),
            None,
        )
        .unwrap();
    }

    #[test]
    fn captures_into_a_store() {
        let dir = tempfile::tempdir().unwrap();
        let (summary, tree, base) = tree_pair(dir.path());
        let store_root = dir.path().join("records");

        let settings = ReelSettings::default();
        run(
            &settings,
            "Bump the constant.",
            "main",
            &summary,
            &tree,
            Some(base.as_path()),
            Some(store_root.as_path()),
        )
        .unwrap();

        let stored = RecordStore::new(&store_root).load_all().unwrap();
        assert_eq!(stored.len(), 1);
        // No check run was observed, so the capture lands as a draft.
        assert_eq!(stored[0].status, SessionStatus::Draft);
        assert_eq!(stored[0].file_changes, 1);
    }
}
