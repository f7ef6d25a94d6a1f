//! `reel compile` — patch-set compilation over on-disk trees.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use reel_diff::{FsTree, PathFilter, parse_name_status};
use reel_settings::ReelSettings;

/// Compiles a name-status summary against `tree` (and optionally `base`)
/// and prints the resulting report as JSON.
pub fn run(
    settings: &ReelSettings,
    name_status: &Path,
    tree: &Path,
    base: Option<&Path>,
) -> Result<()> {
    let summary = fs::read_to_string(name_status)
        .with_context(|| format!("failed to read {}", name_status.display()))?;
    let filter = PathFilter::new(
        &settings.capture.path_filter.include,
        &settings.capture.path_filter.exclude,
    )?;
    let changes = parse_name_status(&summary, &filter);

    let mut source = FsTree::new(summary.as_str(), tree);
    if let Some(base) = base {
        source = source.with_baseline_root(base);
    }

    let report = reel_diff::compile(&changes, &source);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
