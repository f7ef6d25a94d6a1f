//! # reel-settings
//!
//! Layered configuration for the Reel capture engine.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`ReelSettings::default()`]
//! 2. **User file** — `~/.reel/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `REEL_*` overrides (highest priority)
//!
//! There is no global singleton: the caller loads once and passes the value
//! (or a reference) to the session and CLI layers that need it. A malformed
//! or missing file degrades to defaults with a warning — settings problems
//! never fail startup.
//!
//! # Usage
//!
//! ```no_run
//! use reel_settings::load_settings;
//!
//! let settings = load_settings();
//! println!("output cap: {} bytes", settings.capture.output_cap_bytes);
//! ```

#![deny(unsafe_code)]

pub mod types;

pub use types::*;

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Errors surfaced by the settings loader.
///
/// Callers of [`load_settings`] never see these — that path degrades to
/// defaults. [`load_settings_from_path`] exposes them for tooling that wants
/// the real failure.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// Settings file is not valid JSON.
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Location of the user settings file (`~/.reel/settings.json`).
///
/// `None` when `HOME` is unset.
#[must_use]
pub fn settings_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".reel").join("settings.json"))
}

/// Load settings from the default path with env overrides.
///
/// Degrades to compiled defaults (plus env overrides) when the file is
/// missing or malformed.
#[must_use]
pub fn load_settings() -> ReelSettings {
    let mut settings = match settings_path() {
        Some(path) if path.exists() => match load_settings_from_path(&path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, ?path, "failed to load settings, using defaults");
                ReelSettings::default()
            }
        },
        _ => ReelSettings::default(),
    };
    apply_env_overrides(&mut settings);
    settings.validate();
    settings
}

/// Load settings from a specific file, deep-merged over defaults.
///
/// Env overrides are *not* applied here; [`load_settings`] owns that layer.
pub fn load_settings_from_path(path: &Path) -> Result<ReelSettings> {
    let raw = std::fs::read_to_string(path)?;
    let file_value: Value = serde_json::from_str(&raw)?;
    let defaults = serde_json::to_value(ReelSettings::default())?;
    let merged = deep_merge(defaults, file_value);
    let mut settings: ReelSettings = serde_json::from_value(merged)?;
    settings.validate();
    Ok(settings)
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key-by-key; any other overlay value replaces the base
/// value wholesale (arrays are not concatenated).
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Apply `REEL_*` environment overrides in place.
///
/// Unparseable values are ignored with a warning — an env typo should not
/// change behavior silently or crash the caller.
fn apply_env_overrides(settings: &mut ReelSettings) {
    if let Ok(level) = std::env::var("REEL_LOG_LEVEL") {
        if !level.is_empty() {
            settings.logging.level = level;
        }
    }
    if let Ok(dir) = std::env::var("REEL_EXPORT_DIR") {
        if !dir.is_empty() {
            settings.export.directory = dir;
        }
    }
    if let Ok(raw) = std::env::var("REEL_OUTPUT_CAP_BYTES") {
        match raw.parse::<usize>() {
            Ok(bytes) => settings.capture.output_cap_bytes = bytes,
            Err(_) => tracing::warn!("ignoring non-numeric REEL_OUTPUT_CAP_BYTES: {raw}"),
        }
    }
    if let Ok(raw) = std::env::var("REEL_REDACTION_ENABLED") {
        match raw.as_str() {
            "1" | "true" => settings.redaction.enabled = true,
            "0" | "false" => settings.redaction.enabled = false,
            other => tracing::warn!("ignoring unrecognized REEL_REDACTION_ENABLED: {other}"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
