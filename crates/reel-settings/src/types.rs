//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON file
//! format the TypeScript extension writes. Each type implements [`Default`]
//! with production values, and `#[serde(default)]` allows partial JSON —
//! missing fields fall back to their defaults during deserialization.

use serde::{Deserialize, Serialize};

/// Floor applied to `outputCapBytes` during validation. Below this the cap
/// indicator itself would not fit.
pub const MIN_OUTPUT_CAP_BYTES: usize = 64;

/// Root settings for the capture engine.
///
/// Loaded from `~/.reel/settings.json` with defaults for missing fields and
/// `REEL_*` environment overrides on top.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReelSettings {
    /// Session capture behavior.
    pub capture: CaptureSettings,
    /// Secret redaction behavior.
    pub redaction: RedactionSettings,
    /// Record export destinations.
    pub export: ExportSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for ReelSettings {
    fn default() -> Self {
        Self {
            capture: CaptureSettings::default(),
            redaction: RedactionSettings::default(),
            export: ExportSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ReelSettings {
    /// Correct out-of-range values in place.
    ///
    /// Called during loading. Values are clamped with a warning rather than
    /// rejected, so a bad settings file degrades instead of failing startup.
    pub fn validate(&mut self) {
        let cap = &mut self.capture;
        if cap.command_timeout_ms < 1 || cap.command_timeout_ms > 3_600_000 {
            let clamped = cap.command_timeout_ms.clamp(1, 3_600_000);
            tracing::warn!(
                "commandTimeoutMs out of range ({}), clamped to {clamped}",
                cap.command_timeout_ms
            );
            cap.command_timeout_ms = clamped;
        }
        if cap.output_cap_bytes < MIN_OUTPUT_CAP_BYTES {
            tracing::warn!(
                "outputCapBytes too small ({}), raised to {MIN_OUTPUT_CAP_BYTES}",
                cap.output_cap_bytes
            );
            cap.output_cap_bytes = MIN_OUTPUT_CAP_BYTES;
        }
    }
}

/// Session capture behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureSettings {
    /// Byte cap applied to captured tool output before redaction.
    pub output_cap_bytes: usize,
    /// Timeout handed to the command executor, in milliseconds.
    pub command_timeout_ms: u64,
    /// Glob filter deciding which changed paths enter the patch set.
    pub path_filter: PathFilterSettings,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            output_cap_bytes: 16_384,
            command_timeout_ms: 600_000,
            path_filter: PathFilterSettings::default(),
        }
    }
}

/// Include/exclude globs for changed paths.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathFilterSettings {
    /// Globs a path must match to be captured.
    pub include: Vec<String>,
    /// Globs that exclude a path even when included.
    pub exclude: Vec<String>,
}

impl Default for PathFilterSettings {
    fn default() -> Self {
        Self {
            include: vec!["**/*".to_string()],
            exclude: vec![
                ".git/**".to_string(),
                "node_modules/**".to_string(),
                "dist/**".to_string(),
            ],
        }
    }
}

/// Secret redaction behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedactionSettings {
    /// Whether captured output is scrubbed before it enters the record.
    pub enabled: bool,
}

impl Default for RedactionSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Record export destinations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    /// Directory the record store appends to.
    pub directory: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: "~/.reel/records".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
