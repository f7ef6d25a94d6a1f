//! Command invocations as recorded in a `run_cmd` tool call.
//!
//! The invocation is the raw request handed to the process-spawning layer;
//! classification against the allowlist grammar happens separately and never
//! executes anything.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The only program an invocation may name.
pub const ALLOWED_PROGRAM: &str = "pnpm";

/// Minimum accepted `timeoutMs`.
pub const MIN_TIMEOUT_MS: u64 = 1;

/// Maximum accepted `timeoutMs` (one hour).
pub const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// A recorded command invocation: program, argument vector, and the spawn
/// options the executor honored. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInvocation {
    /// Program name. Always [`ALLOWED_PROGRAM`] in a valid record.
    pub cmd: String,
    /// Argument vector, excluding the program itself.
    pub args: Vec<String>,
    /// Working directory the command ran in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Timeout applied by the executor, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Extra environment variables. BTreeMap keeps serialization stable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
}

impl CommandInvocation {
    /// Build a bare invocation of [`ALLOWED_PROGRAM`] with `args`.
    #[must_use]
    pub fn pnpm(args: Vec<String>) -> Self {
        Self {
            cmd: ALLOWED_PROGRAM.to_string(),
            args,
            cwd: None,
            timeout_ms: None,
            env: None,
        }
    }

    /// Whether `timeout_ms`, if present, is inside the accepted range.
    #[must_use]
    pub fn timeout_in_range(&self) -> bool {
        match self.timeout_ms {
            None => true,
            Some(ms) => (MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&ms),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
