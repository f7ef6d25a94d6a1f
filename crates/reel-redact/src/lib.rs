//! # reel-redact
//!
//! Secret scrubbing for captured tool traces. Three pattern families are
//! applied to every string leaf, in order:
//!
//! - **Token shapes**: `sk-…`, GitHub `ghp_`/`github_pat_…`, Slack
//!   `xox…`, AWS `AKIA…` access key ids
//! - **Assignments**: `PASSWORD=…`, `api_key: …`, `Authorization: Bearer …`
//!   (the key is kept, the value becomes the sentinel)
//! - **JWTs**: three dot-joined base64url segments starting `eyJ`
//!
//! Every match becomes [`SENTINEL`]. Redaction is irreversible and
//! idempotent: one pass reaches a fixed point, so re-scrubbing stored data
//! is always safe. [`redact_value`] walks nested JSON, touching string
//! values only — object keys and non-string leaves pass through.
//!
//! ## Crate Position
//!
//! Leaf crate. `reel-session` scrubs tool-result content (after output
//! capping) and command environment values before they enter a record;
//! the CLI exposes the same filter for ad-hoc use.

#![deny(unsafe_code)]

pub mod filter;

pub use filter::{SENTINEL, contains_secret, redact_text, redact_value};
