//! # reel-session
//!
//! The capture lifecycle tying the other crates together. A [`Session`]
//! moves NotStarted → Recording → Finalized/Discarded:
//!
//! - **start**: v7 session id, start timestamp, seeded System preamble and
//!   User task
//! - **observe**: read/search/list/command activity appended as
//!   call/result pairs with sequential `call_N` ids; results are capped,
//!   then redacted; commands must clear the grammar or nothing is recorded
//! - **finalize**: classify → filter → compile over a
//!   [`TreeSource`](reel_diff::TreeSource), baseline read-backs, the single
//!   apply_patch exchange, full validation, status derivation
//!
//! Terminal states consume the session value, so recording into a closed
//! capture is unrepresentable.
//!
//! ## Crate Position
//!
//! Top of the library stack: depends on every other `reel-*` crate. The
//! editor integration drives sessions through this crate; the CLI's
//! `capture` command does the same over on-disk trees.

#![deny(unsafe_code)]

pub mod session;

pub use session::{BASELINE_UNAVAILABLE, FinalizedSession, Session, SessionError};
