//! # reel-grammar
//!
//! Closed-grammar parser for the `run_cmd` tool. Only invocations of the
//! pnpm allowlist are representable:
//!
//! - **lint / test / build**: bare, `--filter <selector>`, or `-r`
//! - **i / install**: bare or filtered
//! - **add**: filtered or bare, optional dev flag, one or more packages
//! - **remove**: filtered or bare, one or more packages
//!
//! `--filter` and `-r` are mutually exclusive. Selectors and packages are
//! opaque strings: non-empty, no whitespace, no leading `-`. Anything the
//! grammar does not produce is rejected with a [`GrammarError`] naming the
//! offending token, so a failed parse can be surfaced verbatim.
//!
//! Parsing is the whole job. This crate never spawns a process and never
//! touches the filesystem, which is what makes an [`AllowedCommand`] safe
//! to re-execute elsewhere.
//!
//! ## Crate Position
//!
//! Leaf crate beside `reel-core`. `reel-record` parses recorded `run_cmd`
//! arguments through [`parse`]; `reel-session` parses them at capture time
//! so malformed commands are dropped before they reach a record.

#![deny(unsafe_code)]

pub mod command;
pub mod parse;
pub mod token;

pub use command::AllowedCommand;
pub use parse::{GrammarError, parse};
pub use token::{Token, tokenize};
