//! # reel-core
//!
//! Shared vocabulary for the Reel session-capture engine.
//!
//! This crate provides the data model that every other reel crate speaks:
//!
//! - **Messages**: [`message::Message`] enum with `System`, `User`,
//!   `AssistantText`, `AssistantToolCalls`, `ToolResult` variants, plus
//!   [`message::ToolCall`] and the closed [`message::ToolName`] set
//! - **Patch operations**: [`patch::PatchOperation`] with the
//!   deletes/updates/creates ordering contract
//! - **Command invocations**: [`command::CommandInvocation`] and the timeout
//!   bounds recorded alongside each `run_cmd` call
//! - **Records**: [`message::TrainingRecord`] and [`message::SessionStatus`]
//! - **Text**: UTF-8-safe truncation and output capping in [`text`]
//! - **Logging**: [`logging::init_subscriber`] for binaries
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other reel crates.

#![deny(unsafe_code)]

pub mod command;
pub mod logging;
pub mod message;
pub mod patch;
pub mod text;
