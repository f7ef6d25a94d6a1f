//! # reel
//!
//! CLI surface for the capture engine: record validation, command grammar
//! checks, secret redaction, patch-set compilation, and full session
//! capture against on-disk trees. Every subcommand is a thin driver over
//! the library crates; the binary owns only argument parsing, logging
//! setup, and exit codes.

#![deny(unsafe_code)]

mod capture;
mod check;
mod compile;
mod redact;
mod validate;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reel_core::logging::init_subscriber;
use reel_settings::load_settings;

/// Session capture engine CLI.
#[derive(Debug, Parser)]
#[command(name = "reel", about = "Tool-trace session capture engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate training records or store envelopes in NDJSON files.
    Validate {
        /// A .ndjson file, or a directory walked for *.ndjson files.
        path: PathBuf,
    },
    /// Parse one run_cmd invocation through the command grammar.
    CheckCmd {
        /// Arguments as they would follow `pnpm`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Redact secrets from stdin to stdout (JSON-aware).
    Redact,
    /// Compile a patch set from a name-status summary and on-disk trees.
    Compile {
        /// File holding `git diff --name-status` output.
        #[arg(long)]
        name_status: PathBuf,
        /// Current working tree root.
        #[arg(long)]
        tree: PathBuf,
        /// Baseline tree root, for update diffs and baseline reads.
        #[arg(long)]
        base: Option<PathBuf>,
    },
    /// Capture the tree delta as one finalized session record.
    Capture {
        /// Task statement seeding the record's User message.
        #[arg(long)]
        task: String,
        /// Baseline git ref the delta was computed against.
        #[arg(long, default_value = "HEAD")]
        base_ref: String,
        /// File holding `git diff --name-status` output.
        #[arg(long)]
        name_status: PathBuf,
        /// Current working tree root.
        #[arg(long)]
        tree: PathBuf,
        /// Baseline tree root, for update diffs and baseline reads.
        #[arg(long)]
        base: Option<PathBuf>,
        /// Record store root; when set, append instead of printing.
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings();
    init_subscriber(&settings.logging.level);

    let ok = match cli.command {
        Commands::Validate { path } => validate::run(&path)?,
        Commands::CheckCmd { args } => check::run(&args),
        Commands::Redact => {
            redact::run()?;
            true
        }
        Commands::Compile {
            name_status,
            tree,
            base,
        } => {
            compile::run(&settings, &name_status, &tree, base.as_deref())?;
            true
        }
        Commands::Capture {
            task,
            base_ref,
            name_status,
            tree,
            base,
            store,
        } => {
            capture::run(
                &settings,
                &task,
                &base_ref,
                &name_status,
                &tree,
                base.as_deref(),
                store.as_deref(),
            )?;
            true
        }
    };
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
