//! `reel redact` — stdin-to-stdout secret scrubbing.

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use reel_redact::{redact_text, redact_value};
use serde_json::Value;

/// Redacts stdin to stdout.
///
/// Input that parses as JSON is walked value-wise (keys untouched) and
/// re-emitted pretty-printed; anything else is treated as plain text.
pub fn run() -> Result<()> {
    let mut input = String::new();
    let _ = io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let mut stdout = io::stdout().lock();
    match serde_json::from_str::<Value>(&input) {
        Ok(mut value) => {
            redact_value(&mut value);
            let encoded = serde_json::to_string_pretty(&value)?;
            writeln!(stdout, "{encoded}")?;
        }
        Err(_) => {
            stdout.write_all(redact_text(&input).as_bytes())?;
        }
    }
    stdout.flush()?;
    Ok(())
}
