//! `reel check-cmd` — one-shot command grammar check.

use reel_grammar::parse;

/// Parses `args` and prints either the command shape or the rejection.
///
/// Returns `false` on rejection so the binary exits non-zero.
pub fn run(args: &[String]) -> bool {
    match parse(args) {
        Ok(command) => {
            println!("{command:#?}");
            println!("canonical: pnpm {}", command.canonical_args().join(" "));
            true
        }
        Err(err) => {
            println!("rejected: {err}");
            false
        }
    }
}
