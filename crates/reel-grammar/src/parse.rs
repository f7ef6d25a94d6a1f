//! Recursive-descent parser over tokenized pnpm arguments.
//!
//! Grammar:
//!
//! ```text
//! invocation    := filtered | recursive | bare
//! filtered      := "--filter" SELECTOR (lintTestBuild | installWord | addClause | removeClause)
//! recursive     := "-r" lintTestBuild
//! bare          := lintTestBuild | installWord | addClause | removeClause
//! addClause     := "add" [devFlag] PACKAGE+
//! removeClause  := "remove" PACKAGE+
//! lintTestBuild := "lint" | "test" | "build"
//! installWord   := "i" | "install"
//! devFlag       := "-D" | "--save-dev" | "--save-dev=true"
//! ```
//!
//! The parser is total and side-effect-free: every argument vector yields
//! exactly one [`AllowedCommand`] or one [`GrammarError`] naming the branch
//! that almost matched. Nothing is ever executed here.

use crate::command::AllowedCommand;
use crate::token::{Token, tokenize};

/// Why an argument vector failed to match any production.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// No arguments at all.
    #[error("empty command: expected lint, test, build, i, install, add, or remove")]
    Empty,
    /// Both `--filter` and `-r` in one invocation.
    #[error("--filter and -r are mutually exclusive")]
    MutuallyExclusiveFlags,
    /// `--filter` with nothing after it.
    #[error("--filter requires a selector")]
    MissingSelector,
    /// Selector empty, whitespace-bearing, or flag-shaped.
    #[error("invalid selector {0:?}: selectors are non-empty, contain no whitespace, and do not start with '-'")]
    InvalidSelector(String),
    /// `--filter SELECTOR` with no verb after it.
    #[error("expected a command verb after --filter {0:?}")]
    MissingVerb(String),
    /// `-r` with nothing after it.
    #[error("-r requires a verb: lint, test, or build")]
    MissingRecursiveVerb,
    /// `-r` applied to a verb outside lint/test/build.
    #[error("-r only applies to lint, test, or build (got {0:?})")]
    RecursiveUnsupported(String),
    /// First word not in the allowlist.
    #[error("unknown command {0:?}: expected lint, test, build, i, install, add, or remove")]
    UnknownCommand(String),
    /// `add`/`remove` with an empty package list.
    #[error("{0} requires at least one package")]
    MissingPackages(&'static str),
    /// Package empty, whitespace-bearing, or flag-shaped.
    #[error("invalid package {0:?}: packages are non-empty, contain no whitespace, and do not start with '-'")]
    InvalidPackage(String),
    /// `--filter` after the verb instead of before it.
    #[error("--filter must appear before the command verb")]
    FilterAfterVerb,
    /// Extra arguments after a complete command.
    #[error("unexpected trailing token {0:?} after a complete {1} command")]
    TrailingTokens(String, &'static str),
}

/// Parse an argument vector against the allowlist grammar.
///
/// Returns the single [`AllowedCommand`] the vector means, or the first
/// [`GrammarError`] encountered left to right.
pub fn parse(args: &[String]) -> Result<AllowedCommand, GrammarError> {
    let tokens = tokenize(args);
    let mut parser = Parser::new(&tokens);
    let command = parser.invocation()?;
    parser.finish(&command)?;
    Ok(command)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // ── productions ──────────────────────────────────────────────────────

    fn invocation(&mut self) -> Result<AllowedCommand, GrammarError> {
        match self.peek() {
            None => Err(GrammarError::Empty),
            Some(Token::Filter) => {
                let _ = self.advance();
                self.filtered()
            }
            Some(Token::Recursive) => {
                let _ = self.advance();
                self.recursive()
            }
            Some(Token::Word(_)) => self.bare(None),
            Some(token @ (Token::Dev(_) | Token::Flag(_))) => {
                Err(GrammarError::UnknownCommand(token.as_raw().to_string()))
            }
        }
    }

    /// `filtered := "--filter" SELECTOR (lintTestBuild | installWord | addClause | removeClause)`
    fn filtered(&mut self) -> Result<AllowedCommand, GrammarError> {
        let selector = match self.advance() {
            None => return Err(GrammarError::MissingSelector),
            Some(Token::Recursive) => return Err(GrammarError::MutuallyExclusiveFlags),
            Some(Token::Word(word)) if valid_name(word) => word.clone(),
            Some(token) => return Err(GrammarError::InvalidSelector(token.as_raw().to_string())),
        };
        if self.peek().is_none() {
            return Err(GrammarError::MissingVerb(selector));
        }
        if let Some(Token::Recursive) = self.peek() {
            return Err(GrammarError::MutuallyExclusiveFlags);
        }
        self.bare(Some(selector))
    }

    /// `recursive := "-r" lintTestBuild`
    fn recursive(&mut self) -> Result<AllowedCommand, GrammarError> {
        match self.advance() {
            None => Err(GrammarError::MissingRecursiveVerb),
            Some(Token::Filter) => Err(GrammarError::MutuallyExclusiveFlags),
            Some(Token::Word(word)) => match word.as_str() {
                "lint" => Ok(AllowedCommand::Lint {
                    filter: None,
                    recursive: true,
                }),
                "test" => Ok(AllowedCommand::Test {
                    filter: None,
                    recursive: true,
                }),
                "build" => Ok(AllowedCommand::Build {
                    filter: None,
                    recursive: true,
                }),
                other => Err(GrammarError::RecursiveUnsupported(other.to_string())),
            },
            Some(token) => Err(GrammarError::RecursiveUnsupported(
                token.as_raw().to_string(),
            )),
        }
    }

    /// `bare := lintTestBuild | installWord | addClause | removeClause`
    ///
    /// Also the tail of `filtered`, with the selector threaded through.
    fn bare(&mut self, filter: Option<String>) -> Result<AllowedCommand, GrammarError> {
        let verb = match self.advance() {
            Some(Token::Word(word)) => word.as_str(),
            Some(token) => return Err(GrammarError::UnknownCommand(token.as_raw().to_string())),
            None => return Err(GrammarError::Empty),
        };
        match verb {
            "lint" => Ok(AllowedCommand::Lint {
                filter,
                recursive: false,
            }),
            "test" => Ok(AllowedCommand::Test {
                filter,
                recursive: false,
            }),
            "build" => Ok(AllowedCommand::Build {
                filter,
                recursive: false,
            }),
            "i" | "install" => Ok(AllowedCommand::Install { filter }),
            "add" => self.add_clause(filter),
            "remove" => {
                let packages = self.packages("remove")?;
                Ok(AllowedCommand::Remove { filter, packages })
            }
            other => Err(GrammarError::UnknownCommand(other.to_string())),
        }
    }

    /// `addClause := "add" [devFlag] PACKAGE+`
    fn add_clause(&mut self, filter: Option<String>) -> Result<AllowedCommand, GrammarError> {
        let dev = if let Some(Token::Dev(_)) = self.peek() {
            let _ = self.advance();
            true
        } else {
            false
        };
        let packages = self.packages("add")?;
        Ok(AllowedCommand::Add {
            filter,
            dev,
            packages,
        })
    }

    /// `PACKAGE+` — consumes the rest of the input.
    fn packages(&mut self, verb: &'static str) -> Result<Vec<String>, GrammarError> {
        let mut packages = Vec::new();
        while let Some(token) = self.peek() {
            match token {
                Token::Word(word) if valid_name(word) => {
                    packages.push(word.clone());
                    let _ = self.advance();
                }
                Token::Filter => return Err(GrammarError::FilterAfterVerb),
                Token::Recursive => {
                    return Err(GrammarError::RecursiveUnsupported(verb.to_string()));
                }
                token => return Err(GrammarError::InvalidPackage(token.as_raw().to_string())),
            }
        }
        if packages.is_empty() {
            return Err(GrammarError::MissingPackages(verb));
        }
        Ok(packages)
    }

    /// Reject leftover input, naming the flag conflict when that is the
    /// actual problem.
    fn finish(&mut self, command: &AllowedCommand) -> Result<(), GrammarError> {
        let Some(token) = self.peek() else {
            return Ok(());
        };
        match token {
            Token::Recursive if command.filter().is_some() => {
                Err(GrammarError::MutuallyExclusiveFlags)
            }
            Token::Filter => {
                let recursive = matches!(
                    command,
                    AllowedCommand::Lint { recursive: true, .. }
                        | AllowedCommand::Test { recursive: true, .. }
                        | AllowedCommand::Build { recursive: true, .. }
                );
                if recursive {
                    Err(GrammarError::MutuallyExclusiveFlags)
                } else {
                    Err(GrammarError::FilterAfterVerb)
                }
            }
            token => Err(GrammarError::TrailingTokens(
                token.as_raw().to_string(),
                command.verb(),
            )),
        }
    }
}

/// Selector/package token rule: non-empty, no whitespace, no leading `-`.
///
/// Leading `-` is already impossible for [`Token::Word`]; checked anyway so
/// the rule reads complete at its one point of truth.
fn valid_name(word: &str) -> bool {
    !word.is_empty() && !word.starts_with('-') && !word.chars().any(char::is_whitespace)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
