//! The allowlisted command shapes and their canonical argument form.

use serde::{Deserialize, Serialize};

/// Semantic intent of a successfully parsed invocation.
///
/// Producing one of these is the *only* outcome of a successful parse, and
/// each variant carries everything the invocation meant — nothing is parsed
/// twice downstream. Serialized with a `command` tag for logs and the CLI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AllowedCommand {
    /// `pnpm lint`, optionally filtered or recursive.
    Lint {
        /// Workspace selector from `--filter`.
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
        /// Whether `-r` was given.
        #[serde(default)]
        recursive: bool,
    },
    /// `pnpm test`, optionally filtered or recursive.
    Test {
        /// Workspace selector from `--filter`.
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
        /// Whether `-r` was given.
        #[serde(default)]
        recursive: bool,
    },
    /// `pnpm build`, optionally filtered or recursive.
    Build {
        /// Workspace selector from `--filter`.
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
        /// Whether `-r` was given.
        #[serde(default)]
        recursive: bool,
    },
    /// `pnpm install` (or its `i` alias), optionally filtered.
    Install {
        /// Workspace selector from `--filter`.
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
    },
    /// `pnpm add`, with at least one package.
    Add {
        /// Workspace selector from `--filter`.
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
        /// Whether a dev-dependency flag was given.
        #[serde(default)]
        dev: bool,
        /// Packages to add (non-empty).
        packages: Vec<String>,
    },
    /// `pnpm remove`, with at least one package.
    Remove {
        /// Workspace selector from `--filter`.
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
        /// Packages to remove (non-empty).
        packages: Vec<String>,
    },
}

impl AllowedCommand {
    /// The verb word for this command.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Lint { .. } => "lint",
            Self::Test { .. } => "test",
            Self::Build { .. } => "build",
            Self::Install { .. } => "install",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
        }
    }

    /// The workspace selector, if one was given.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        match self {
            Self::Lint { filter, .. }
            | Self::Test { filter, .. }
            | Self::Build { filter, .. }
            | Self::Install { filter }
            | Self::Add { filter, .. }
            | Self::Remove { filter, .. } => filter.as_deref(),
        }
    }

    /// Whether this is a lint, test, or build run — the commands that
    /// qualify a session as ready.
    #[must_use]
    pub fn is_check_run(&self) -> bool {
        matches!(
            self,
            Self::Lint { .. } | Self::Test { .. } | Self::Build { .. }
        )
    }

    /// Canonical argument vector: re-parsing it yields this exact value.
    ///
    /// Aliases collapse (`i` becomes `install`, every dev-flag spelling
    /// becomes `-D`), so two invocations with the same meaning canonicalize
    /// identically.
    #[must_use]
    pub fn canonical_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(filter) = self.filter() {
            args.push("--filter".to_string());
            args.push(filter.to_string());
        }
        match self {
            Self::Lint { recursive, .. }
            | Self::Test { recursive, .. }
            | Self::Build { recursive, .. } => {
                if *recursive {
                    args.push("-r".to_string());
                }
                args.push(self.verb().to_string());
            }
            Self::Install { .. } => {
                args.push("install".to_string());
            }
            Self::Add { dev, packages, .. } => {
                args.push("add".to_string());
                if *dev {
                    args.push("-D".to_string());
                }
                args.extend(packages.iter().cloned());
            }
            Self::Remove { packages, .. } => {
                args.push("remove".to_string());
                args.extend(packages.iter().cloned());
            }
        }
        args
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_bare_verb() {
        let cmd = AllowedCommand::Lint {
            filter: None,
            recursive: false,
        };
        assert_eq!(cmd.canonical_args(), vec!["lint"]);
    }

    #[test]
    fn canonical_recursive() {
        let cmd = AllowedCommand::Test {
            filter: None,
            recursive: true,
        };
        assert_eq!(cmd.canonical_args(), vec!["-r", "test"]);
    }

    #[test]
    fn canonical_filtered_add_with_dev() {
        let cmd = AllowedCommand::Add {
            filter: Some("web".to_string()),
            dev: true,
            packages: vec!["eslint".to_string(), "prettier".to_string()],
        };
        assert_eq!(
            cmd.canonical_args(),
            vec!["--filter", "web", "add", "-D", "eslint", "prettier"]
        );
    }

    #[test]
    fn canonical_install_collapses_alias() {
        let cmd = AllowedCommand::Install {
            filter: Some("api".to_string()),
        };
        assert_eq!(cmd.canonical_args(), vec!["--filter", "api", "install"]);
    }

    #[test]
    fn is_check_run_covers_lint_test_build_only() {
        assert!(AllowedCommand::Lint { filter: None, recursive: false }.is_check_run());
        assert!(AllowedCommand::Test { filter: None, recursive: true }.is_check_run());
        assert!(AllowedCommand::Build { filter: Some("x".to_string()), recursive: false }.is_check_run());
        assert!(!AllowedCommand::Install { filter: None }.is_check_run());
        assert!(!AllowedCommand::Add {
            filter: None,
            dev: false,
            packages: vec!["p".to_string()]
        }
        .is_check_run());
        assert!(!AllowedCommand::Remove {
            filter: None,
            packages: vec!["p".to_string()]
        }
        .is_check_run());
    }

    #[test]
    fn serializes_with_command_tag() {
        let cmd = AllowedCommand::Add {
            filter: Some("web".to_string()),
            dev: true,
            packages: vec!["eslint".to_string()],
        };
        let wire = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            wire,
            json!({
                "command": "add",
                "filter": "web",
                "dev": true,
                "packages": ["eslint"],
            })
        );
    }

    #[test]
    fn filter_omitted_when_absent() {
        let wire = serde_json::to_value(AllowedCommand::Build {
            filter: None,
            recursive: false,
        })
        .unwrap();
        assert_eq!(wire, json!({"command": "build", "recursive": false}));
    }
}
