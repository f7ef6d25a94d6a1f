//! Tokenizer for command argument vectors.
//!
//! Arguments arrive pre-split (a `string[]` on the wire), so tokenization is
//! classification only: each argument becomes exactly one token, and no
//! argument is ever split or merged. The parser assigns meaning by position —
//! `-D` is only a dev flag where the grammar allows one.

/// One classified argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// `--filter`, introducing a workspace selector.
    Filter,
    /// `-r`, requesting recursive execution.
    Recursive,
    /// A dev-dependency flag; the original spelling is kept for diagnostics.
    Dev(String),
    /// Any other argument starting with `-`.
    Flag(String),
    /// A plain word: verb, selector, or package candidate.
    Word(String),
}

impl Token {
    /// The argument as the user spelled it.
    #[must_use]
    pub fn as_raw(&self) -> &str {
        match self {
            Self::Filter => "--filter",
            Self::Recursive => "-r",
            Self::Dev(raw) | Self::Flag(raw) | Self::Word(raw) => raw,
        }
    }
}

/// Accepted spellings of the dev-dependency flag.
const DEV_FLAGS: [&str; 3] = ["-D", "--save-dev", "--save-dev=true"];

/// Classify each argument into a [`Token`].
///
/// Total: every string maps to exactly one token. `--filter=web` style
/// (equals-joined) is *not* recognized as a filter — the grammar accepts
/// only the two-argument form, so it falls through to [`Token::Flag`].
#[must_use]
pub fn tokenize(args: &[String]) -> Vec<Token> {
    args.iter()
        .map(|arg| match arg.as_str() {
            "--filter" => Token::Filter,
            "-r" => Token::Recursive,
            raw if DEV_FLAGS.contains(&raw) => Token::Dev(raw.to_string()),
            raw if raw.starts_with('-') => Token::Flag(raw.to_string()),
            raw => Token::Word(raw.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn classifies_known_flags() {
        let tokens = tokenize(&args(&["--filter", "-r", "-D", "--save-dev", "--save-dev=true"]));
        assert_eq!(
            tokens,
            vec![
                Token::Filter,
                Token::Recursive,
                Token::Dev("-D".to_string()),
                Token::Dev("--save-dev".to_string()),
                Token::Dev("--save-dev=true".to_string()),
            ]
        );
    }

    #[test]
    fn words_and_unknown_flags() {
        let tokens = tokenize(&args(&["lint", "web", "--frozen-lockfile", "-x", ""]));
        assert_eq!(
            tokens,
            vec![
                Token::Word("lint".to_string()),
                Token::Word("web".to_string()),
                Token::Flag("--frozen-lockfile".to_string()),
                Token::Flag("-x".to_string()),
                Token::Word(String::new()),
            ]
        );
    }

    #[test]
    fn equals_joined_filter_is_not_a_filter() {
        let tokens = tokenize(&args(&["--filter=web"]));
        assert_eq!(tokens, vec![Token::Flag("--filter=web".to_string())]);
    }

    #[test]
    fn save_dev_false_is_not_a_dev_flag() {
        let tokens = tokenize(&args(&["--save-dev=false"]));
        assert_eq!(tokens, vec![Token::Flag("--save-dev=false".to_string())]);
    }

    #[test]
    fn raw_spelling_preserved() {
        for raw in ["--filter", "-r", "-D", "--save-dev", "weird pkg"] {
            let tokens = tokenize(&args(&[raw]));
            assert_eq!(tokens[0].as_raw(), raw);
        }
    }
}
