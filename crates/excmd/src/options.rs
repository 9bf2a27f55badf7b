//! # Options
//!
//! ## Overview
//!
//! Settings that change how the command line behaves. Hosts usually load these from their own
//! configuration files, so [ExOptions] can be deserialized with any missing field taking its
//! default value.
//!
//! ```
//! use excmd::options::ExOptions;
//!
//! let opts = ExOptions::default();
//! assert_eq!(opts.history, 20);
//! assert_eq!(opts.wildchar, '\t');
//! ```
use serde::{Deserialize, Serialize};

/// Options for the line editor and the command interpreter.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(default)]
pub struct ExOptions {
    /// Number of command lines to remember.
    pub history: usize,

    /// Whether `{char1} <BS> {char2}` composes a digraph.
    pub digraph: bool,

    /// The key that starts filename completion.
    pub wildchar: char,

    /// File suffixes that get lower priority when completing filenames.
    pub suffixes: Vec<String>,

    /// Whether abbreviations get expanded on the command line.
    pub abbreviations: bool,

    /// Maximum length of a command line.
    pub max_length: usize,

    /// How deeply `:source`, `:@` and `:edit +cmd` may nest.
    pub max_depth: usize,
}

impl Default for ExOptions {
    fn default() -> Self {
        ExOptions {
            history: 20,
            digraph: false,
            wildchar: '\t',
            suffixes: strs![".bak", ".o", ".h", ".info", ".swp"],
            abbreviations: true,
            max_length: 256,
            max_depth: 100,
        }
    }
}

impl ExOptions {
    /// Whether a completed name ends in one of the low-priority [suffixes](Self::suffixes).
    pub fn is_ignored_suffix(&self, name: &str) -> bool {
        self.suffixes.iter().any(|s| !s.is_empty() && name.ends_with(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial() {
        let opts: ExOptions = serde_json::from_str(r#"{"history": 50, "digraph": true}"#).unwrap();

        assert_eq!(opts.history, 50);
        assert_eq!(opts.digraph, true);
        assert_eq!(opts.wildchar, '\t');
        assert_eq!(opts.max_length, 256);
        assert_eq!(opts.suffixes, ExOptions::default().suffixes);
    }

    #[test]
    fn test_ignored_suffix() {
        let mut opts = ExOptions::default();

        assert!(opts.is_ignored_suffix("main.o"));
        assert!(opts.is_ignored_suffix("notes.bak"));
        assert!(!opts.is_ignored_suffix("main.c"));

        opts.suffixes = vec![];
        assert!(!opts.is_ignored_suffix("main.o"));
    }
}
