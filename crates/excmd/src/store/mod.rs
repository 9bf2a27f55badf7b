//! # Shared command line state
//!
//! ## Overview
//!
//! These components hold information that outlives a single command line: previously entered
//! lines, user-defined [digraphs](DigraphTable), the current and alternate file names, and the
//! matches from the last filename completion. The line editor and the interpreter both borrow
//! the one [Store] owned by an [ExSession](crate::session::ExSession).
//!
//! ## Example
//!
//! ```
//! use excmd::store::Store;
//!
//! let mut store = Store::default();
//! store.digraphs.put('h', 'h', '\u{2500}');
//!
//! assert_eq!(store.digraphs.lookup('h', 'h'), '\u{2500}');
//! assert_eq!(store.digraphs.lookup('>', '>'), '\u{00BB}');
//! ```
use crate::completion::CompletionStore;

mod digraph;
mod files;
mod history;

pub use self::digraph::DigraphTable;
pub use self::files::{AltFile, FileRegistry, MAX_ALTERNATES};
pub use self::history::{HistoryRing, Recall};

/// State shared between the line editor and the interpreter.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// Previously entered command lines.
    pub history: HistoryRing,

    /// Digraph definitions.
    pub digraphs: DigraphTable,

    /// Current and alternate file names.
    pub files: FileRegistry,

    /// Matches from the last filename completion.
    pub completions: CompletionStore,

    /// The last command run with `:!`.
    pub shell_command: Option<String>,
}
