//! # Command line sessions
//!
//! ## Overview
//!
//! [ExSession] ties the [line editor](crate::cmdline) and the [interpreter](crate::ex)
//! together around one [Store] and one set of [ExOptions]. An editor usually keeps a single
//! session for its whole lifetime, so that history, digraphs and alternate files carry over
//! from one command line to the next.
//!
//! ## Example
//!
//! ```
//! use excmd::memory::{MemoryHost, MemoryScreen};
//! use excmd::session::ExSession;
//!
//! let mut host = MemoryHost::new(&["a", "b", "c"]);
//! let mut screen = MemoryScreen::default();
//! let mut session = ExSession::default();
//!
//! session.set_digraph('h', 'h', '\u{2500}');
//! assert_eq!(session.compose_digraph('h', 'h'), '\u{2500}');
//!
//! session.run_command_string("2", &mut host, &mut screen).unwrap();
//! assert_eq!(host.cursor(), 2);
//! ```
use crate::cmdline::LineEditor;
use crate::errors::CommandResult;
use crate::ex::Interpreter;
use crate::host::{Abbreviations, ExHost, Glob, KeySource, Screen};
use crate::options::ExOptions;
use crate::store::Store;

/// Command line state that persists between command lines.
#[derive(Clone, Debug, Default)]
pub struct ExSession {
    /// History, digraphs, file names and completions.
    pub store: Store,

    /// Current options.
    pub opts: ExOptions,
}

impl ExSession {
    /// Create a session using the given options.
    pub fn new(opts: ExOptions) -> Self {
        ExSession { store: Store::default(), opts }
    }

    /// Edit a line after showing `prompt`, without running it.
    ///
    /// This is useful for prompts like `/` whose lines aren't Ex commands, but which should still
    /// share the history and the digraphs.
    pub fn edit_line<K, H, S>(
        &mut self,
        prompt: char,
        keys: &mut K,
        host: &H,
        screen: &mut S,
    ) -> CommandResult<Option<String>>
    where
        K: KeySource + ?Sized,
        H: Glob + Abbreviations,
        S: Screen + ?Sized,
    {
        let mut editor = LineEditor::new(prompt, &self.opts);

        editor.edit(keys, screen, host, &mut self.store, &self.opts)
    }

    /// Edit a command line after showing `first_char`, and run it once it's submitted.
    ///
    /// Returns whether a line was submitted. If running it fails, the error has already been
    /// shown on `screen`, and is returned as well.
    pub fn run_command_line<K, H, S>(
        &mut self,
        first_char: char,
        keys: &mut K,
        host: &mut H,
        screen: &mut S,
    ) -> CommandResult<bool>
    where
        K: KeySource + ?Sized,
        H: ExHost,
        S: Screen,
    {
        let Some(text) = self.edit_line(first_char, keys, &*host, screen)? else {
            return Ok(false);
        };

        self.run_command_string(&text, host, screen)?;

        return Ok(true);
    }

    /// Run a command line that didn't come from the line editor, like one read from a file.
    pub fn run_command_string<H, S>(
        &mut self,
        text: &str,
        host: &mut H,
        screen: &mut S,
    ) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        Interpreter::new(&mut self.store, &self.opts).run(text, host, screen)
    }

    /// The character that `c1` and `c2` combine into, or `c2` if they don't form a digraph.
    pub fn compose_digraph(&self, c1: char, c2: char) -> char {
        self.store.digraphs.lookup(c1, c2)
    }

    /// Define a digraph. Setting it to `'\0'` removes it.
    pub fn set_digraph(&mut self, c1: char, c2: char, c: char) {
        self.store.digraphs.put(c1, c2, c);
    }

    /// All digraphs, in the order `:digraphs` shows them.
    pub fn list_digraphs(&self) -> Vec<((char, char), char)> {
        self.store.digraphs.list()
    }
}
