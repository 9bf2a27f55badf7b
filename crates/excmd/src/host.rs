//! # Host collaborators
//!
//! ## Overview
//!
//! The command line doesn't own a text buffer, a screen or a filesystem. Whoever embeds it
//! provides those through the traits in this module:
//!
//! - [KeySource] and [Screen] are the terminal side, used while editing a command line.
//! - [LineBuffer], [Marks], [FileService], [Glob], [Abbreviations] and [CommandHandler] are the
//!   editor side, used while resolving and running commands. Anything that implements all of
//!   them is an [ExHost].
//!
//! [crate::memory] has in-memory implementations of all of these.
use std::collections::VecDeque;
use std::io;

use bitflags::bitflags;
use regex::Regex;

use crate::errors::CommandResult;
use crate::ex::{ExCommand, LineRange};
use crate::key::TerminalKey;
use crate::util::translate_char;

/// Direction to move in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveDir1D {
    /// Towards the start of the buffer.
    Previous,

    /// Towards the end of the buffer.
    Next,
}

bitflags! {
    /// These flags are used to specify the behaviour while writing a file.
    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    pub struct WriteFlags: u32 {
        /// No flags set.
        const NONE = 0b00000000;

        /// Overwrite existing or read-only files.
        const FORCE = 0b00000001;

        /// Append to the end of the file.
        const APPEND = 0b00000010;
    }
}

/// What caused an abbreviation check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AbbrevTrigger {
    /// A non-identifier character is about to be inserted.
    Char(char),

    /// The line is about to be submitted.
    Submit,
}

/// Where keys come from.
pub trait KeySource {
    /// Wait for the next key.
    fn next_key(&mut self) -> io::Result<TerminalKey>;

    /// Whether the last key came from the user, rather than a mapping or a macro.
    fn typed(&self) -> bool {
        true
    }
}

impl KeySource for VecDeque<TerminalKey> {
    fn next_key(&mut self) -> io::Result<TerminalKey> {
        self.pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more keys"))
    }
}

/// Where the command line gets drawn.
///
/// Columns count screen cells from the start of the command line, including the prompt
/// character.
pub trait Screen {
    /// Clear the command line.
    fn clear_line(&mut self) -> io::Result<()>;

    /// Write `text` starting at column `col`, erasing whatever was after it.
    fn write_at(&mut self, col: usize, text: &str) -> io::Result<()>;

    /// Place the cursor at column `col`.
    fn set_cursor(&mut self, col: usize) -> io::Result<()>;

    /// Ring the bell.
    fn beep(&mut self) -> io::Result<()>;

    /// Width of the screen.
    fn columns(&self) -> usize;

    /// Show a message below the command line.
    fn message(&mut self, msg: &str) -> io::Result<()>;

    /// Write a single character at `col`, returning its width.
    fn write_char(&mut self, col: usize, c: char) -> io::Result<usize> {
        self.write_translated(col, c.encode_utf8(&mut [0; 4]))
    }

    /// Write `text` at `col` with control characters shown as `^X`, returning its width.
    fn write_translated(&mut self, col: usize, text: &str) -> io::Result<usize> {
        let shown: String = text.chars().map(translate_char).collect();

        self.write_at(col, &shown)?;

        Ok(crate::util::str_width(&shown))
    }
}

/// The buffer that commands operate on.
pub trait LineBuffer {
    /// Number of lines in the buffer.
    fn line_count(&self) -> usize;

    /// The line the cursor is on, starting from 1.
    fn cursor_line(&self) -> usize;

    /// Move the cursor to line `lnum`.
    fn set_cursor_line(&mut self, lnum: usize);

    /// The text of line `lnum`, if it exists.
    fn line_text(&self, lnum: usize) -> Option<String>;

    /// Whether the buffer has unsaved changes.
    fn modified(&self) -> bool;

    /// Whether the buffer is read-only.
    fn readonly(&self) -> bool {
        false
    }
}

/// Find the first line in `buf` matching `re`, starting at `start` (inclusive) and moving in
/// `dir`, wrapping around the ends of the buffer.
///
/// Hosts without a search engine of their own can use this to implement
/// [Marks::search_from].
pub fn search_lines<B>(buf: &B, start: usize, re: &Regex, dir: MoveDir1D) -> Option<usize>
where
    B: LineBuffer + ?Sized,
{
    let count = buf.line_count();
    let mut lnum = start.min(count).max(1);

    for _ in 0..count {
        if buf.line_text(lnum).is_some_and(|text| re.is_match(&text)) {
            return Some(lnum);
        }

        lnum = match dir {
            MoveDir1D::Next if lnum >= count => 1,
            MoveDir1D::Next => lnum + 1,
            MoveDir1D::Previous if lnum <= 1 => count,
            MoveDir1D::Previous => lnum - 1,
        };
    }

    return None;
}

/// Line lookups for addresses.
pub trait Marks {
    /// The line that mark `name` is on.
    fn mark_line(&self, name: char) -> Option<usize>;

    /// Find the first line matching `pattern`, starting at `start` (inclusive) and moving in
    /// `dir`, wrapping around the ends of the buffer.
    ///
    /// An empty pattern means the last pattern searched for.
    fn search_from(
        &mut self,
        start: usize,
        pattern: &str,
        dir: MoveDir1D,
    ) -> CommandResult<Option<usize>>;
}

/// File access.
pub trait FileService {
    /// Replace the buffer with the contents of `path`.
    fn load_file(&mut self, path: &str) -> CommandResult;

    /// Insert the contents of `path` after line `after`, returning how many lines were read.
    fn read_file(&mut self, path: &str, after: usize) -> CommandResult<usize>;

    /// Write lines in `range` to `path`.
    fn write_file(&mut self, path: &str, range: &LineRange, flags: WriteFlags) -> CommandResult;

    /// Whether a file exists at `path`.
    fn file_exists(&self, path: &str) -> bool;

    /// Read `path` as a list of command lines for `:source`.
    fn source_lines(&mut self, path: &str) -> CommandResult<Vec<String>>;
}

/// Expand filename patterns.
pub trait Glob {
    /// List the paths matching `pattern`, in a stable order.
    fn glob(&self, pattern: &str) -> CommandResult<Vec<String>>;
}

/// Command line abbreviations.
pub trait Abbreviations {
    /// Expansion of `word`, if it's an abbreviation.
    fn abbreviation(&self, word: &str, trigger: AbbrevTrigger) -> Option<String>;
}

/// Runs the commands that the interpreter doesn't handle itself.
pub trait CommandHandler {
    /// Run a parsed command.
    fn dispatch(&mut self, cmd: &ExCommand) -> CommandResult;

    /// Contents of register `name`, for `:@`.
    fn register_text(&self, name: char) -> Option<String>;

    /// Called after a file has been pushed onto the alternate file list, so that things like
    /// jump lists can renumber their file references. `new_file` is true when the pushed name
    /// is not the file currently being edited.
    fn on_alternate_inserted(&mut self, new_file: bool) {
        let _ = new_file;
    }
}

/// Everything the interpreter needs from the editor.
pub trait ExHost: LineBuffer + Marks + FileService + Glob + Abbreviations + CommandHandler {}

impl<T> ExHost for T where T: LineBuffer + Marks + FileService + Glob + Abbreviations + CommandHandler
{}
