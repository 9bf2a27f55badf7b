//! # excmd-term
//!
//! ## Overview
//!
//! This crate runs the [excmd] command line in a real terminal. [TerminalKeys] reads key
//! presses using [crossterm], and [TerminalScreen] draws the command line on the row below
//! wherever the cursor was when editing started.
//!
//! ## Example
//!
//! ```no_run
//! use excmd::memory::MemoryHost;
//! use excmd::session::ExSession;
//! use excmd_term::{TerminalKeys, TerminalScreen};
//!
//! fn main() -> Result<(), std::io::Error> {
//!     let mut host = MemoryHost::new(&["hello", "world"]);
//!     let mut session = ExSession::default();
//!     let mut keys = TerminalKeys::default();
//!     let mut screen = TerminalScreen::new()?;
//!
//!     screen.enable()?;
//!     let res = session.run_command_line(':', &mut keys, &mut host, &mut screen);
//!     screen.disable()?;
//!
//!     println!("accepted: {:?}", res.is_ok());
//!
//!     Ok(())
//! }
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor::MoveTo,
    event::{poll, read, Event, KeyEventKind},
    style::Print,
    terminal::{Clear, ClearType},
    QueueableCommand,
};

use excmd::host::{KeySource, Screen};
use excmd::key::{keys_from_str, TerminalKey};

/// Width to assume when the terminal can't be queried.
const DEFAULT_COLUMNS: usize = 80;

fn to_col(col: usize) -> u16 {
    u16::try_from(col).unwrap_or(u16::MAX)
}

/// Keys for pasted text, with `\r\n` line endings collapsed.
fn paste_keys(text: &str) -> VecDeque<TerminalKey> {
    keys_from_str(&text.replace("\r\n", "\n")).into()
}

/// Reads keys from the terminal.
///
/// The terminal should be in raw mode, which [TerminalScreen::enable] takes care of.
#[derive(Debug, Default)]
pub struct TerminalKeys {
    pasted: VecDeque<TerminalKey>,
    last_pasted: bool,
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<TerminalKey> {
        if let Some(key) = self.pasted.pop_front() {
            self.last_pasted = true;

            return Ok(key);
        }

        loop {
            if !poll(Duration::from_millis(500))? {
                continue;
            }

            match read()? {
                Event::Key(ke) if ke.kind != KeyEventKind::Release => {
                    self.last_pasted = false;

                    return Ok(ke.into());
                },
                Event::Paste(s) => {
                    self.pasted = paste_keys(&s);

                    if let Some(key) = self.pasted.pop_front() {
                        self.last_pasted = true;

                        return Ok(key);
                    }
                },
                Event::Key(_) |
                Event::FocusGained |
                Event::FocusLost |
                Event::Mouse(_) |
                Event::Resize(_, _) => {
                    // Do nothing for now.
                },
            }
        }
    }

    /// Pasted text doesn't count as typed, so a pasted `<Tab>` is inserted instead of
    /// completing a file name.
    fn typed(&self) -> bool {
        !self.last_pasted
    }
}

/// Draws the command line on a terminal row.
pub struct TerminalScreen {
    stdout: Stdout,
    top: u16,
}

impl TerminalScreen {
    /// Create a screen that writes to standard output.
    pub fn new() -> Result<Self, io::Error> {
        let screen = TerminalScreen { stdout: io::stdout(), top: 0 };

        return Ok(screen);
    }

    /// Switch to raw mode, and start drawing below whatever is on the cursor's row.
    pub fn enable(&mut self) -> Result<(), io::Error> {
        crossterm::terminal::enable_raw_mode()?;

        self.init()
    }

    /// Move past the command line and leave raw mode.
    pub fn disable(&mut self) -> Result<(), io::Error> {
        self.linebreak()?;

        crossterm::terminal::disable_raw_mode()
    }

    fn height(&self) -> u16 {
        crossterm::terminal::size().map(|(_, h)| h).unwrap_or(1)
    }

    fn init(&mut self) -> Result<(), io::Error> {
        let (col, mut row) = crossterm::cursor::position()?;

        if col > 0 {
            // Move to next line if the cursor is after text.
            row += 1;
        }

        if row >= self.height() {
            self.linebreak()?;

            row = row.saturating_sub(1);
        }

        self.top = row;

        Ok(())
    }

    fn linebreak(&mut self) -> Result<(), io::Error> {
        self.stdout.queue(Print("\r\n"))?;
        self.stdout.flush()?;

        Ok(())
    }
}

impl Screen for TerminalScreen {
    fn clear_line(&mut self) -> io::Result<()> {
        self.stdout
            .queue(MoveTo(0, self.top))?
            .queue(Clear(ClearType::CurrentLine))?;
        self.stdout.flush()
    }

    fn write_at(&mut self, col: usize, text: &str) -> io::Result<()> {
        self.stdout
            .queue(MoveTo(to_col(col), self.top))?
            .queue(Clear(ClearType::UntilNewLine))?
            .queue(Print(text))?;
        self.stdout.flush()
    }

    fn set_cursor(&mut self, col: usize) -> io::Result<()> {
        self.stdout.queue(MoveTo(to_col(col), self.top))?;
        self.stdout.flush()
    }

    fn beep(&mut self) -> io::Result<()> {
        self.stdout.queue(Print('\u{07}'))?;
        self.stdout.flush()
    }

    fn columns(&self) -> usize {
        crossterm::terminal::size().map_or(DEFAULT_COLUMNS, |(w, _)| usize::from(w))
    }

    fn message(&mut self, msg: &str) -> io::Result<()> {
        log::debug!("showing message {:?}", msg);

        self.stdout
            .queue(MoveTo(0, self.top))?
            .queue(Clear(ClearType::CurrentLine))?
            .queue(Print(msg))?
            .queue(Print("\r\n"))?;

        // Printing on the last row scrolls the terminal instead.
        if self.top + 1 < self.height() {
            self.top += 1;
        }

        self.stdout.flush()
    }
}
