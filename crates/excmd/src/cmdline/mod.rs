//! # Command line editing
//!
//! ## Overview
//!
//! [LineEditor] collects one line of input, a key at a time, after a prompt like `:` has been
//! shown. Besides inserting and deleting text it supports:
//!
//! - `<C-V>` to insert the next key literally, or up to three decimal digits as a character
//!   code.
//! - `<C-K>{char1}{char2}` to insert a [digraph](crate::store::DigraphTable), and, when
//!   [ExOptions::digraph] is set, `{char1}<BS>{char2}`.
//! - `<Up>`/`<Down>` (and `<C-P>`/`<C-N>`) to move through the command history, and
//!   `<S-Up>`/`<S-Down>` to only visit entries starting with the text before the cursor.
//! - [wildchar](ExOptions::wildchar) to complete the file name before the cursor, with
//!   further presses cycling through the matches, `<C-D>` to list them, `<C-A>` to insert all
//!   of them and `<C-L>` to insert their longest common prefix.
//! - Abbreviations, which are expanded when a non-identifier character is typed after a word,
//!   or when the line is submitted.
//!
//! Warnings like a failed completion are shown as messages and editing continues. The only
//! errors returned are failures to read keys or draw the screen.
use crossterm::event::{KeyCode, KeyModifiers};

use crate::completion::{format_columns, ExpandMode, Expansion};
use crate::errors::{CommandError, CommandResult};
use crate::host::{AbbrevTrigger, Abbreviations, Glob, KeySource, MoveDir1D, Screen};
use crate::key::TerminalKey;
use crate::options::ExOptions;
use crate::store::{Recall, Store};
use crate::util::{char_width, is_id_char};

mod buffer;

use self::buffer::CommandBuffer;

/// Keys that were started but need more input before they do anything.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum PendingMode {
    #[default]
    Normal,

    /// After `<C-V>`, with the decimal digits typed so far.
    Literal { code: u32, digits: u8 },

    /// After `<C-K>`.
    DigraphFirst,

    /// After `<C-K>{char1}`.
    DigraphSecond(char),
}

/// What a key does on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum EditKey {
    Submit,
    Cancel,
    EraseChar,
    DeleteChar,
    EraseWord,
    ClearLine,
    ShowMatches,
    AllMatches,
    LongestMatch,
    NextMatch,
    PrevMatch,
    Left,
    Right,
    WordLeft,
    WordRight,
    Home,
    End,
    HistoryUp,
    HistoryDown,
    PrefixUp,
    PrefixDown,
    Literal,
    Digraph,
    Insert(char),
    Ignore,
}

impl From<&TerminalKey> for EditKey {
    fn from(key: &TerminalKey) -> Self {
        let shift = key.modifiers().contains(KeyModifiers::SHIFT);

        match key.code() {
            KeyCode::Enter => EditKey::Submit,
            KeyCode::Esc => EditKey::Cancel,
            KeyCode::Backspace => EditKey::EraseChar,
            KeyCode::Delete => EditKey::DeleteChar,
            KeyCode::Left if shift => EditKey::WordLeft,
            KeyCode::Left => EditKey::Left,
            KeyCode::Right if shift => EditKey::WordRight,
            KeyCode::Right => EditKey::Right,
            KeyCode::Up if shift => EditKey::PrefixUp,
            KeyCode::Up => EditKey::HistoryUp,
            KeyCode::Down if shift => EditKey::PrefixDown,
            KeyCode::Down => EditKey::HistoryDown,
            KeyCode::Home => EditKey::Home,
            KeyCode::End => EditKey::End,
            KeyCode::Char(c) if key.modifiers() == KeyModifiers::CONTROL => {
                match c {
                    'a' => EditKey::AllMatches,
                    'b' => EditKey::Home,
                    'c' | '[' => EditKey::Cancel,
                    'd' => EditKey::ShowMatches,
                    'e' => EditKey::End,
                    'h' => EditKey::EraseChar,
                    'j' | 'm' => EditKey::Submit,
                    'k' => EditKey::Digraph,
                    'l' => EditKey::LongestMatch,
                    'n' => EditKey::NextMatch,
                    'p' => EditKey::PrevMatch,
                    'u' => EditKey::ClearLine,
                    'v' => EditKey::Literal,
                    'w' => EditKey::EraseWord,
                    _ => key.get_literal_char().map_or(EditKey::Ignore, EditKey::Insert),
                }
            },
            _ => key.get_literal_char().map_or(EditKey::Ignore, EditKey::Insert),
        }
    }
}

/// What to do after handling a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum EditStep {
    Continue,
    Submit,
    Cancel,
}

/// Edits a single command line.
#[derive(Debug)]
pub struct LineEditor {
    prompt: char,
    buffer: CommandBuffer,
    pending: PendingMode,

    /// A key to handle again before reading another one.
    requeued: Option<(TerminalKey, bool)>,

    /// Don't expand abbreviations for the next key.
    skip_abbrev: bool,

    /// The wildchar is `<Esc>` and was just pressed.
    gotesc: bool,

    /// Prefix for `<S-Up>` and `<S-Down>`.
    lookfor: Option<String>,
    history_pos: Option<usize>,

    /// Last inserted character, and the one erased before it, for `{char1}<BS>{char2}`.
    lastchar: Option<char>,
    backspaced: Option<char>,
}

impl LineEditor {
    /// Create an editor for a line that follows `prompt`.
    pub fn new(prompt: char, opts: &ExOptions) -> Self {
        LineEditor {
            prompt,
            buffer: CommandBuffer::new(opts.max_length),
            pending: PendingMode::Normal,
            requeued: None,
            skip_abbrev: false,
            gotesc: false,
            lookfor: None,
            history_pos: None,
            lastchar: None,
            backspaced: None,
        }
    }

    /// Read keys until the line is submitted or cancelled.
    ///
    /// A submitted line is returned, and added to the history unless it's empty. A cancelled
    /// line returns `None`.
    pub fn edit<K, S, H>(
        &mut self,
        keys: &mut K,
        screen: &mut S,
        host: &H,
        store: &mut Store,
        opts: &ExOptions,
    ) -> CommandResult<Option<String>>
    where
        K: KeySource + ?Sized,
        S: Screen + ?Sized,
        H: Glob + Abbreviations,
    {
        store.history.resize(opts.history);
        store.completions.clear();
        self.redraw(screen)?;

        loop {
            let (key, typed, requeued) = match self.requeued.take() {
                Some((key, typed)) => (key, typed, true),
                None => {
                    let key = keys.next_key()?;

                    (key, keys.typed(), false)
                },
            };

            match self.step(key, typed, requeued, screen, host, store, opts)? {
                EditStep::Continue => continue,
                EditStep::Submit => {
                    let text = self.buffer.text();

                    store.history.push(&text);
                    store.completions.clear();
                    screen.clear_line()?;

                    return Ok(Some(text));
                },
                EditStep::Cancel => {
                    store.completions.clear();
                    screen.clear_line()?;

                    return Ok(None);
                },
            }
        }
    }

    fn step<S, H>(
        &mut self,
        key: TerminalKey,
        typed: bool,
        requeued: bool,
        screen: &mut S,
        host: &H,
        store: &mut Store,
        opts: &ExOptions,
    ) -> CommandResult<EditStep>
    where
        S: Screen + ?Sized,
        H: Glob + Abbreviations,
    {
        match self.pending {
            PendingMode::Normal => {},
            PendingMode::Literal { code, digits } => {
                self.literal(key, typed, code, digits, screen, host, opts)?;

                return Ok(EditStep::Continue);
            },
            PendingMode::DigraphFirst => {
                match key.get_literal_char() {
                    Some(c1) => {
                        self.pending = PendingMode::DigraphSecond(c1);
                        self.show_pending(c1, screen)?;
                    },
                    None => {
                        self.pending = PendingMode::Normal;
                        self.redraw(screen)?;
                    },
                }

                return Ok(EditStep::Continue);
            },
            PendingMode::DigraphSecond(c1) => {
                self.pending = PendingMode::Normal;

                match key.get_literal_char() {
                    Some(c2) => {
                        let c = store.digraphs.lookup(c1, c2);

                        self.insert(c, screen, host, opts)?;
                    },
                    None => self.redraw(screen)?,
                }

                return Ok(EditStep::Continue);
            },
        }

        let key = if opts.digraph && !requeued { self.compose(key, store) } else { key };
        let skip_abbrev = std::mem::take(&mut self.skip_abbrev);
        let wild = typed && key.get_literal_char() == Some(opts.wildchar);
        let edit = EditKey::from(&key);

        if !matches!(edit, EditKey::PrefixUp | EditKey::PrefixDown) {
            self.lookfor = None;
        }

        let cycling = matches!(
            edit,
            EditKey::NextMatch | EditKey::PrevMatch | EditKey::AllMatches | EditKey::LongestMatch
        );

        if !wild && !cycling {
            store.completions.clear();
        }

        let submit = match key.code() {
            KeyCode::Esc => !typed,
            _ => edit == EditKey::Submit,
        };

        if submit {
            if opts.abbreviations &&
                !skip_abbrev &&
                self.expand_abbreviation(AbbrevTrigger::Submit, host)
            {
                self.requeued = Some((key, typed));
                self.skip_abbrev = true;
                self.redraw(screen)?;

                return Ok(EditStep::Continue);
            }

            return Ok(EditStep::Submit);
        }

        if wild && !self.gotesc {
            let mode = if store.completions.active() {
                ExpandMode::NextWrap
            } else {
                ExpandMode::Fresh
            };

            self.complete(mode, screen, host, store, opts)?;
            self.gotesc = opts.wildchar == '\u{1B}';

            return Ok(EditStep::Continue);
        }

        self.gotesc = false;

        match edit {
            EditKey::Submit => return Ok(EditStep::Submit),
            EditKey::Cancel => return Ok(EditStep::Cancel),
            EditKey::EraseChar | EditKey::DeleteChar | EditKey::EraseWord => {
                if edit == EditKey::DeleteChar && self.buffer.cursor() < self.buffer.len() {
                    self.buffer.set_cursor(self.buffer.cursor() + 1);
                }

                if self.buffer.cursor() > 0 {
                    if edit == EditKey::EraseWord {
                        self.buffer.delete_word();
                    } else {
                        self.buffer.delete_back();
                    }

                    self.redraw(screen)?;
                } else if self.buffer.is_empty() && edit != EditKey::EraseWord {
                    return Ok(EditStep::Cancel);
                }
            },
            EditKey::ClearLine => {
                self.buffer.clear();
                self.redraw(screen)?;
            },
            EditKey::ShowMatches => {
                self.show_matches(screen, host)?;
            },
            EditKey::AllMatches => {
                self.complete(ExpandMode::All, screen, host, store, opts)?;
            },
            EditKey::LongestMatch => {
                self.complete(ExpandMode::Longest, screen, host, store, opts)?;
            },
            EditKey::NextMatch if store.completions.active() => {
                self.complete(ExpandMode::Next, screen, host, store, opts)?;
            },
            EditKey::PrevMatch if store.completions.active() => {
                self.complete(ExpandMode::Previous, screen, host, store, opts)?;
            },
            EditKey::NextMatch | EditKey::HistoryDown => {
                self.recall(MoveDir1D::Next, false, screen, store)?;
            },
            EditKey::PrevMatch | EditKey::HistoryUp => {
                self.recall(MoveDir1D::Previous, false, screen, store)?;
            },
            EditKey::PrefixDown => {
                self.recall(MoveDir1D::Next, true, screen, store)?;
            },
            EditKey::PrefixUp => {
                self.recall(MoveDir1D::Previous, true, screen, store)?;
            },
            EditKey::Left | EditKey::WordLeft => {
                let word = edit == EditKey::WordLeft;

                while self.buffer.cursor() > 0 {
                    let cursor = self.buffer.cursor() - 1;
                    self.buffer.set_cursor(cursor);

                    let prev = cursor.checked_sub(1).and_then(|i| self.buffer.get(i));

                    if !word || prev == Some(' ') {
                        break;
                    }
                }

                self.place_cursor(screen)?;
            },
            EditKey::Right | EditKey::WordRight => {
                let word = edit == EditKey::WordRight;

                while self.buffer.cursor() < self.buffer.len() {
                    let cursor = self.buffer.cursor() + 1;
                    self.buffer.set_cursor(cursor);

                    if !word || self.buffer.get(cursor) == Some(' ') {
                        break;
                    }
                }

                self.place_cursor(screen)?;
            },
            EditKey::Home => {
                self.buffer.set_cursor(0);
                self.place_cursor(screen)?;
            },
            EditKey::End => {
                self.buffer.set_cursor(self.buffer.len());
                self.place_cursor(screen)?;
            },
            EditKey::Literal => {
                self.pending = PendingMode::Literal { code: 0, digits: 0 };
                self.show_pending('^', screen)?;
            },
            EditKey::Digraph => {
                self.pending = PendingMode::DigraphFirst;
                self.show_pending('?', screen)?;
            },
            EditKey::Insert(c) => {
                self.insert(c, screen, host, opts)?;
            },
            EditKey::Ignore => {
                screen.beep()?;
            },
        }

        return Ok(EditStep::Continue);
    }

    /// Handle a key typed after `<C-V>`.
    fn literal<S, H>(
        &mut self,
        key: TerminalKey,
        typed: bool,
        code: u32,
        digits: u8,
        screen: &mut S,
        host: &H,
        opts: &ExOptions,
    ) -> CommandResult
    where
        S: Screen + ?Sized,
        H: Abbreviations,
    {
        if let Some(d) = key.get_digit() {
            let code = code * 10 + d;
            let digits = digits + 1;

            if digits < 3 {
                self.pending = PendingMode::Literal { code, digits };

                return Ok(());
            }

            self.pending = PendingMode::Normal;

            return self.insert(byte_char(code), screen, host, opts);
        }

        self.pending = PendingMode::Normal;

        if digits > 0 {
            self.requeued = Some((key, typed));

            return self.insert(byte_char(code), screen, host, opts);
        }

        match key.get_literal_char() {
            Some(c) => self.insert(c, screen, host, opts),
            None => self.redraw(screen),
        }
    }

    /// Turn `{char1}<BS>{char2}` into a digraph.
    fn compose(&mut self, key: TerminalKey, store: &Store) -> TerminalKey {
        let mut key = key;

        if let Some(c1) = self.backspaced.take() {
            if let Some((c2, mods)) = key.get_char_mods() {
                if mods.is_empty() {
                    let c = store.digraphs.lookup(c1, c2);

                    key = TerminalKey::from(KeyCode::Char(c));
                }
            }
        }

        if EditKey::from(&key) == EditKey::EraseChar && self.lastchar.is_some() {
            self.backspaced = self.lastchar;
        }

        self.lastchar = match key.get_char_mods() {
            Some((c, mods)) if mods.is_empty() => Some(c),
            _ => None,
        };

        return key;
    }

    fn insert<S, H>(&mut self, c: char, screen: &mut S, host: &H, opts: &ExOptions) -> CommandResult
    where
        S: Screen + ?Sized,
        H: Abbreviations,
    {
        if opts.abbreviations &&
            !is_id_char(c) &&
            self.expand_abbreviation(AbbrevTrigger::Char(c), host)
        {
            return self.redraw(screen);
        }

        if self.buffer.insert(c) {
            self.redraw(screen)?;
        }

        Ok(())
    }

    /// Replace the word before the cursor with its abbreviation, if it has one.
    fn expand_abbreviation<H>(&mut self, trigger: AbbrevTrigger, host: &H) -> bool
    where
        H: Abbreviations,
    {
        let end = self.buffer.cursor();
        let start = self.buffer.word_start();

        if start == end {
            return false;
        }

        let word = self.buffer.slice(start, end);

        let Some(text) = host.abbreviation(&word, trigger) else {
            return false;
        };

        let extra = if let AbbrevTrigger::Char(_) = trigger { 1 } else { 0 };
        let len = self.buffer.len() - (end - start) + text.chars().count() + extra;

        if len + 2 >= self.buffer.max() {
            return false;
        }

        log::debug!("expanding abbreviation {:?} into {:?}", word, text);

        self.buffer.replace(start, end, &text);

        if let AbbrevTrigger::Char(c) = trigger {
            self.buffer.insert(c);
        }

        return true;
    }

    /// Complete the file name before the cursor.
    fn complete<S>(
        &mut self,
        mode: ExpandMode,
        screen: &mut S,
        glob: &dyn Glob,
        store: &mut Store,
        opts: &ExOptions,
    ) -> CommandResult
    where
        S: Screen + ?Sized,
    {
        let end = self.buffer.cursor();
        let start = match (mode, store.completions.matches()) {
            (ExpandMode::Next | ExpandMode::Previous | ExpandMode::NextWrap, Some(set)) => {
                set.start.min(end)
            },
            _ => self.buffer.fragment_start(),
        };
        let pattern = self.buffer.slice(start, end) + "*";

        let text = match store.completions.expand(&pattern, mode, glob, opts) {
            Ok(Expansion::Found(text)) => text,
            Ok(Expansion::Ambiguous(text)) => {
                screen.message(&CommandError::TooManyMatches.to_string())?;
                text
            },
            Ok(Expansion::Nothing) => {
                return Ok(());
            },
            Err(e) => {
                screen.message(&e.to_string())?;

                return self.redraw(screen);
            },
        };

        store.completions.set_start(start);

        let len = self.buffer.len() - (end - start) + text.chars().count();

        if len + 4 > self.buffer.max() {
            screen.message(&CommandError::TooLong.to_string())?;

            return self.redraw(screen);
        }

        self.buffer.replace(start, end, &text);

        return self.redraw(screen);
    }

    /// List the names that the file name before the cursor could complete to.
    fn show_matches<S>(&mut self, screen: &mut S, glob: &dyn Glob) -> CommandResult
    where
        S: Screen + ?Sized,
    {
        let start = self.buffer.fragment_start();
        let pattern = self.buffer.slice(start, self.buffer.cursor()) + "*";

        match glob.glob(&pattern) {
            Ok(names) if names.is_empty() => {
                screen.message(&CommandError::NoMatch.to_string())?;
            },
            Ok(names) => {
                for row in format_columns(&names, screen.columns()) {
                    screen.message(&row)?;
                }
            },
            Err(e) => {
                screen.message(&e.to_string())?;
            },
        }

        return self.redraw(screen);
    }

    fn recall<S>(
        &mut self,
        dir: MoveDir1D,
        filtered: bool,
        screen: &mut S,
        store: &Store,
    ) -> CommandResult
    where
        S: Screen + ?Sized,
    {
        if filtered && self.lookfor.is_none() {
            self.lookfor = Some(self.buffer.before_cursor());
        }

        let prefix = if filtered { self.lookfor.as_deref() } else { None };

        match store.history.recall(&mut self.history_pos, dir, prefix) {
            Recall::Entry(text) => self.buffer.set_text(text),
            Recall::Clear => self.buffer.clear(),
            Recall::Unchanged => {
                screen.beep()?;

                return Ok(());
            },
        }

        return self.redraw(screen);
    }

    fn redraw<S>(&self, screen: &mut S) -> CommandResult
    where
        S: Screen + ?Sized,
    {
        screen.clear_line()?;
        screen.write_at(0, &self.prompt.to_string())?;
        screen.write_translated(char_width(self.prompt), &self.buffer.text())?;

        return self.place_cursor(screen);
    }

    fn place_cursor<S>(&self, screen: &mut S) -> CommandResult
    where
        S: Screen + ?Sized,
    {
        screen.set_cursor(char_width(self.prompt) + self.buffer.column())?;

        Ok(())
    }

    /// Show `c` at the cursor while waiting for the rest of a `<C-V>` or `<C-K>` sequence.
    fn show_pending<S>(&self, c: char, screen: &mut S) -> CommandResult
    where
        S: Screen + ?Sized,
    {
        let col = char_width(self.prompt) + self.buffer.column();
        let width = screen.write_char(col, c)?;

        screen.write_translated(col + width, &self.buffer.after_cursor())?;
        screen.set_cursor(col)?;

        Ok(())
    }
}

/// The character for a code typed after `<C-V>`, which is truncated to a byte.
fn byte_char(code: u32) -> char {
    char::from((code & 0xFF) as u8)
}
