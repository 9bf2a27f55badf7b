//! # In-memory host
//!
//! ## Overview
//!
//! [MemoryHost] keeps a buffer, its marks, registers and a set of named "files" in memory, and
//! implements every editor-side trait in [crate::host] over them. [MemoryScreen] records what
//! gets drawn on the command line. Together they're enough to run the command line without a
//! terminal, which is how the tests and the demos in this workspace use them.
//!
//! Commands that need a real editor, like `:global` or `:quit`, are recorded but otherwise
//! ignored.
use std::collections::{BTreeMap, HashMap};
use std::io;

use regex::Regex;

use crate::errors::{CommandError, CommandResult};
use crate::ex::{CommandId, ExCommand, LineRange};
use crate::host::{
    search_lines,
    AbbrevTrigger,
    Abbreviations,
    CommandHandler,
    FileService,
    Glob,
    LineBuffer,
    Marks,
    MoveDir1D,
    Screen,
    WriteFlags,
};
use crate::util::{char_width, wildcard_match};

const SHIFT_WIDTH: usize = 4;

fn to_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines.iter().map(|l| l.as_ref().to_string()).collect()
}

/// A buffer and a filesystem kept in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    lines: Vec<String>,
    cursor: usize,
    modified: bool,
    readonly: bool,

    marks: HashMap<char, usize>,
    registers: HashMap<char, String>,
    abbreviations: HashMap<String, String>,
    last_pattern: Option<String>,
    last_substitute: Option<(String, String, bool)>,

    files: BTreeMap<String, Vec<String>>,

    dispatched: Vec<ExCommand>,
    writes: Vec<String>,
    output: Vec<String>,
    alternates_inserted: Vec<bool>,
    quit: bool,
}

impl MemoryHost {
    /// Create a host whose buffer holds `lines`, with the cursor on the first line.
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut host = MemoryHost::default();
        host.set_lines(lines);
        host
    }

    /// Replace the buffer's contents.
    pub fn set_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.lines = to_lines(lines);

        if self.lines.is_empty() {
            self.lines.push(String::new());
        }

        self.cursor = 1;
    }

    /// The lines in the buffer.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The cursor line.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Put mark `name` on line `lnum`.
    pub fn set_mark(&mut self, name: char, lnum: usize) {
        self.marks.insert(name, lnum);
    }

    /// Set the contents of register `name`.
    pub fn set_register(&mut self, name: char, text: &str) {
        self.registers.insert(name, text.to_string());
    }

    /// Define an abbreviation.
    pub fn set_abbreviation(&mut self, word: &str, expansion: &str) {
        self.abbreviations.insert(word.to_string(), expansion.to_string());
    }

    /// Mark the buffer as changed or unchanged.
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Mark the buffer as read-only.
    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    /// Create or replace the file `name`.
    pub fn add_file<S: AsRef<str>>(&mut self, name: &str, lines: &[S]) {
        self.files.insert(name.to_string(), to_lines(lines));
    }

    /// The contents of file `name`.
    pub fn file(&self, name: &str) -> Option<&[String]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Every command that was dispatched, in order.
    pub fn dispatched(&self) -> &[ExCommand] {
        &self.dispatched
    }

    /// The names of files written, in order.
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// Lines shown by `:print`, `:number` and `:list`.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Arguments of each call to [CommandHandler::on_alternate_inserted].
    pub fn alternates_inserted(&self) -> &[bool] {
        &self.alternates_inserted
    }

    /// Whether a command asked to quit.
    pub fn quit(&self) -> bool {
        self.quit
    }

    fn range_text(&self, range: &LineRange) -> Vec<String> {
        let start = range.line1.max(1) - 1;
        let end = range.line2.min(self.lines.len());

        self.lines.get(start..end).map(<[String]>::to_vec).unwrap_or_default()
    }

    fn set_register_lines(&mut self, name: Option<char>, lines: &[String]) {
        let mut text = lines.join("\n");
        text.push('\n');

        match name {
            Some(c) if c.is_ascii_uppercase() => {
                let c = c.to_ascii_lowercase();
                self.registers.entry(c).or_default().push_str(&text);
            },
            Some(c) => {
                self.registers.insert(c, text.clone());
                self.registers.insert('"', text);
            },
            None => {
                self.registers.insert('"', text);
            },
        }
    }

    fn insert_lines(&mut self, after: usize, lines: Vec<String>) {
        let at = after.min(self.lines.len());
        let n = lines.len();

        self.lines.splice(at..at, lines);
        self.modified = true;

        if n > 0 {
            self.cursor = at + n;
        }
    }

    fn remove_lines(&mut self, range: &LineRange) -> Vec<String> {
        let start = range.line1.max(1) - 1;
        let end = range.line2.min(self.lines.len());
        let removed: Vec<String> = self.lines.drain(start..end).collect();

        if self.lines.is_empty() {
            self.lines.push(String::new());
        }

        self.modified = true;
        self.cursor = range.line1.max(1).min(self.lines.len());

        return removed;
    }

    fn substitute(&mut self, cmd: &ExCommand) -> CommandResult {
        let (pattern, replacement, global) = if cmd.id == CommandId::And {
            self.last_substitute.clone().ok_or(CommandError::NoPreviousPattern)?
        } else {
            let mut chars = cmd.arg.chars();
            let delim = chars.next().ok_or(CommandError::NoPreviousPattern)?;
            let mut parts = chars.as_str().splitn(3, delim);
            let pattern = parts.next().unwrap_or_default().to_string();
            let replacement = parts.next().unwrap_or_default().to_string();
            let global = parts.next().unwrap_or_default().contains('g');

            (pattern, replacement, global)
        };

        let pattern = if pattern.is_empty() {
            self.last_pattern.clone().ok_or(CommandError::NoPreviousPattern)?
        } else {
            pattern
        };

        let re = Regex::new(&pattern)?;
        let mut last = None;

        for lnum in cmd.range.line1.max(1)..=cmd.range.line2.min(self.lines.len()) {
            let line = &self.lines[lnum - 1];

            if !re.is_match(line) {
                continue;
            }

            let new = if global {
                re.replace_all(line, replacement.as_str())
            } else {
                re.replace(line, replacement.as_str())
            };

            self.lines[lnum - 1] = new.into_owned();
            last = Some(lnum);
        }

        self.last_pattern = Some(pattern.clone());
        self.last_substitute = Some((pattern.clone(), replacement, global));

        let lnum = last.ok_or(CommandError::PatternNotFound(pattern))?;
        self.cursor = lnum;
        self.modified = true;

        Ok(())
    }

    fn shift(&mut self, range: &LineRange, right: bool) {
        for line in self.lines[range.line1 - 1..range.line2].iter_mut() {
            if right {
                line.insert_str(0, &" ".repeat(SHIFT_WIDTH));
            } else {
                let n = line.chars().take(SHIFT_WIDTH).take_while(|c| *c == ' ').count();
                line.drain(..n);
            }
        }

        self.cursor = range.line2;
        self.modified = true;
    }
}

impl LineBuffer for MemoryHost {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn cursor_line(&self) -> usize {
        self.cursor
    }

    fn set_cursor_line(&mut self, lnum: usize) {
        self.cursor = lnum.min(self.lines.len()).max(1);
    }

    fn line_text(&self, lnum: usize) -> Option<String> {
        lnum.checked_sub(1).and_then(|i| self.lines.get(i)).cloned()
    }

    fn modified(&self) -> bool {
        self.modified
    }

    fn readonly(&self) -> bool {
        self.readonly
    }
}

impl Marks for MemoryHost {
    fn mark_line(&self, name: char) -> Option<usize> {
        self.marks.get(&name).copied()
    }

    fn search_from(
        &mut self,
        start: usize,
        pattern: &str,
        dir: MoveDir1D,
    ) -> CommandResult<Option<usize>> {
        let pattern = if pattern.is_empty() {
            self.last_pattern.clone().ok_or(CommandError::NoPreviousPattern)?
        } else {
            pattern.to_string()
        };

        let re = Regex::new(&pattern)?;
        self.last_pattern = Some(pattern);

        Ok(search_lines(self, start, &re, dir))
    }
}

impl FileService for MemoryHost {
    fn load_file(&mut self, path: &str) -> CommandResult {
        let lines = self.files.get(path).cloned().unwrap_or_default();

        self.set_lines(&lines);
        self.modified = false;
        self.marks.clear();

        Ok(())
    }

    fn read_file(&mut self, path: &str, after: usize) -> CommandResult<usize> {
        let lines = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| CommandError::NotOpen(path.to_string()))?;
        let n = lines.len();

        self.insert_lines(after, lines);

        Ok(n)
    }

    fn write_file(&mut self, path: &str, range: &LineRange, flags: WriteFlags) -> CommandResult {
        let text = self.range_text(range);
        let whole = range.line1 <= 1 && range.line2 >= self.lines.len();

        if flags.contains(WriteFlags::APPEND) {
            self.files.entry(path.to_string()).or_default().extend(text);
        } else {
            self.files.insert(path.to_string(), text);
        }

        if whole {
            self.modified = false;
        }

        self.writes.push(path.to_string());

        Ok(())
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn source_lines(&mut self, path: &str) -> CommandResult<Vec<String>> {
        self.files.get(path).cloned().ok_or_else(|| CommandError::NotOpen(path.to_string()))
    }
}

impl Glob for MemoryHost {
    fn glob(&self, pattern: &str) -> CommandResult<Vec<String>> {
        let names = self
            .files
            .keys()
            .filter(|name| wildcard_match(pattern, name))
            .cloned()
            .collect();

        Ok(names)
    }
}

impl Abbreviations for MemoryHost {
    fn abbreviation(&self, word: &str, _: AbbrevTrigger) -> Option<String> {
        self.abbreviations.get(word).cloned()
    }
}

impl CommandHandler for MemoryHost {
    fn dispatch(&mut self, cmd: &ExCommand) -> CommandResult {
        self.dispatched.push(cmd.clone());

        let range = cmd.range;

        match cmd.id {
            CommandId::Delete => {
                let removed = self.remove_lines(&range);
                self.set_register_lines(cmd.register, &removed);
            },
            CommandId::Yank => {
                let text = self.range_text(&range);
                self.set_register_lines(cmd.register, &text);
            },
            CommandId::Put => {
                let name = cmd.register.unwrap_or('"').to_ascii_lowercase();
                let text = self
                    .registers
                    .get(&name)
                    .filter(|text| !text.is_empty())
                    .ok_or(CommandError::EmptyRegister(name))?;
                let lines = text.lines().map(String::from).collect();

                self.insert_lines(range.line2, lines);
            },
            CommandId::Print | CommandId::Number | CommandId::List => {
                for lnum in range.line1..=range.line2 {
                    let line = &self.lines[lnum - 1];
                    let shown = match cmd.id {
                        CommandId::Number => format!("{lnum:>7} {line}"),
                        CommandId::List => format!("{line}$"),
                        _ => line.clone(),
                    };

                    self.output.push(shown);
                }

                self.cursor = range.line2;
            },
            CommandId::Substitute | CommandId::And => {
                self.substitute(cmd)?;
            },
            CommandId::Copy | CommandId::T => {
                let dest = cmd.dest.ok_or(CommandError::InvalidAddress)?;
                let text = self.range_text(&range);

                self.insert_lines(dest, text);
            },
            CommandId::Move => {
                let dest = cmd.dest.ok_or(CommandError::InvalidAddress)?;
                let n = range.len();

                if dest >= range.line1 && dest < range.line2 {
                    return Err(CommandError::MoveIntoSelf);
                }

                let text = self.remove_lines(&range);
                let dest = if dest >= range.line2 { dest - n } else { dest };

                self.insert_lines(dest, text);
            },
            CommandId::Join => {
                let line2 = if range.line1 == range.line2 {
                    range.line2 + 1
                } else {
                    range.line2
                };

                if line2 <= self.lines.len() {
                    let joined: Vec<String> = self.lines.drain(range.line1..line2).collect();
                    let first = &mut self.lines[range.line1 - 1];

                    for line in joined {
                        let line = line.trim_start();

                        if !line.is_empty() {
                            if !first.is_empty() && !cmd.force {
                                first.push(' ');
                            }

                            first.push_str(line);
                        }
                    }

                    self.cursor = range.line1;
                    self.modified = true;
                }
            },
            CommandId::K | CommandId::Mark => {
                let name = cmd.arg.chars().next().ok_or(CommandError::ArgumentRequired)?;

                if cmd.arg.chars().count() > 1 {
                    return Err(CommandError::TrailingCharacters);
                }

                self.marks.insert(name, range.line2);
            },
            CommandId::LShift | CommandId::RShift => {
                self.shift(&range, cmd.id == CommandId::RShift);
            },
            CommandId::Quit | CommandId::Wq | CommandId::Xit => {
                self.quit = true;
            },
            _ => {
                log::debug!("no in-memory handling for :{}", cmd.name);
            },
        }

        Ok(())
    }

    fn register_text(&self, name: char) -> Option<String> {
        self.registers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn on_alternate_inserted(&mut self, new_file: bool) {
        self.alternates_inserted.push(new_file);
    }
}

/// A command line drawn in memory.
#[derive(Clone, Debug)]
pub struct MemoryScreen {
    line: String,
    cursor: usize,
    columns: usize,
    messages: Vec<String>,
    beeps: usize,
}

impl MemoryScreen {
    /// Create a screen that is `columns` wide.
    pub fn new(columns: usize) -> Self {
        MemoryScreen { line: String::new(), cursor: 0, columns, messages: vec![], beeps: 0 }
    }

    /// What's currently drawn on the command line.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// The cursor column.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Every message shown, in order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// How many times the bell rang.
    pub fn beeps(&self) -> usize {
        self.beeps
    }
}

impl Default for MemoryScreen {
    fn default() -> Self {
        MemoryScreen::new(80)
    }
}

impl Screen for MemoryScreen {
    fn clear_line(&mut self) -> io::Result<()> {
        self.line.clear();
        self.cursor = 0;

        Ok(())
    }

    fn write_at(&mut self, col: usize, text: &str) -> io::Result<()> {
        let mut width = 0;
        let mut end = self.line.len();

        for (i, c) in self.line.char_indices() {
            if width >= col {
                end = i;
                break;
            }

            width += char_width(c);
        }

        self.line.truncate(end);

        while width < col {
            self.line.push(' ');
            width += 1;
        }

        self.line.push_str(text);

        Ok(())
    }

    fn set_cursor(&mut self, col: usize) -> io::Result<()> {
        self.cursor = col;

        Ok(())
    }

    fn beep(&mut self) -> io::Result<()> {
        self.beeps += 1;

        Ok(())
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn message(&mut self, msg: &str) -> io::Result<()> {
        self.messages.push(msg.to_string());

        Ok(())
    }
}
