//! # Ex command interpreter
//!
//! ## Overview
//!
//! An [Interpreter] takes a finished command line, such as `1,3d` or `e foo.txt|10`, and:
//!
//! - resolves the range in front of the command against the host's buffer, marks and search;
//! - looks the command name up in [COMMANDS], where the first entry that a name abbreviates
//!   wins;
//! - checks what follows against the command's [ArgSpec], pulling out the register, the
//!   count and any `|`-separated remainder;
//! - replaces `%` and `#` with file names, and globs single file name arguments;
//! - runs the command, either itself (for commands like `:edit` and `:write` that need the
//!   file names in the [Store]) or by handing an [ExCommand] to the host.
//!
//! Each statement in a `|` chain runs even if an earlier one failed. Errors are shown on the
//! [Screen] as they happen.
use crate::errors::{CommandError, CommandResult};
use crate::host::{ExHost, Screen};
use crate::options::ExOptions;
use crate::store::Store;
use crate::util::has_wildcard;

mod address;
mod builtin;
mod cmdtab;
mod expand;
mod parse;

pub use self::address::{resolve_address, resolve_range, LineRange};
pub use self::cmdtab::{find_command, ArgSpec, CommandId, CommandSpec, COMMANDS};
pub use self::expand::{expand_filenames, split_plus_cmd, ExpandedArg};
pub use self::parse::{
    parse_address,
    parse_bang,
    parse_cmd_name,
    parse_range,
    split_bar,
    Address,
    AddressBase,
    AddressTerm,
    BarSplit,
    RangeItem,
    RangeSep,
    RangeSpec,
};

use self::builtin::ArgExtras;

/// A parsed and validated command, ready to run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExCommand {
    /// Which command to run.
    pub id: CommandId,

    /// Full name of the command.
    pub name: &'static str,

    /// Lines to operate on.
    pub range: LineRange,

    /// Whether `!` followed the name.
    pub force: bool,

    /// Register given before the argument.
    pub register: Option<char>,

    /// Count given before the argument.
    pub count: Option<usize>,

    /// The rest of the argument, with file names substituted.
    pub arg: String,

    /// Resolved destination line for `:copy`, `:move` and `:t`.
    pub dest: Option<usize>,

    /// Whether `:write >>` should append.
    pub append: bool,

    /// Whether the argument is a shell command to filter lines through.
    pub filter: bool,
}

impl ExCommand {
    /// Create a command with no arguments.
    pub fn new(spec: &CommandSpec, range: LineRange) -> Self {
        ExCommand {
            id: spec.id,
            name: spec.name,
            range,
            force: false,
            register: None,
            count: None,
            arg: String::new(),
            dest: None,
            append: false,
            filter: false,
        }
    }
}

/// Parses and runs command lines.
///
/// Commands that run other command lines (`:source`, `:@`, `:edit +cmd`) re-enter the same
/// interpreter, up to [ExOptions::max_depth] levels deep.
pub struct Interpreter<'a> {
    store: &'a mut Store,
    opts: &'a ExOptions,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter using the given shared state.
    pub fn new(store: &'a mut Store, opts: &'a ExOptions) -> Self {
        Interpreter { store, opts, depth: 0 }
    }

    /// Run each `|`-separated statement in `text`.
    ///
    /// Errors are shown as messages, and don't stop later statements from running. The first
    /// error is returned once the chain is done.
    pub fn run<H, S>(&mut self, text: &str, host: &mut H, screen: &mut S) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        if text.chars().count() > self.opts.max_length.saturating_sub(2) {
            let err = CommandError::TooLong;
            screen.message(&err.to_string())?;

            return Err(err);
        }

        let mut first = None;
        let mut next = Some(text.to_string());

        while let Some(line) = next.take() {
            let (rest, res) = self.execute(&line, host, screen);

            if let Err(e) = res {
                log::warn!("command {:?} failed: {}", line, e);
                screen.message(&e.to_string())?;
                first.get_or_insert(e);
            }

            next = rest;
        }

        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Run the first statement in `text`, returning whatever followed a `|` along with the
    /// statement's result.
    ///
    /// The remainder is returned even when the statement fails, as long as it was split off
    /// before the failure.
    pub fn execute<H, S>(
        &mut self,
        text: &str,
        host: &mut H,
        screen: &mut S,
    ) -> (Option<String>, CommandResult)
    where
        H: ExHost,
        S: Screen,
    {
        let mut rest = None;
        let res = self.execute_statement(text, &mut rest, host, screen);

        (rest, res)
    }

    fn execute_statement<H, S>(
        &mut self,
        text: &str,
        rest: &mut Option<String>,
        host: &mut H,
        screen: &mut S,
    ) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        let text = text.trim_start_matches([' ', '\t', ':', '|']);

        if text.is_empty() || text.starts_with(['"', '#']) {
            return Ok(());
        }

        let (after, spec) = parse_range(text).map_err(|_| CommandError::InvalidRange)?;
        let mut range = resolve_range(&spec, host)?;
        let line_count = host.line_count();

        if range.line1 > range.line2 || range.line2 > line_count {
            return Err(CommandError::InvalidRange);
        }

        let after = after.trim_start_matches([' ', '\t']);

        // Just an address: go to the line.
        if after.is_empty() || after.starts_with(['"', '|']) {
            if let Some(r) = after.strip_prefix('|') {
                *rest = Some(r.to_string());
            }

            if range.addr_count != 0 {
                host.set_cursor_line(range.line2.max(1));
            }

            return Ok(());
        }

        let invalid = || CommandError::InvalidCommand(after.to_string());
        let (after, name) = parse_cmd_name(after).map_err(|_| invalid())?;
        let spec = find_command(name).ok_or_else(|| {
            let shown = if name.is_empty() { after } else { name };
            CommandError::InvalidCommand(shown.to_string())
        })?;
        let args = spec.args;

        let (after, force) = if args.bang {
            parse_bang(after).map_err(|_| invalid())?
        } else {
            (after, false)
        };

        if !args.range && range.addr_count > 0 {
            return Err(CommandError::NoRange);
        }

        if !args.zero_range {
            range.line1 = range.line1.max(1);
            range.line2 = range.line2.max(1);
        }

        let mut arg = after.trim_start_matches([' ', '\t']).to_string();

        if args.trailing_bar {
            let split = split_bar(&arg, !args.no_comment, args.keep_ctrlv);
            arg = split.text;
            *rest = split.rest;
        }

        if args.needs_arg && arg.is_empty() {
            return Err(CommandError::ArgumentRequired);
        }

        if args.default_all && range.addr_count == 0 {
            range.line1 = 1;
            range.line2 = line_count;
        }

        let mut cmd = ExCommand::new(spec, range);
        cmd.force = force;

        if args.register {
            match arg.chars().next() {
                Some(c)
                    if c.is_ascii_alphabetic() ||
                        c == '.' ||
                        c == '"' ||
                        (!args.count && c.is_ascii_digit()) =>
                {
                    cmd.register = Some(c);
                    arg = arg[c.len_utf8()..].trim_start().to_string();
                },
                _ => {},
            }
        }

        if args.count && arg.starts_with(|c: char| c.is_ascii_digit()) {
            let end = arg.find(|c: char| !c.is_ascii_digit()).unwrap_or(arg.len());
            let n = arg[..end].parse::<usize>().unwrap_or(usize::MAX);

            if n == 0 {
                return Err(CommandError::ZeroCount);
            }

            cmd.range.line1 = cmd.range.line2;
            cmd.range.line2 = cmd.range.line2.saturating_add(n - 1);
            cmd.count = Some(n);

            if cmd.range.line2 > line_count {
                return Err(CommandError::InvalidRange);
            }
            arg = arg[end..].trim_start().to_string();
        }

        if !args.extra {
            if !arg.is_empty() && !arg.starts_with(['|', '"', '#']) {
                return Err(CommandError::TrailingCharacters);
            }

            arg.clear();
        }

        match spec.id {
            CommandId::Write => {
                if let Some(s) = arg.strip_prefix('>') {
                    let s = s.strip_prefix('>').ok_or(CommandError::UseWriteAppend)?;
                    arg = s.trim_start().to_string();
                    cmd.append = true;
                } else if let Some(s) = arg.strip_prefix('!') {
                    arg = s.to_string();
                    cmd.filter = true;
                }
            },
            CommandId::Read => {
                cmd.filter = force;

                if let Some(s) = arg.strip_prefix('!') {
                    arg = s.to_string();
                    cmd.filter = true;
                }
            },
            CommandId::Bang => {
                cmd.filter = range.addr_count > 0;
            },
            CommandId::Global if force => {
                cmd.id = CommandId::Vglobal;
                cmd.name = "vglobal";
                cmd.force = false;
            },
            _ => {},
        }

        let mut extras = ArgExtras::default();

        if args.xfile {
            let rest_len = rest.as_ref().map_or(0, |r| r.chars().count());
            let expanded =
                expand_filenames(&arg, rest_len, &self.store.files, self.opts.max_length)?;

            arg = expanded.text;
            extras.alt_line = expanded.line;
        }

        if matches!(spec.id, CommandId::Edit | CommandId::Ex | CommandId::Visual) {
            let (plus, file) = split_plus_cmd(&arg);
            extras.plus_cmd = plus;
            arg = file.to_string();
        }

        if args.nospc && !cmd.filter && has_wildcard(&arg) {
            arg = self.store.completions.expand_single(&arg, &*host, self.opts)?;
        }

        cmd.arg = arg;

        log::debug!(
            "running :{} on lines {}-{} with {:?}",
            cmd.name,
            cmd.range.line1,
            cmd.range.line2,
            cmd.arg
        );

        return self.run_command(cmd, extras, host, screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FileService, LineBuffer};
    use crate::memory::{MemoryHost, MemoryScreen};

    struct TestEnv {
        store: Store,
        opts: ExOptions,
        host: MemoryHost,
        screen: MemoryScreen,
    }

    impl TestEnv {
        fn new(lines: &[&str]) -> Self {
            TestEnv {
                store: Store::default(),
                opts: ExOptions::default(),
                host: MemoryHost::new(lines),
                screen: MemoryScreen::default(),
            }
        }

        fn run(&mut self, text: &str) -> CommandResult {
            let mut interp = Interpreter::new(&mut self.store, &self.opts);

            interp.run(text, &mut self.host, &mut self.screen)
        }

        fn last(&self) -> ExCommand {
            self.host.dispatched().last().cloned().unwrap()
        }
    }

    fn five() -> TestEnv {
        let mut env = TestEnv::new(&["one", "two", "three", "four", "five"]);
        env.host.set_cursor_line(2);
        env
    }

    #[test]
    fn test_goto_line() {
        let mut env = five();

        env.run("4").unwrap();
        assert_eq!(env.host.cursor_line(), 4);

        env.run("0").unwrap();
        assert_eq!(env.host.cursor_line(), 1);

        env.run(":::$").unwrap();
        assert_eq!(env.host.cursor_line(), 5);

        env.run("-2 \" a comment").unwrap();
        assert_eq!(env.host.cursor_line(), 3);

        // Comments and blank lines do nothing.
        env.run("\" 1").unwrap();
        env.run("# 1").unwrap();
        env.run("   ").unwrap();
        assert_eq!(env.host.cursor_line(), 3);
        assert!(env.host.dispatched().is_empty());
    }

    #[test]
    fn test_invalid_range() {
        let mut env = five();

        assert_eq!(env.run("4,2d"), Err(CommandError::InvalidRange));
        assert_eq!(env.run("6"), Err(CommandError::InvalidRange));
        assert_eq!(env.run("1,9p"), Err(CommandError::InvalidRange));
        assert!(env.host.dispatched().is_empty());
        assert_eq!(env.screen.messages().last().map(String::as_str), Some("Invalid range"));
    }

    #[test]
    fn test_invalid_command() {
        let mut env = five();

        let err = env.run("frobnicate").unwrap_err();
        assert_eq!(err, CommandError::InvalidCommand("frobnicate".into()));

        let err = env.run("1*").unwrap_err();
        assert_eq!(err, CommandError::InvalidCommand("*".into()));
    }

    #[test]
    fn test_range_checks() {
        let mut env = five();

        assert_eq!(env.run("2quit"), Err(CommandError::NoRange));
        assert_eq!(env.run("d 1x"), Err(CommandError::TrailingCharacters));
        assert_eq!(env.run("d 0"), Err(CommandError::ZeroCount));
        assert_eq!(env.run("mark"), Err(CommandError::ArgumentRequired));
        assert!(env.host.dispatched().is_empty());
    }

    #[test]
    fn test_register_and_count() {
        let mut env = five();

        env.run("d a 2").unwrap();
        let cmd = env.last();
        assert_eq!(cmd.id, CommandId::Delete);
        assert_eq!(cmd.register, Some('a'));
        assert_eq!(cmd.count, Some(2));
        assert_eq!((cmd.range.line1, cmd.range.line2), (2, 3));

        env.run("1,2y 2").unwrap();
        let cmd = env.last();
        assert_eq!(cmd.register, None);
        assert_eq!((cmd.range.line1, cmd.range.line2), (2, 3));

        // Counts that run past the last line are rejected.
        let dispatched = env.host.dispatched().len();
        assert_eq!(env.run("1,2y 10"), Err(CommandError::InvalidRange));
        assert_eq!(env.run("2d 3"), Err(CommandError::InvalidRange));
        assert_eq!(env.host.dispatched().len(), dispatched);
        assert_eq!(env.host.lines().len(), 3);

        // Digits are registers for commands without counts.
        let _ = env.run("put 3");
        let cmd = env.last();
        assert_eq!(cmd.register, Some('3'));
        assert_eq!(cmd.count, None);
    }

    #[test]
    fn test_zero_range() {
        let mut env = five();

        let _ = env.run("0put");
        assert_eq!(env.last().range.line2, 0);

        env.run("0d").unwrap();
        assert_eq!(env.last().range.line2, 1);
    }

    #[test]
    fn test_default_all() {
        let mut env = five();

        env.run("g/o/d").unwrap();
        let cmd = env.last();
        assert_eq!(cmd.id, CommandId::Global);
        assert_eq!((cmd.range.line1, cmd.range.line2), (1, 5));
        assert_eq!(cmd.arg, "/o/d");

        env.run("g!/o/d").unwrap();
        let cmd = env.last();
        assert_eq!(cmd.id, CommandId::Vglobal);
        assert!(!cmd.force);
    }

    #[test]
    fn test_chaining() {
        let mut env = five();

        env.run("1d|$d").unwrap();
        assert_eq!(env.host.lines(), &["two", "three", "four"]);

        // A failing statement doesn't stop the ones after it.
        let res = env.run("9d|1d");
        assert_eq!(res, Err(CommandError::InvalidRange));
        assert_eq!(env.host.lines(), &["two", "three", "four"]);

        let res = env.run("d 1x|1d");
        assert_eq!(res, Err(CommandError::TrailingCharacters));
        assert_eq!(env.host.lines(), &["three", "four"]);

        // No bar splitting for :s.
        env.run("%s/e|/X/").unwrap();
        assert_eq!(env.last().arg, "/e|/X/");
    }

    #[test]
    fn test_comment_and_escaped_bar() {
        let mut env = five();

        env.run("map x a\\|b \" comment").unwrap();
        assert_eq!(env.last().arg, "x a|b \" comment");

        env.run("1d \" delete it").unwrap();
        assert_eq!(env.host.lines(), &["two", "three", "four", "five"]);
    }

    #[test]
    fn test_filename_macros() {
        let mut env = five();
        env.store.files.set_current(Some("foo.txt".into()));
        env.store.files.push_alternate("bar.c".into(), 3);

        env.run("cd %").unwrap();
        assert_eq!(env.last().arg, "foo.txt");

        env.run("!cc #< #").unwrap();
        assert_eq!(env.last().arg, "cc bar bar.c");

        env.run("!echo 100\\%").unwrap();
        assert_eq!(env.last().arg, "echo 100%");

        env.store.files.set_current(None);
        assert_eq!(env.run("cd %"), Err(CommandError::NoFileName));
        assert_eq!(env.run("cd #4"), Err(CommandError::NoAlternateFile));
    }

    #[test]
    fn test_filename_glob() {
        let mut env = five();
        env.host.add_file("notes.txt", &["a"]);
        env.host.add_file("notes.bak", &["b"]);
        env.host.add_file("todo.txt", &["c"]);
        env.host.add_file("todo.md", &["d"]);

        env.run("cd note*").unwrap();
        assert_eq!(env.last().arg, "notes.txt");

        assert_eq!(env.run("cd todo*"), Err(CommandError::TooManyMatches));
        assert_eq!(env.run("cd zzz*"), Err(CommandError::NoMatch));
    }

    #[test]
    fn test_write_append() {
        let mut env = five();
        env.store.files.set_current(Some("out.txt".into()));

        assert_eq!(env.run("w> out.txt"), Err(CommandError::UseWriteAppend));
        assert!(!env.host.file_exists("out.txt"));

        env.run("2,3w").unwrap();
        assert_eq!(env.host.file("out.txt").unwrap(), &["two", "three"]);

        env.run("1w >> out.txt").unwrap();
        assert_eq!(env.host.file("out.txt").unwrap(), &["two", "three", "one"]);

        env.run("w !sort").unwrap();
        let cmd = env.last();
        assert!(cmd.filter);
        assert_eq!(cmd.arg, "sort");
        assert_eq!((cmd.range.line1, cmd.range.line2), (1, 5));
    }

    #[test]
    fn test_copy_move_destination() {
        let mut env = five();

        env.run("1t$").unwrap();
        assert_eq!(env.host.lines(), &["one", "two", "three", "four", "five", "one"]);

        assert_eq!(env.run("1,3m 2"), Err(CommandError::MoveIntoSelf));
        assert_eq!(env.run("co"), Err(CommandError::InvalidAddress));
        assert_eq!(env.run("co 10"), Err(CommandError::InvalidAddress));

        env.run("5,6m0").unwrap();
        assert_eq!(env.host.lines(), &["five", "one", "one", "two", "three", "four"]);
    }

    #[test]
    fn test_load_and_reload() {
        let mut env = five();
        env.host.add_file("a.txt", &["a1", "a2", "a3"]);
        env.store.files.set_current(Some("a.txt".into()));

        env.host.load_file("a.txt").unwrap();
        env.host.set_cursor_line(3);

        // Reloading the same file keeps the cursor line.
        env.run("e").unwrap();
        assert_eq!(env.host.cursor_line(), 3);
        assert_eq!(env.store.files.alternate(0), None);
    }
}
