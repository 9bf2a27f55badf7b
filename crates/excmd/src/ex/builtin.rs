use crate::errors::{CommandError, CommandResult};
use crate::host::{ExHost, Screen, WriteFlags};

use super::{parse_address, resolve_address, CommandId, ExCommand, Interpreter};

/// Parts of the argument that only the interpreter's own commands use.
#[derive(Debug, Default)]
pub(super) struct ArgExtras {
    /// Command to run after `:edit` loads the file.
    pub plus_cmd: Option<String>,

    /// Line to return to when `#N` was used.
    pub alt_line: Option<usize>,
}

impl<'a> Interpreter<'a> {
    pub(super) fn run_command<H, S>(
        &mut self,
        mut cmd: ExCommand,
        extras: ArgExtras,
        host: &mut H,
        screen: &mut S,
    ) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        match cmd.id {
            CommandId::Edit | CommandId::Ex | CommandId::Visual => {
                return self.edit(&cmd, extras, host, screen);
            },
            CommandId::Write => {
                return self.write(&cmd, host);
            },
            CommandId::Wq => {
                self.write(&cmd, host)?;

                return host.dispatch(&cmd);
            },
            CommandId::Xit => {
                if host.modified() {
                    self.write(&cmd, host)?;
                }

                return host.dispatch(&cmd);
            },
            CommandId::Read => {
                return self.read(&cmd, host);
            },
            CommandId::File => {
                return self.file(&cmd, host, screen);
            },
            CommandId::Files => {
                return self.files(screen);
            },
            CommandId::Digraphs => {
                if cmd.arg.is_empty() {
                    for line in self.store.digraphs.listing(screen.columns()) {
                        screen.message(&line)?;
                    }

                    return Ok(());
                }

                return self.store.digraphs.define(&cmd.arg);
            },
            CommandId::Source if !cmd.force => {
                return self.source(&cmd, host, screen);
            },
            CommandId::At => {
                return self.execute_register(&cmd, host, screen);
            },
            CommandId::Equal => {
                screen.message(&format!("line {}", cmd.range.line2))?;

                return Ok(());
            },
            CommandId::Copy | CommandId::Move | CommandId::T => {
                cmd.dest = Some(self.destination(&cmd, host)?);

                return host.dispatch(&cmd);
            },
            CommandId::Bang => {
                cmd.arg = self.shell_command(&cmd)?;

                return host.dispatch(&cmd);
            },
            _ => {
                return host.dispatch(&cmd);
            },
        }
    }

    /// Run `text` as a nested command line. Errors inside it have already been shown by the
    /// time this returns, so only hitting the depth limit is an error here.
    fn run_nested<H, S>(&mut self, text: &str, host: &mut H, screen: &mut S) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        if self.depth >= self.opts.max_depth {
            log::warn!("not running {:?}: nested {} levels deep", text, self.depth);

            return Err(CommandError::TooRecursive);
        }

        self.depth += 1;
        let _ = self.run(text, host, screen);
        self.depth -= 1;

        Ok(())
    }

    fn edit<H, S>(
        &mut self,
        cmd: &ExCommand,
        extras: ArgExtras,
        host: &mut H,
        screen: &mut S,
    ) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        let other = !cmd.arg.is_empty() && self.store.files.is_other(&cmd.arg);

        if host.modified() && !cmd.force {
            // Remember the name so that ":e #" works once the buffer is saved.
            if other {
                self.store.files.push_alternate(cmd.arg.clone(), 1);
                host.on_alternate_inserted(true);
            }

            return Err(CommandError::NoWriteSinceLastChange);
        }

        let mut line = extras.alt_line;

        if other {
            if let Some(cur) = self.store.files.current() {
                let cur = cur.to_string();
                self.store.files.push_alternate(cur, host.cursor_line());
                host.on_alternate_inserted(false);
            }

            self.store.files.set_current(Some(cmd.arg.clone()));
        } else if line.is_none() {
            line = Some(host.cursor_line());
        }

        let name = self.store.files.current().ok_or(CommandError::NoFileName)?.to_string();

        host.load_file(&name)?;

        match extras.plus_cmd {
            Some(plus) => {
                self.run_nested(&plus, host, screen)?;
            },
            None => {
                if let Some(line) = line {
                    host.set_cursor_line(line.min(host.line_count()).max(1));
                }
            },
        }

        return Ok(());
    }

    fn write<H: ExHost>(&mut self, cmd: &ExCommand, host: &mut H) -> CommandResult {
        if cmd.filter {
            return host.dispatch(cmd);
        }

        let other = !cmd.arg.is_empty() && self.store.files.is_other(&cmd.arg);

        if other {
            self.store.files.push_alternate(cmd.arg.clone(), 1);
            host.on_alternate_inserted(true);
        } else if host.readonly() && !cmd.force {
            return Err(CommandError::ReadOnly);
        }

        let name = match (cmd.arg.is_empty(), self.store.files.current()) {
            (false, _) => cmd.arg.clone(),
            (true, Some(cur)) => cur.to_string(),
            (true, None) => return Err(CommandError::NoFileName),
        };

        if other && !cmd.force && !cmd.append && host.file_exists(&name) {
            return Err(CommandError::FileExists);
        }

        let mut flags = WriteFlags::NONE;

        if cmd.force {
            flags |= WriteFlags::FORCE;
        }

        if cmd.append {
            flags |= WriteFlags::APPEND;
        }

        return host.write_file(&name, &cmd.range, flags);
    }

    fn read<H: ExHost>(&mut self, cmd: &ExCommand, host: &mut H) -> CommandResult {
        if cmd.filter {
            return host.dispatch(cmd);
        }

        let name = match (cmd.arg.is_empty(), self.store.files.current()) {
            (false, _) => cmd.arg.as_str(),
            (true, Some(cur)) => cur,
            (true, None) => return Err(CommandError::NoFileName),
        };

        let n = host.read_file(name, cmd.range.line2)?;
        log::debug!("read {} lines from {:?}", n, name);

        Ok(())
    }

    fn file<H, S>(&mut self, cmd: &ExCommand, host: &mut H, screen: &mut S) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        if !cmd.arg.is_empty() {
            if let Some(cur) = self.store.files.current() {
                let cur = cur.to_string();
                self.store.files.push_alternate(cur, host.cursor_line());
                host.on_alternate_inserted(false);
            }

            self.store.files.set_current(Some(cmd.arg.clone()));
        }

        let name = self.store.files.current().unwrap_or("No File");
        let modified = if host.modified() { " [Modified]" } else { "" };
        let info = format!(
            "\"{}\"{} line {} of {}",
            name,
            modified,
            host.cursor_line(),
            host.line_count()
        );

        screen.message(&info)?;

        Ok(())
    }

    fn files<S: Screen>(&mut self, screen: &mut S) -> CommandResult {
        let files = &self.store.files;

        if let Some(cur) = files.current() {
            screen.message(&format!("  % \"{}\"", cur))?;
        }

        for (i, alt) in files.alternates().enumerate() {
            screen.message(&format!("{:>3} \"{}\" line {}", i, alt.path, alt.line))?;
        }

        Ok(())
    }

    fn source<H, S>(&mut self, cmd: &ExCommand, host: &mut H, screen: &mut S) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        for line in host.source_lines(&cmd.arg)? {
            self.run_nested(&line, host, screen)?;
        }

        Ok(())
    }

    fn execute_register<H, S>(
        &mut self,
        cmd: &ExCommand,
        host: &mut H,
        screen: &mut S,
    ) -> CommandResult
    where
        H: ExHost,
        S: Screen,
    {
        let name = cmd.arg.chars().next().unwrap_or('"');

        host.set_cursor_line(cmd.range.line2);

        let text = host
            .register_text(name)
            .filter(|text| !text.is_empty())
            .ok_or(CommandError::EmptyRegister(name))?;

        for line in text.lines() {
            self.run_nested(line, host, screen)?;
        }

        Ok(())
    }

    fn destination<H: ExHost>(&mut self, cmd: &ExCommand, host: &mut H) -> CommandResult<usize> {
        let (rest, addr) = parse_address(&cmd.arg).map_err(|_| CommandError::InvalidAddress)?;
        let addr = addr.ok_or(CommandError::InvalidAddress)?;

        if !rest.trim().is_empty() {
            return Err(CommandError::TrailingCharacters);
        }

        let dest = resolve_address(&addr, host.cursor_line(), host)?;

        if dest > host.line_count() {
            return Err(CommandError::InvalidAddress);
        }

        if cmd.id == CommandId::Move && dest >= cmd.range.line1 && dest < cmd.range.line2 {
            return Err(CommandError::MoveIntoSelf);
        }

        Ok(dest)
    }

    /// Build the shell command for `:!`, substituting the previous one for `:!!` and for a
    /// `!` following the first word, and remember the result.
    fn shell_command(&mut self, cmd: &ExCommand) -> CommandResult<String> {
        let arg = cmd.arg.as_str();
        let word_end = arg.find([' ', '\t']).unwrap_or(arg.len());
        let after_word = arg[word_end..].trim_start_matches([' ', '\t']);

        let (head, trail) = match after_word.strip_prefix('!') {
            Some(trail) => (&arg[..arg.len() - after_word.len()], Some(trail)),
            None => (arg, None),
        };

        let prev = self.store.shell_command.as_deref().unwrap_or_default();

        if (cmd.force || trail.is_some()) && self.store.shell_command.is_none() {
            return Err(CommandError::NoPreviousCommand);
        }

        let mut text = String::new();

        if cmd.force {
            text.push_str(prev);
        }

        text.push_str(head);

        if let Some(trail) = trail {
            text.push_str(prev);
            text.push_str(trail);
        }

        if text.chars().count() > self.opts.max_length {
            return Err(CommandError::TooLong);
        }

        self.store.shell_command = Some(text.clone());

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::CommandError;
    use crate::ex::{CommandId, Interpreter};
    use crate::host::{FileService, LineBuffer};
    use crate::memory::{MemoryHost, MemoryScreen};
    use crate::options::ExOptions;
    use crate::store::{AltFile, Store};

    fn setup() -> (Store, ExOptions, MemoryHost, MemoryScreen) {
        let mut host = MemoryHost::new(&["main 1", "main 2", "main 3"]);
        host.add_file("main.txt", &["main 1", "main 2", "main 3"]);
        host.add_file("foo.txt", &(1..=20).map(|i| format!("foo {i}")).collect::<Vec<_>>());
        host.set_cursor_line(2);

        let mut store = Store::default();
        store.files.set_current(Some("main.txt".into()));

        (store, ExOptions::default(), host, MemoryScreen::default())
    }

    #[test]
    fn test_edit_chained_goto() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        interp.run("e foo.txt|10", &mut host, &mut screen).unwrap();

        assert_eq!(host.line_count(), 20);
        assert_eq!(host.cursor_line(), 10);
        assert_eq!(store.files.current(), Some("foo.txt"));
        assert_eq!(store.files.alternate(0), Some(&AltFile { path: "main.txt".into(), line: 2 }));
        assert_eq!(host.alternates_inserted(), &[false]);
    }

    #[test]
    fn test_edit_alternate_returns_to_line() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        interp.run("e foo.txt", &mut host, &mut screen).unwrap();
        interp.run("15", &mut host, &mut screen).unwrap();
        interp.run("e #", &mut host, &mut screen).unwrap();

        assert_eq!(host.line_count(), 3);
        assert_eq!(host.cursor_line(), 2);

        interp.run("e #", &mut host, &mut screen).unwrap();
        assert_eq!(host.cursor_line(), 15);
        assert_eq!(store.files.current(), Some("foo.txt"));
    }

    #[test]
    fn test_edit_plus_cmd() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        interp.run("e + foo.txt", &mut host, &mut screen).unwrap();
        assert_eq!(host.cursor_line(), 20);

        interp.run("e +/3/ main.txt", &mut host, &mut screen).unwrap();
        assert_eq!(host.cursor_line(), 3);
    }

    #[test]
    fn test_edit_modified() {
        let (mut store, opts, mut host, mut screen) = setup();
        host.set_modified(true);

        let mut interp = Interpreter::new(&mut store, &opts);
        let res = interp.run("e foo.txt", &mut host, &mut screen);
        assert_eq!(res, Err(CommandError::NoWriteSinceLastChange));
        assert_eq!(store.files.current(), Some("main.txt"));
        assert_eq!(store.files.alternate(0).map(|f| f.path.as_str()), Some("foo.txt"));
        assert_eq!(host.alternates_inserted(), &[true]);
        assert_eq!(host.line_count(), 3);

        let mut interp = Interpreter::new(&mut store, &opts);
        interp.run("e! #", &mut host, &mut screen).unwrap();
        assert_eq!(store.files.current(), Some("foo.txt"));
        assert_eq!(host.line_count(), 20);
        assert_eq!(host.cursor_line(), 1);
    }

    #[test]
    fn test_write_no_file_name() {
        let (mut store, opts, mut host, mut screen) = setup();
        store.files.set_current(None);

        let mut interp = Interpreter::new(&mut store, &opts);
        let res = interp.run("w!", &mut host, &mut screen);

        assert_eq!(res, Err(CommandError::NoFileName));
        assert_eq!(res.unwrap_err().kind(), crate::errors::ErrorKind::Resource);
        assert!(host.writes().is_empty());
        assert_eq!(screen.messages(), &["No file name"]);
    }

    #[test]
    fn test_write_checks() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        assert_eq!(interp.run("w foo.txt", &mut host, &mut screen), Err(CommandError::FileExists));
        assert_eq!(host.file("foo.txt").map(|f| f.len()), Some(20));

        interp.run("w! foo.txt", &mut host, &mut screen).unwrap();
        assert_eq!(host.file("foo.txt").map(|f| f.len()), Some(3));

        interp.run("2w new.txt", &mut host, &mut screen).unwrap();
        assert_eq!(host.file("new.txt").unwrap(), &["main 2"]);
        assert_eq!(store.files.alternate(0).map(|f| f.path.as_str()), Some("new.txt"));

        host.set_readonly(true);
        let mut interp = Interpreter::new(&mut store, &opts);
        assert_eq!(interp.run("w", &mut host, &mut screen), Err(CommandError::ReadOnly));
        interp.run("w!", &mut host, &mut screen).unwrap();
    }

    #[test]
    fn test_wq_and_xit() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        interp.run("x", &mut host, &mut screen).unwrap();
        assert!(host.writes().is_empty());
        assert_eq!(host.dispatched().last().map(|c| c.id), Some(CommandId::Xit));

        interp.run("wq", &mut host, &mut screen).unwrap();
        assert_eq!(host.writes(), &["main.txt"]);
        assert_eq!(host.dispatched().last().map(|c| c.id), Some(CommandId::Wq));

        host.set_modified(true);
        interp.run("x", &mut host, &mut screen).unwrap();
        assert_eq!(host.writes(), &["main.txt", "main.txt"]);
    }

    #[test]
    fn test_read() {
        let (mut store, opts, mut host, mut screen) = setup();
        host.add_file("two.txt", &["a", "b"]);

        let mut interp = Interpreter::new(&mut store, &opts);
        interp.run("1r two.txt", &mut host, &mut screen).unwrap();
        assert_eq!(host.lines(), &["main 1", "a", "b", "main 2", "main 3"]);

        interp.run("0r two.txt", &mut host, &mut screen).unwrap();
        assert_eq!(host.lines()[..3], ["a", "b", "main 1"]);

        interp.run("r !ls", &mut host, &mut screen).unwrap();
        let cmd = host.dispatched().last().cloned().unwrap();
        assert!(cmd.filter);
        assert_eq!(cmd.arg, "ls");

        interp.run("r! date", &mut host, &mut screen).unwrap();
        let cmd = host.dispatched().last().cloned().unwrap();
        assert!(cmd.filter);
        assert_eq!(cmd.arg, "date");

        let res = interp.run("r missing.txt", &mut host, &mut screen);
        assert_eq!(res, Err(CommandError::NotOpen("missing.txt".into())));
    }

    #[test]
    fn test_file_and_files() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        interp.run("f", &mut host, &mut screen).unwrap();
        assert_eq!(screen.messages().last().unwrap(), "\"main.txt\" line 2 of 3");

        interp.run("file other.txt", &mut host, &mut screen).unwrap();
        interp.run("files", &mut host, &mut screen).unwrap();

        let msgs = screen.messages();
        assert_eq!(&msgs[msgs.len() - 2..], ["  % \"other.txt\"", "  0 \"main.txt\" line 2"]);
    }

    #[test]
    fn test_digraphs() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        interp.run("dig hh 9472 ab 10", &mut host, &mut screen).unwrap();
        assert_eq!(store.digraphs.lookup('h', 'h'), '\u{2500}');
        assert_eq!(store.digraphs.lookup('a', 'b'), '\n');

        let mut interp = Interpreter::new(&mut store, &opts);
        let res = interp.run("dig xy z", &mut host, &mut screen);
        assert_eq!(res, Err(CommandError::InvalidNumber));

        interp.run("digraphs", &mut host, &mut screen).unwrap();
        assert!(screen.messages().iter().any(|m| m.contains("hh \u{2500} 9472")));
    }

    #[test]
    fn test_source_and_register() {
        let (mut store, opts, mut host, mut screen) = setup();
        host.add_file("cmds.vim", &["\" delete the first line", "1d", "$"]);
        host.set_register('q', "1d\n$d\n");

        let mut interp = Interpreter::new(&mut store, &opts);
        interp.run("so cmds.vim", &mut host, &mut screen).unwrap();
        assert_eq!(host.lines(), &["main 2", "main 3"]);
        assert_eq!(host.cursor_line(), 2);

        host.set_lines(&["a", "b", "c", "d"]);
        interp.run("@q", &mut host, &mut screen).unwrap();
        assert_eq!(host.lines(), &["b", "c"]);

        let res = interp.run("@z", &mut host, &mut screen);
        assert_eq!(res, Err(CommandError::EmptyRegister('z')));

        interp.run("so! cmds.vim", &mut host, &mut screen).unwrap();
        assert_eq!(host.dispatched().last().map(|c| c.id), Some(CommandId::Source));
    }

    #[test]
    fn test_recursion_limit() {
        let (mut store, mut opts, mut host, mut screen) = setup();
        opts.max_depth = 5;
        host.add_file("loop.vim", &["so loop.vim"]);

        let mut interp = Interpreter::new(&mut store, &opts);
        interp.run("so loop.vim", &mut host, &mut screen).unwrap();

        let msgs = screen.messages();
        assert_eq!(msgs, &["Command too recursive"]);
    }

    #[test]
    fn test_equal() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        interp.run("$=", &mut host, &mut screen).unwrap();
        assert_eq!(screen.messages(), &["line 3"]);
    }

    #[test]
    fn test_shell_command() {
        let (mut store, opts, mut host, mut screen) = setup();
        let mut interp = Interpreter::new(&mut store, &opts);

        let res = interp.run("!!", &mut host, &mut screen);
        assert_eq!(res, Err(CommandError::NoPreviousCommand));

        interp.run("!make", &mut host, &mut screen).unwrap();
        interp.run("!!", &mut host, &mut screen).unwrap();
        assert_eq!(host.dispatched().last().unwrap().arg, "make");

        interp.run("!echo ! done", &mut host, &mut screen).unwrap();
        assert_eq!(host.dispatched().last().unwrap().arg, "echo make done");

        interp.run("1,2!sort", &mut host, &mut screen).unwrap();
        let cmd = host.dispatched().last().cloned().unwrap();
        assert!(cmd.filter);
        assert_eq!(store.shell_command.as_deref(), Some("sort"));
    }
}
