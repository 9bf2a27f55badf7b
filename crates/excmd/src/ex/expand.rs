use std::iter::Peekable;
use std::str::Chars;

use crate::errors::{CommandError, CommandResult};
use crate::store::FileRegistry;

/// A command argument after replacing `%` and `#` with file names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExpandedArg {
    /// The argument text.
    pub text: String,

    /// The remembered cursor line of the last alternate file used.
    pub line: Option<usize>,
}

/// Remove the extension from the last component of `path`.
fn strip_extension(path: &str) -> &str {
    let start = path.rfind('/').map_or(0, |i| i + 1);

    match path[start..].rfind('.') {
        Some(i) => &path[..start + i],
        None => path,
    }
}

/// Fail if the expanded text, the unexpanded remainder and what follows won't fit.
fn check_length(
    len: usize,
    remaining: &Peekable<Chars<'_>>,
    rest_len: usize,
    max_len: usize,
) -> CommandResult {
    if len + remaining.clone().count() + rest_len > max_len {
        return Err(CommandError::TooLong);
    }

    return Ok(());
}

/// Replace `%` with the current file name, `#` and `#N` with alternate file names, and `#<`
/// with the most recent alternate file name minus its extension.
///
/// A backslash before `%` or `#` is removed and the character kept. `rest_len` is the length
/// of whatever follows the argument on the command line, and counts towards `max_len`. Lengths
/// are in characters.
pub fn expand_filenames(
    arg: &str,
    rest_len: usize,
    files: &FileRegistry,
    max_len: usize,
) -> CommandResult<ExpandedArg> {
    let mut res = ExpandedArg { text: String::with_capacity(arg.len()), line: None };
    let mut chars = arg.chars().peekable();
    let mut len = 0;

    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('%' | '#')) => {
                if let Some(n) = chars.next() {
                    res.text.push(n);
                    len += 1;
                }

                continue;
            },
            '%' => {
                let current = files.current().ok_or(CommandError::NoFileName)?;

                res.text.push_str(current);
                len += current.chars().count();
            },
            '#' => {
                if chars.next_if_eq(&'<').is_some() {
                    let alt = files.alternate(0).ok_or(CommandError::NoAlternateFile)?;

                    let path = strip_extension(&alt.path);

                    res.text.push_str(path);
                    len += path.chars().count();
                    check_length(len, &chars, rest_len, max_len)?;
                    continue;
                }

                let mut n = 0usize;

                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    let d = d.to_digit(10).unwrap_or(0) as usize;
                    n = n.saturating_mul(10).saturating_add(d);
                }

                let alt = files.alternate(n).ok_or(CommandError::NoAlternateFile)?;

                res.text.push_str(&alt.path);
                res.line = Some(alt.line);
                len += alt.path.chars().count();
            },
            c => {
                res.text.push(c);
                len += 1;
                continue;
            },
        }

        check_length(len, &chars, rest_len, max_len)?;
    }

    return Ok(res);
}

/// Split a leading `+cmd` off of an `:edit` argument.
///
/// A `+` by itself means `+$`. Spaces in the command can be escaped with a backslash.
pub fn split_plus_cmd(arg: &str) -> (Option<String>, &str) {
    let Some(s) = arg.strip_prefix('+') else {
        return (None, arg);
    };

    let mut cmd = String::new();
    let mut chars = s.char_indices();
    let mut end = s.len();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, n)) = chars.next() {
                    if n != ' ' {
                        cmd.push(c);
                    }

                    cmd.push(n);
                }
            },
            ' ' | '\t' => {
                end = i;
                break;
            },
            c => cmd.push(c),
        }
    }

    if cmd.is_empty() {
        cmd.push('$');
    }

    return (Some(cmd), s[end..].trim_start());
}
