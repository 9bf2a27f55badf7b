//! # Filename completion
//!
//! ## Overview
//!
//! This module expands wildcard patterns into file names, both for completing names on the
//! command line and for globbing the argument of commands like `:edit`.
//!
//! The last set of matches is kept in a [CompletionStore] so that pressing the completion key
//! again can step through them. Any other edit throws the set away.
use std::fs::DirEntry;
use std::path::Path;

use crate::errors::{CommandError, CommandResult};
use crate::host::Glob;
use crate::options::ExOptions;
use crate::util::{common_prefix, has_wildcard, wildcard_match};

/// Internal upper limit on number of completions to return.
pub(crate) const MAX_COMPLETIONS: usize = 500;

/// How to expand a pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExpandMode {
    /// Expand to exactly one name; anything else is an error.
    Single,

    /// Expand a new pattern, keeping the matches if there are several.
    Fresh,

    /// Move to the next kept match, stopping at the last.
    Next,

    /// Move to the previous kept match, stopping at the first.
    Previous,

    /// Move to the next kept match, wrapping around to the first.
    NextWrap,

    /// All matches of a new pattern, separated by spaces.
    All,

    /// The longest prefix shared by all matches of a new pattern.
    Longest,
}

/// Result of an expansion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expansion {
    /// Replace the pattern with this text.
    Found(String),

    /// Several names matched; this is the first of them.
    Ambiguous(String),

    /// No kept matches to move through.
    Nothing,
}

/// Matches kept between completion requests.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchSet {
    /// The names that matched, in order.
    pub matches: Vec<String>,

    /// The match currently shown, if any.
    pub index: Option<usize>,

    /// Where the completed name starts on the command line.
    pub start: usize,
}

/// Tracks the matches from the last filename completion.
#[derive(Clone, Debug, Default)]
pub struct CompletionStore {
    matches: Option<MatchSet>,
}

impl CompletionStore {
    /// Whether there are kept matches to step through.
    pub fn active(&self) -> bool {
        self.matches.is_some()
    }

    /// The kept matches.
    pub fn matches(&self) -> Option<&MatchSet> {
        self.matches.as_ref()
    }

    /// Forget the kept matches.
    pub fn clear(&mut self) {
        self.matches = None;
    }

    /// Remember where the name being completed starts, so that stepping through the kept
    /// matches replaces all of it.
    pub fn set_start(&mut self, start: usize) {
        if let Some(set) = self.matches.as_mut() {
            set.start = start;
        }
    }

    /// Expand `pattern` according to `mode`.
    pub fn expand(
        &mut self,
        pattern: &str,
        mode: ExpandMode,
        glob: &dyn Glob,
        opts: &ExOptions,
    ) -> CommandResult<Expansion> {
        match mode {
            ExpandMode::Next | ExpandMode::Previous | ExpandMode::NextWrap => {
                return Ok(self.cycle(mode));
            },
            ExpandMode::Single => {
                self.clear();

                return self.expand_single(pattern, glob, opts).map(Expansion::Found);
            },
            ExpandMode::Fresh => {
                self.clear();

                let matches = glob_matches(pattern, glob)?;

                match pick_match(&matches, opts) {
                    Some(idx) => {
                        return Ok(Expansion::Found(matches[idx].clone()));
                    },
                    None => {
                        let first = matches[0].clone();
                        self.matches = Some(MatchSet { matches, index: Some(0), start: 0 });

                        return Ok(Expansion::Ambiguous(first));
                    },
                }
            },
            ExpandMode::All => {
                self.clear();

                let matches = glob_matches(pattern, glob)?;

                return Ok(Expansion::Found(matches.join(" ")));
            },
            ExpandMode::Longest => {
                self.clear();

                let matches = glob_matches(pattern, glob)?;
                let mut prefix = matches[0].as_str();

                for m in matches.iter().skip(1) {
                    prefix = common_prefix(prefix, m);
                }

                let prefix = prefix.to_string();
                self.matches = Some(MatchSet { matches, index: None, start: 0 });

                return Ok(Expansion::Found(prefix));
            },
        }
    }

    /// Expand `pattern` to a single file name.
    ///
    /// Several matches are only accepted if all but one of them end in an ignored suffix.
    pub fn expand_single(
        &self,
        pattern: &str,
        glob: &dyn Glob,
        opts: &ExOptions,
    ) -> CommandResult<String> {
        let matches = glob_matches(pattern, glob)?;

        match pick_match(&matches, opts) {
            Some(idx) => Ok(matches[idx].clone()),
            None => Err(CommandError::TooManyMatches),
        }
    }

    fn cycle(&mut self, mode: ExpandMode) -> Expansion {
        let Some(set) = self.matches.as_mut() else {
            return Expansion::Nothing;
        };

        let last = set.matches.len().saturating_sub(1);
        let idx = match (mode, set.index) {
            (ExpandMode::Previous, None | Some(0)) => 0,
            (ExpandMode::Previous, Some(i)) => i - 1,
            (_, None) => 0,
            (ExpandMode::NextWrap, Some(i)) if i >= last => 0,
            (_, Some(i)) => (i + 1).min(last),
        };

        set.index = Some(idx);

        match set.matches.get(idx) {
            Some(m) => Expansion::Found(m.clone()),
            None => Expansion::Nothing,
        }
    }
}

fn glob_matches(pattern: &str, glob: &dyn Glob) -> CommandResult<Vec<String>> {
    let matches = glob.glob(pattern)?;

    log::debug!("expanded {:?} into {} names", pattern, matches.len());

    if matches.is_empty() {
        return Err(CommandError::NoMatch);
    }

    Ok(matches)
}

/// Index of the one match that doesn't end in an ignored suffix, if there's exactly one.
fn pick_match(matches: &[String], opts: &ExOptions) -> Option<usize> {
    if matches.len() == 1 {
        return Some(0);
    }

    let mut keep = matches
        .iter()
        .enumerate()
        .filter(|(_, m)| !opts.is_ignored_suffix(m))
        .map(|(i, _)| i);

    match (keep.next(), keep.next()) {
        (Some(idx), None) => Some(idx),
        _ => None,
    }
}

/// Arrange `names` into rows that fit in `columns`, filling each column from top to bottom.
pub fn format_columns(names: &[String], columns: usize) -> Vec<String> {
    if names.is_empty() {
        return vec![];
    }

    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0) + 2;
    let ncols = ((columns + 2) / width).max(1);
    let nrows = (names.len() + ncols - 1) / ncols;
    let mut rows = Vec::with_capacity(nrows);

    for r in 0..nrows {
        let mut row = String::new();
        let mut k = r;

        while k < names.len() {
            if k > r {
                let pad = width - names[k - nrows].chars().count();
                row.extend(std::iter::repeat(' ').take(pad));
            }

            row.push_str(&names[k]);
            k += nrows;
        }

        rows.push(row);
    }

    return rows;
}

/// Expands patterns by listing directories on the local filesystem.
///
/// Wildcards (`*`, `?` and `[...]`) are only supported in the last path component. Names
/// starting with `.` are only matched when the pattern starts with `.`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsGlob;

impl Glob for FsGlob {
    fn glob(&self, pattern: &str) -> CommandResult<Vec<String>> {
        let (dir, file) = match pattern.rfind('/') {
            Some(idx) => (&pattern[..=idx], &pattern[idx + 1..]),
            None => ("", pattern),
        };

        if !has_wildcard(file) {
            if Path::new(pattern).exists() {
                return Ok(vec![pattern.to_string()]);
            } else {
                return Ok(vec![]);
            }
        }

        let listing = if dir.is_empty() {
            std::env::current_dir()?.read_dir()
        } else {
            Path::new(dir).read_dir()
        };

        let Ok(listing) = listing else {
            return Ok(vec![]);
        };

        let filter = |entry: DirEntry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name.starts_with('.') && !file.starts_with('.') {
                return None;
            } else if wildcard_match(file, name.as_ref()) {
                return Some(format!("{dir}{name}"));
            } else {
                return None;
            }
        };

        let mut res: Vec<String> =
            listing.flatten().flat_map(filter).take(MAX_COMPLETIONS).collect();

        res.sort();

        return Ok(res);
    }
}
