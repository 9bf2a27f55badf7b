//! # Error Types
//!
//! ## Overview
//!
//! Every failure that the command line can report is a [CommandError]. Errors abort the
//! statement they occur in, get shown to the user, and otherwise leave the session running.
use std::io;

/// Broad classification of a [CommandError].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Something the user typed was invalid.
    UserInput,

    /// A needed resource, like a file name, is missing.
    Resource,

    /// A collaborator failed while talking to the outside world.
    Environment,
}

/// Errors returned while editing or running a command.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum CommandError {
    /// The command name isn't in the command table.
    #[error("Not an editor command: {0}")]
    InvalidCommand(String),

    /// A range was given to a command that doesn't take one.
    #[error("No range allowed")]
    NoRange,

    /// The resolved range is out of order or past the end of the buffer.
    #[error("Invalid range")]
    InvalidRange,

    /// A destination address couldn't be parsed or resolved.
    #[error("Invalid address")]
    InvalidAddress,

    /// The command needs an argument.
    #[error("Argument required")]
    ArgumentRequired,

    /// The command was followed by an argument it doesn't accept.
    #[error("Trailing characters")]
    TrailingCharacters,

    /// A count of zero was given.
    #[error("Zero count")]
    ZeroCount,

    /// A mark used in an address isn't set.
    #[error("Unknown mark")]
    MarkNotSet,

    /// A search address didn't match any line.
    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    /// A search pattern couldn't be compiled.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// An empty search pattern was used before any other search.
    #[error("No previous regular expression")]
    NoPreviousPattern,

    /// The command would grow beyond the command line's maximum length.
    #[error("Command line too long")]
    TooLong,

    /// A file name pattern matched more than one file.
    #[error("Too many file names")]
    TooManyMatches,

    /// A file name pattern matched nothing.
    #[error("No match")]
    NoMatch,

    /// The buffer has no file name.
    #[error("No file name")]
    NoFileName,

    /// The requested alternate file doesn't exist.
    #[error("No alternate file")]
    NoAlternateFile,

    /// A number was expected in a digraph definition.
    #[error("Number expected")]
    InvalidNumber,

    /// The buffer has unsaved changes.
    #[error("No write since last change (use ! to override)")]
    NoWriteSinceLastChange,

    /// The buffer can't be written without forcing.
    #[error("File is readonly")]
    ReadOnly,

    /// Writing would overwrite an existing file.
    #[error("File exists (use ! to override)")]
    FileExists,

    /// `:w>` was typed instead of `:w>>`.
    #[error("Use w or w>>")]
    UseWriteAppend,

    /// A file couldn't be opened.
    #[error("Can't open file {0}")]
    NotOpen(String),

    /// `:!!` was used before any shell command.
    #[error("No previous command")]
    NoPreviousCommand,

    /// The register to execute is empty.
    #[error("Nothing in register {0}")]
    EmptyRegister(char),

    /// `:move` was asked to move lines into themselves.
    #[error("Move lines into themselves")]
    MoveIntoSelf,

    /// Commands sourced or executed each other too deeply.
    #[error("Command too recursive")]
    TooRecursive,

    /// The host doesn't implement the command.
    #[error("Not implemented: {0}")]
    Unimplemented(String),

    /// An I/O failure from a collaborator.
    #[error("{0}")]
    Environment(String),
}

impl CommandError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::NoFileName => ErrorKind::Resource,
            CommandError::NoAlternateFile => ErrorKind::Resource,
            CommandError::EmptyRegister(_) => ErrorKind::Resource,
            CommandError::NotOpen(_) => ErrorKind::Environment,
            CommandError::Environment(_) => ErrorKind::Environment,
            _ => ErrorKind::UserInput,
        }
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        CommandError::Environment(err.to_string())
    }
}

impl From<regex::Error> for CommandError {
    fn from(err: regex::Error) -> Self {
        CommandError::InvalidPattern(err.to_string())
    }
}

/// Common result type for command line operations.
pub type CommandResult<T = ()> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(CommandError::NoFileName.kind(), ErrorKind::Resource);
        assert_eq!(CommandError::NoAlternateFile.kind(), ErrorKind::Resource);
        assert_eq!(CommandError::InvalidRange.kind(), ErrorKind::UserInput);
        assert_eq!(CommandError::TooManyMatches.kind(), ErrorKind::UserInput);

        let err = CommandError::from(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        assert_eq!(err.kind(), ErrorKind::Environment);
        assert_eq!(err.to_string(), "disk on fire");
    }
}
