//! # excmd
//!
//! ## Overview
//!
//! This crate implements the command line of a modal text editor: the small line editor that
//! collects an Ex command after `:` is pressed, and the interpreter that resolves the command's
//! line range, looks up its name, validates its arguments and dispatches it.
//!
//! The editor owning the buffer, the screen and the filesystem plugs in through the traits in
//! [host]. Shared state (history, digraphs, alternate files and the last completion) lives in a
//! single [store::Store], which is borrowed by whichever half is active.
//!
//! The usual entry point is [session::ExSession]:
//!
//! ```
//! use std::collections::VecDeque;
//!
//! use excmd::memory::{MemoryHost, MemoryScreen};
//! use excmd::session::ExSession;
//!
//! let mut host = MemoryHost::new(&["one", "two", "three", "four", "five"]);
//! let mut screen = MemoryScreen::default();
//! let mut session = ExSession::default();
//!
//! session.run_command_string("2,3d", &mut host, &mut screen).unwrap();
//!
//! assert_eq!(host.lines(), &["one", "four", "five"]);
//! assert_eq!(host.cursor(), 2);
//!
//! let mut keys = VecDeque::from(excmd::key::keys_from_str("$d\r"));
//! let accepted = session.run_command_line(':', &mut keys, &mut host, &mut screen).unwrap();
//!
//! assert!(accepted);
//! assert_eq!(host.lines(), &["one", "four"]);
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

#[macro_use]
mod util;

pub mod cmdline;
pub mod completion;
pub mod errors;
pub mod ex;
pub mod host;
pub mod key;
pub mod memory;
pub mod options;
pub mod session;
pub mod store;

pub use crossterm;
