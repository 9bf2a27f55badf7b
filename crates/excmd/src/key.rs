//! # Input keys
//!
//! ## Overview
//!
//! This module contains code for representing keys read from the terminal.
//!
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key pressed in a terminal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TerminalKey {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl TerminalKey {
    /// Create a new key.
    pub fn new(code: KeyCode, mut modifiers: KeyModifiers) -> Self {
        if let KeyCode::Char(_) = code {
            // SHIFT is included for things like ':' and '?' on Windows, but not on *nix systems,
            // so remove it for characters, so that it doesn't break hashing and comparisons.
            modifiers -= KeyModifiers::SHIFT;
        }

        Self { code, modifiers }
    }

    /// The key's code.
    pub fn code(&self) -> KeyCode {
        self.code
    }

    /// The modifiers held while the key was pressed.
    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    pub(crate) fn get_char_mods(&self) -> Option<(char, KeyModifiers)> {
        if let KeyCode::Char(c) = self.code {
            return Some((c, self.modifiers));
        }

        None
    }

    /// Return this key's representation as a single codepoint, if it exists.
    pub fn get_literal_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) => {
                if (self.modifiers - KeyModifiers::SHIFT).is_empty() {
                    return Some(c);
                }

                if self.modifiers == KeyModifiers::CONTROL {
                    let cp = match c {
                        'a'..='z' => c as u32 - b'a' as u32 + 0x01,
                        ' ' | '@' => 0x0,
                        '[' => 0x1B,
                        '4'..='7' => c as u32 - b'4' as u32 + 0x1C,
                        _ => return None,
                    };

                    return char::from_u32(cp);
                }

                return None;
            },
            KeyCode::Tab if self.modifiers.is_empty() => {
                return Some('\u{09}');
            },
            KeyCode::Enter => {
                return Some('\u{0D}');
            },
            KeyCode::Esc => {
                return Some('\u{1B}');
            },
            KeyCode::Backspace => {
                return Some('\u{08}');
            },
            KeyCode::Delete => {
                return Some('\u{7F}');
            },
            _ => {
                return None;
            },
        }
    }

    /// Whether this key is a decimal digit without modifiers.
    pub(crate) fn get_digit(&self) -> Option<u32> {
        match self.get_char_mods() {
            Some((c, m)) if m.is_empty() => c.to_digit(10),
            _ => None,
        }
    }
}

impl From<KeyEvent> for TerminalKey {
    fn from(ke: KeyEvent) -> TerminalKey {
        TerminalKey::new(ke.code, ke.modifiers)
    }
}

impl From<KeyCode> for TerminalKey {
    fn from(code: KeyCode) -> TerminalKey {
        TerminalKey::new(code, KeyModifiers::NONE)
    }
}

impl From<char> for TerminalKey {
    /// Map a character onto the key that would type it, so that control characters become
    /// their named keys or `Ctrl` combinations.
    fn from(c: char) -> TerminalKey {
        match c {
            '\r' | '\n' => KeyCode::Enter.into(),
            '\t' => KeyCode::Tab.into(),
            '\u{1B}' => KeyCode::Esc.into(),
            '\u{08}' => KeyCode::Backspace.into(),
            '\u{7F}' => KeyCode::Delete.into(),
            '\u{00}' => TerminalKey::new(KeyCode::Char('@'), KeyModifiers::CONTROL),
            '\u{01}'..='\u{1A}' => {
                let c = char::from(c as u8 - 0x01 + b'a');

                TerminalKey::new(KeyCode::Char(c), KeyModifiers::CONTROL)
            },
            '\u{1C}'..='\u{1F}' => {
                let c = char::from(c as u8 - 0x1C + b'4');

                TerminalKey::new(KeyCode::Char(c), KeyModifiers::CONTROL)
            },
            c => KeyCode::Char(c).into(),
        }
    }
}

impl fmt::Display for TerminalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mods = String::new();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            mods.push_str("C-");
        }

        if self.modifiers.contains(KeyModifiers::SHIFT) {
            mods.push_str("S-");
        }

        if self.modifiers.contains(KeyModifiers::ALT) {
            mods.push_str("A-");
        }

        let name = match self.code {
            KeyCode::Char(c) if mods.is_empty() => return write!(f, "{c}"),
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Backspace => "BS".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::F(n) => format!("F{n}"),
            code => format!("{code:?}"),
        };

        write!(f, "<{mods}{name}>")
    }
}

/// Convert a string into the keys that would type it.
///
/// Control characters map onto their keys, so `"\r"` becomes `<Enter>` and `"\u{16}"` becomes
/// `<C-V>`.
pub fn keys_from_str(s: &str) -> Vec<TerminalKey> {
    s.chars().map(TerminalKey::from).collect()
}
