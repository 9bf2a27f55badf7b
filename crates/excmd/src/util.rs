use unicode_width::UnicodeWidthChar;

#[allow(unused)]
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[allow(unused_macros)]
macro_rules! key_event {
    ($ch: literal) => {
        KeyEvent::new(KeyCode::Char($ch), match $ch.is_ascii_uppercase() {
            true => crossterm::event::KeyModifiers::SHIFT,
            false => crossterm::event::KeyModifiers::NONE,
        })
    };
    ($kc: expr) => {
        KeyEvent::new($kc, crossterm::event::KeyModifiers::NONE)
    };
    ($kc: literal, $km: expr) => {
        KeyEvent::new(KeyCode::Char($kc), $km)
    };
    ($kc: expr, $km: expr) => {
        KeyEvent::new($kc, $km)
    };
}

#[allow(unused_macros)]
macro_rules! key {
    ($ch: literal) => {
        $crate::key::TerminalKey::from(key_event!($ch))
    };
    ($kc: expr) => {
        $crate::key::TerminalKey::from(key_event!($kc))
    };
    ($kc: literal, $km: expr) => {
        $crate::key::TerminalKey::from(key_event!($kc, $km))
    };
    ($kc: expr, $km: expr) => {
        $crate::key::TerminalKey::from(key_event!($kc, $km))
    };
}

#[allow(unused_macros)]
macro_rules! ctl {
    ($ch: literal) => {
        key!(KeyCode::Char($ch.to_ascii_lowercase()), KeyModifiers::CONTROL)
    };
}

#[allow(unused_macros)]
macro_rules! strs {
    ( $( $ss: expr ),* ) => {
        vec![ $( String::from($ss), )* ]
    };
}

/// Characters that make up a word for word-erase and abbreviations.
#[inline]
pub(crate) fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Control characters are shown as `^X`.
pub(crate) fn translate_char(c: char) -> String {
    match c {
        '\u{00}'..='\u{1F}' => format!("^{}", char::from(c as u8 + b'@')),
        '\u{7F}' => String::from("^?"),
        c => c.to_string(),
    }
}

/// Number of screen columns needed to show a character.
pub(crate) fn char_width(c: char) -> usize {
    match c {
        '\u{00}'..='\u{1F}' | '\u{7F}' => 2,
        c => UnicodeWidthChar::width(c).unwrap_or(1),
    }
}

pub(crate) fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

pub(crate) fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    if a == b {
        return a;
    }

    let mut idx = a.len();

    for ((i, ca), cb) in a.char_indices().zip(b.chars()) {
        if ca != cb {
            idx = i;
            break;
        }
    }

    if b.len() < idx {
        idx = b.len();

        while !a.is_char_boundary(idx) {
            idx -= 1;
        }
    }

    return &a[..idx];
}

pub(crate) fn has_wildcard(s: &str) -> bool {
    s.chars().any(|c| matches!(c, '*' | '?' | '['))
}

/// Match `name` against a shell-style pattern using `*`, `?` and `[...]`.
pub(crate) fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    return wildcard_match_at(&pat, &name);
}

fn wildcard_match_at(pat: &[char], name: &[char]) -> bool {
    match pat.first() {
        None => name.is_empty(),
        Some('*') => (0..=name.len()).any(|i| wildcard_match_at(&pat[1..], &name[i..])),
        Some('?') => !name.is_empty() && wildcard_match_at(&pat[1..], &name[1..]),
        Some('[') => {
            let Some(c) = name.first() else {
                return false;
            };

            match bracket_match(&pat[1..], *c) {
                Some((true, used)) => wildcard_match_at(&pat[1 + used..], &name[1..]),
                Some((false, _)) => false,
                None => name.first() == Some(&'[') && wildcard_match_at(&pat[1..], &name[1..]),
            }
        },
        Some('\\') if pat.len() > 1 => {
            name.first() == Some(&pat[1]) && wildcard_match_at(&pat[2..], &name[1..])
        },
        Some(p) => name.first() == Some(p) && wildcard_match_at(&pat[1..], &name[1..]),
    }
}

/// Returns whether `c` is in the class, and how many pattern characters the class used.
fn bracket_match(pat: &[char], c: char) -> Option<(bool, usize)> {
    let mut i = 0;
    let negated = matches!(pat.first(), Some('!' | '^'));

    if negated {
        i += 1;
    }

    let mut found = false;
    let mut first = true;

    while i < pat.len() {
        if pat[i] == ']' && !first {
            return Some((found != negated, i + 1));
        }

        if i + 2 < pat.len() && pat[i + 1] == '-' && pat[i + 2] != ']' {
            if pat[i] <= c && c <= pat[i + 2] {
                found = true;
            }

            i += 3;
        } else {
            if pat[i] == c {
                found = true;
            }

            i += 1;
        }

        first = false;
    }

    return None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix("foobar", "foobaz"), "fooba");
        assert_eq!(common_prefix("foo", "foobar"), "foo");
        assert_eq!(common_prefix("foobar", "foo"), "foo");
        assert_eq!(common_prefix("abc", "xyz"), "");
        assert_eq!(common_prefix("same", "same"), "same");
        assert_eq!(common_prefix("ébc", "éxy"), "é");
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("*.c", "main.c"));
        assert!(!wildcard_match("*.c", "main.h"));
        assert!(wildcard_match("ma?n.*", "main.rs"));
        assert!(wildcard_match("[mn]ain*", "nain.c"));
        assert!(!wildcard_match("[!mn]ain*", "main.c"));
        assert!(wildcard_match("[a-c]x", "bx"));
        assert!(!wildcard_match("[a-c]x", "dx"));
        assert!(wildcard_match("\\*", "*"));
        assert!(!wildcard_match("\\*", "a"));
    }

    #[test]
    fn test_translate() {
        assert_eq!(translate_char('\u{01}'), "^A");
        assert_eq!(translate_char('\u{1B}'), "^[");
        assert_eq!(translate_char('\u{7F}'), "^?");
        assert_eq!(translate_char('x'), "x");
        assert_eq!(str_width("a\u{16}b"), 4);
        assert_eq!(has_wildcard("foo*"), true);
        assert_eq!(has_wildcard("foo.c"), false);
    }
}
