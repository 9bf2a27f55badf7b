use crate::errors::{CommandError, CommandResult};

macro_rules! digraphs {
    { $( $c: literal <- $d1: literal + $d2: literal ),* } => {
        [ $( (($d1, $d2), $c), )* ]
    };
}

const ISO8859_DIGRAPHS: [((char, char), char); 95] = include!("iso8859.digraphs");

/// Width of one entry in a digraph listing, including the separating spaces.
const LISTING_WIDTH: usize = 11;

/// Storage for mapping [digraphs] onto their characters.
///
/// Lookups check the user's definitions first, in the order they were made, and then the
/// ISO-8859-1 defaults. A user definition of `'\0'` removes a digraph.
///
/// [digraphs]: https://en.wikipedia.org/wiki/Digraph_(orthography)
#[derive(Clone, Debug, Default)]
pub struct DigraphTable {
    user: Vec<((char, char), char)>,
}

impl DigraphTable {
    /// Create a new table with only the default digraphs.
    pub fn new() -> Self {
        DigraphTable::default()
    }

    /// Compose `c1` and `c2`. If they don't form a digraph, `c2` is returned.
    pub fn lookup(&self, c1: char, c2: char) -> char {
        let found = self
            .user
            .iter()
            .chain(ISO8859_DIGRAPHS.iter())
            .find(|(dg, _)| *dg == (c1, c2))
            .map(|(_, c)| *c);

        match found {
            None | Some('\0') => c2,
            Some(c) => c,
        }
    }

    /// Map `(c1, c2)` onto `c`, replacing any earlier user definition of the same pair.
    pub fn put(&mut self, c1: char, c2: char, c: char) {
        if let Some(entry) = self.user.iter_mut().find(|(dg, _)| *dg == (c1, c2)) {
            entry.1 = c;
            return;
        }

        if self.user.try_reserve(1).is_err() {
            return;
        }

        self.user.push(((c1, c2), c));
    }

    /// Apply definitions written as `{c1}{c2} {code} {c1}{c2} {code} ...`, where each code is
    /// a decimal number.
    ///
    /// Pairs defined before a malformed number stay defined.
    pub fn define(&mut self, defs: &str) -> CommandResult {
        let mut chars = defs.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_ascii_whitespace()).is_some() {}

            let (Some(c1), Some(c2)) = (chars.next(), chars.next()) else {
                return Ok(());
            };

            while chars.next_if(|c| c.is_ascii_whitespace()).is_some() {}

            let mut n: u32 = 0;
            let mut digits = 0;

            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                n = n.saturating_mul(10).saturating_add(d as u32 - '0' as u32);
                digits += 1;
            }

            if digits == 0 {
                return Err(CommandError::InvalidNumber);
            }

            let c = char::from_u32(n).ok_or(CommandError::InvalidNumber)?;

            self.put(c1, c2, c);
        }
    }

    /// All digraphs currently in effect: the defaults that haven't been redefined, followed by
    /// the user's definitions. Removed digraphs are skipped.
    pub fn list(&self) -> Vec<((char, char), char)> {
        let defaults = ISO8859_DIGRAPHS
            .iter()
            .filter(|((c1, c2), c)| self.lookup(*c1, *c2) == *c);
        let user = self.user.iter().filter(|(_, c)| *c != '\0');

        defaults.chain(user).cloned().collect()
    }

    /// Format [list](Self::list) for display, packing as many entries per row as fit in
    /// `columns`.
    pub fn listing(&self, columns: usize) -> Vec<String> {
        let mut rows = vec![];
        let mut row = String::new();
        let mut len = 0;

        for ((c1, c2), c) in self.list() {
            if len > columns.saturating_sub(LISTING_WIDTH) {
                rows.push(std::mem::take(&mut row));
                len = 0;
            }

            if len > 0 {
                row.push_str("   ");
            }

            row.push_str(&format!("{c1}{c2} {c} {:3}", c as u32));
            len += LISTING_WIDTH;
        }

        if !row.is_empty() {
            rows.push(row);
        }

        return rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let table = DigraphTable::new();

        assert_eq!(table.lookup('a', '"'), 'ä');
        assert_eq!(table.lookup('s', 's'), 'ß');
        assert_eq!(table.lookup('~', '!'), '¡');
        assert_eq!(table.lookup('y', '"'), 'ÿ');
        assert_eq!(table.lookup('/', '\\'), '×');

        // Unknown pairs give back the second character.
        assert_eq!(table.lookup('q', 'z'), 'z');
        assert_eq!(table.lookup('"', 'a'), 'a');
    }

    #[test]
    fn test_put_overrides() {
        let mut table = DigraphTable::new();

        table.put('a', '"', 'x');
        assert_eq!(table.lookup('a', '"'), 'x');

        table.put('a', '"', 'y');
        assert_eq!(table.lookup('a', '"'), 'y');
        assert_eq!(table.user.len(), 1);

        table.put('q', 'z', '\u{263A}');
        assert_eq!(table.lookup('q', 'z'), '\u{263A}');
    }

    #[test]
    fn test_put_zero_removes() {
        let mut table = DigraphTable::new();

        table.put('a', '"', '\0');
        assert_eq!(table.lookup('a', '"'), '"');

        table.put('q', 'z', 'Q');
        table.put('q', 'z', '\0');
        assert_eq!(table.lookup('q', 'z'), 'z');

        // Redefining brings it back.
        table.put('a', '"', 'ä');
        assert_eq!(table.lookup('a', '"'), 'ä');
    }

    #[test]
    fn test_define() {
        let mut table = DigraphTable::new();

        table.define("e: 235 a* 229").unwrap();
        assert_eq!(table.lookup('e', ':'), 'ë');
        assert_eq!(table.lookup('a', '*'), 'å');

        table.define("  xy 65  ").unwrap();
        assert_eq!(table.lookup('x', 'y'), 'A');

        // A dangling pair with no number is ignored.
        table.define("zz").unwrap();
        assert_eq!(table.lookup('z', 'z'), 'z');
    }

    #[test]
    fn test_define_bad_number() {
        let mut table = DigraphTable::new();

        let res = table.define("ab 66 cd xx ef 70");
        assert_eq!(res, Err(CommandError::InvalidNumber));

        // Pairs before the error are kept, and nothing after it is applied.
        assert_eq!(table.lookup('a', 'b'), 'B');
        assert_eq!(table.lookup('e', 'f'), 'f');

        let res = table.define("gh 55296");
        assert_eq!(res, Err(CommandError::InvalidNumber));
    }

    #[test]
    fn test_list() {
        let mut table = DigraphTable::new();
        let all = table.list();

        assert_eq!(all.len(), ISO8859_DIGRAPHS.len());
        assert_eq!(all[0], (('~', '!'), '¡'));

        table.put('a', '"', 'x');
        table.put('s', 's', '\0');
        table.put('q', 'q', 'Q');

        let all = table.list();
        assert!(!all.contains(&(('a', '"'), 'ä')));
        assert!(!all.iter().any(|(dg, _)| *dg == ('s', 's')));

        // User entries come after the defaults, in the order they were defined.
        let n = all.len();
        assert_eq!(all[n - 2], (('a', '"'), 'x'));
        assert_eq!(all[n - 1], (('q', 'q'), 'Q'));
    }

    #[test]
    fn test_listing() {
        let mut table = DigraphTable::new();
        let rows = table.listing(80);

        assert_eq!(rows[0].get(..9), Some("~! ¡ 161"));
        assert!(rows.len() > 1);

        table = DigraphTable::new();
        for ((c1, c2), _) in ISO8859_DIGRAPHS.iter() {
            table.put(*c1, *c2, '\0');
        }
        table.put('x', 'y', 'A');
        assert_eq!(table.listing(80), vec!["xy A  65".to_string()]);
    }
}
