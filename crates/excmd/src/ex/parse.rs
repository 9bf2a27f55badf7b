use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, anychar, char, digit0, digit1, one_of, space0},
    combinator::{opt, peek, recognize, success, value},
    multi::many0,
    sequence::pair,
    IResult,
};

use crate::host::MoveDir1D;

const CTRL_V: char = '\u{16}';

/// The starting point of a single address term.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AddressBase {
    /// `.`, the cursor line.
    Current,

    /// `$`, the last line.
    Last,

    /// `'x`, the line of a mark. `None` if the mark name is missing.
    Mark(Option<char>),

    /// `/pat/` or `?pat?`, the next or previous line matching a pattern.
    Search(MoveDir1D, String),

    /// An absolute line number.
    Line(usize),
}

/// An address base followed by `+N` and `-N` offsets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressTerm {
    /// The starting point, or `None` to start from the current line.
    pub base: Option<AddressBase>,

    /// Sum of the offsets, or `None` if there weren't any.
    pub offset: Option<i64>,
}

/// A single address.
///
/// This is usually one term, but searches can be chained (`/foo//bar/`), with each search
/// starting from where the one before it matched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Address(pub Vec<AddressTerm>);

/// One position in a range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeItem {
    /// Nothing was typed here.
    Empty,

    /// `%`, every line in the buffer.
    All,

    /// An address.
    Address(Address),
}

/// What followed a position in a range.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeSep {
    /// `,` separates two addresses.
    Comma,

    /// `;` also makes the address before it the current line for the ones after it.
    Semicolon,
}

/// The range typed before a command name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeSpec(pub Vec<(RangeItem, Option<RangeSep>)>);

/// A command with the statement separator and comments stripped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BarSplit {
    /// The argument, up to the first unescaped `|` or `"`.
    pub text: String,

    /// Whatever followed an unescaped `|`.
    pub rest: Option<String>,
}

fn parse_number(input: &str) -> IResult<&str, usize> {
    let (input, n) = digit1(input)?;

    Ok((input, n.parse::<usize>().unwrap_or(usize::MAX)))
}

fn parse_line(input: &str) -> IResult<&str, AddressBase> {
    let (input, n) = parse_number(input)?;

    Ok((input, AddressBase::Line(n)))
}

fn parse_mark(input: &str) -> IResult<&str, AddressBase> {
    let (input, _) = char('\'')(input)?;
    let (input, c) = opt(anychar)(input)?;

    Ok((input, AddressBase::Mark(c)))
}

/// Parse a search pattern up to its closing delimiter, which may be left off at the end of
/// the input. An escaped delimiter is part of the pattern.
fn parse_search(input: &str) -> IResult<&str, AddressBase> {
    let (input, delim) = one_of("/?")(input)?;
    let dir = if delim == '/' { MoveDir1D::Next } else { MoveDir1D::Previous };

    let mut pattern = String::new();
    let mut chars = input.char_indices();
    let mut rest = "";

    while let Some((i, c)) = chars.next() {
        if c == delim {
            rest = &input[i + c.len_utf8()..];
            break;
        }

        if c == '\\' {
            match chars.next() {
                Some((_, n)) if n == delim => {
                    pattern.push(n);
                },
                Some((_, n)) => {
                    pattern.push(c);
                    pattern.push(n);
                },
                None => {
                    pattern.push(c);
                },
            }
        } else {
            pattern.push(c);
        }
    }

    Ok((rest, AddressBase::Search(dir, pattern)))
}

fn parse_base(input: &str) -> IResult<&str, AddressBase> {
    alt((
        parse_line,
        value(AddressBase::Current, char('.')),
        value(AddressBase::Last, char('$')),
        parse_mark,
        parse_search,
    ))(input)
}

fn parse_offset(input: &str) -> IResult<&str, i64> {
    let (input, (sign, n)) = pair(one_of("+-"), digit0)(input)?;

    // A bare '+' or '-' counts as 1.
    let n = if n.is_empty() { 1 } else { n.parse::<i64>().unwrap_or(i64::MAX) };
    let n = if sign == '-' { -n } else { n };

    Ok((input, n))
}

fn parse_term(input: &str) -> IResult<&str, AddressTerm> {
    let (input, base) = opt(parse_base)(input)?;
    let (input, offsets) = many0(parse_offset)(input)?;
    let offset = if offsets.is_empty() {
        None
    } else {
        Some(offsets.into_iter().fold(0i64, i64::saturating_add))
    };

    Ok((input, AddressTerm { base, offset }))
}

fn parse_chained_term(input: &str) -> IResult<&str, AddressTerm> {
    let (input, _) = peek(one_of("/?"))(input)?;

    parse_term(input)
}

/// Parse a single address. Returns `None` if nothing was typed.
pub fn parse_address(input: &str) -> IResult<&str, Option<Address>> {
    let (input, _) = space0(input)?;
    let (input, first) = parse_term(input)?;

    if first.base.is_none() && first.offset.is_none() {
        return Ok((input, None));
    }

    let (input, rest) = many0(parse_chained_term)(input)?;
    let mut terms = vec![first];
    terms.extend(rest);

    Ok((input, Some(Address(terms))))
}

fn parse_range_item(input: &str) -> IResult<&str, RangeItem> {
    let (input, _) = space0(input)?;
    let (input, addr) = parse_address(input)?;

    if let Some(addr) = addr {
        return Ok((input, RangeItem::Address(addr)));
    }

    alt((value(RangeItem::All, char('%')), success(RangeItem::Empty)))(input)
}

fn parse_range_sep(input: &str) -> IResult<&str, RangeSep> {
    alt((value(RangeSep::Comma, char(',')), value(RangeSep::Semicolon, char(';'))))(input)
}

/// Parse the range before a command name. This never fails; a missing range is a single
/// [RangeItem::Empty]. Nothing after a `%` is part of the range.
pub fn parse_range(input: &str) -> IResult<&str, RangeSpec> {
    let mut items = vec![];
    let mut input = input;

    loop {
        let (rest, item) = parse_range_item(input)?;

        if item == RangeItem::All {
            items.push((item, None));
            input = rest;
            break;
        }

        let (rest, sep) = opt(parse_range_sep)(rest)?;

        items.push((item, sep));
        input = rest;

        if sep.is_none() {
            break;
        }
    }

    Ok((input, RangeSpec(items)))
}

/// Parse a command name: a run of letters, or one of the single-character commands. `k` is
/// always taken alone, so that `:ka` sets mark `a`.
pub fn parse_cmd_name(input: &str) -> IResult<&str, &str> {
    alt((tag("k"), alpha1, recognize(one_of("@!=><&")), success("")))(input)
}

/// Parse a `!` following the command name.
pub fn parse_bang(input: &str) -> IResult<&str, bool> {
    let (input, bang) = opt(char('!'))(input)?;

    Ok((input, bang.is_some()))
}

/// Cut a command's argument at the first unescaped `|`, and at the first unescaped `"` when
/// `comments` is set.
///
/// A backslash before either character is removed and the character is kept. A `CTRL-V`
/// makes the following character literal; it is removed unless `keep_ctrlv` is set. Trailing
/// whitespace is trimmed when `comments` is set.
pub fn split_bar(arg: &str, comments: bool, keep_ctrlv: bool) -> BarSplit {
    let mut text = String::with_capacity(arg.len());
    let mut rest = None;
    let mut chars = arg.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            CTRL_V => {
                if keep_ctrlv {
                    text.push(c);
                }

                if let Some((_, n)) = chars.next() {
                    text.push(n);
                }
            },
            '|' | '"' if c == '|' || comments => {
                if text.ends_with('\\') {
                    text.pop();
                    text.push(c);
                    continue;
                }

                if c == '|' {
                    rest = Some(arg[i + 1..].to_string());
                }

                break;
            },
            c => text.push(c),
        }
    }

    if comments {
        trim_trailing_space(&mut text);
    }

    BarSplit { text, rest }
}

/// Remove trailing whitespace, keeping the first character and any escaped space.
fn trim_trailing_space(text: &mut String) {
    loop {
        let mut it = text.chars().rev();

        match (it.next(), it.next()) {
            (Some(c), Some(p)) if c.is_whitespace() && p != '\\' && p != CTRL_V => {
                text.pop();
            },
            _ => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! term {
        ($base: expr) => {
            AddressTerm { base: Some($base), offset: None }
        };
        ($base: expr, $off: expr) => {
            AddressTerm { base: $base, offset: Some($off) }
        };
    }

    macro_rules! addr {
        ( $( $term: expr ),* ) => {
            RangeItem::Address(Address(vec![ $( $term, )* ]))
        };
    }

    fn search(dir: MoveDir1D, pat: &str) -> AddressBase {
        AddressBase::Search(dir, pat.to_string())
    }

    #[test]
    fn test_parse_address_simple() {
        let res = parse_address("10d").unwrap();
        assert_eq!(res, ("d", Some(Address(vec![term!(AddressBase::Line(10))]))));

        let res = parse_address(".").unwrap();
        assert_eq!(res, ("", Some(Address(vec![term!(AddressBase::Current)]))));

        let res = parse_address("  $p").unwrap();
        assert_eq!(res, ("p", Some(Address(vec![term!(AddressBase::Last)]))));

        let res = parse_address("'ad").unwrap();
        assert_eq!(res, ("d", Some(Address(vec![term!(AddressBase::Mark(Some('a')))]))));

        let res = parse_address("'").unwrap();
        assert_eq!(res, ("", Some(Address(vec![term!(AddressBase::Mark(None))]))));

        let res = parse_address("d").unwrap();
        assert_eq!(res, ("d", None));
    }

    #[test]
    fn test_parse_address_offsets() {
        let res = parse_address("$-3").unwrap();
        assert_eq!(res, ("", Some(Address(vec![term!(Some(AddressBase::Last), -3)]))));

        let res = parse_address("+").unwrap();
        assert_eq!(res, ("", Some(Address(vec![term!(None, 1)]))));

        let res = parse_address("--").unwrap();
        assert_eq!(res, ("", Some(Address(vec![term!(None, -2)]))));

        let res = parse_address(".+2-1+").unwrap();
        assert_eq!(res, ("", Some(Address(vec![term!(Some(AddressBase::Current), 2)]))));

        // '+0' is not '+1'.
        let res = parse_address("5+0").unwrap();
        assert_eq!(res, ("", Some(Address(vec![term!(Some(AddressBase::Line(5)), 0)]))));
    }

    #[test]
    fn test_parse_address_search() {
        let res = parse_address("/foo/d").unwrap();
        let expect = vec![term!(search(MoveDir1D::Next, "foo"))];
        assert_eq!(res, ("d", Some(Address(expect))));

        let res = parse_address("?foo?").unwrap();
        let expect = vec![term!(search(MoveDir1D::Previous, "foo"))];
        assert_eq!(res, ("", Some(Address(expect))));

        // The closing delimiter can be left off.
        let res = parse_address("/foo").unwrap();
        let expect = vec![term!(search(MoveDir1D::Next, "foo"))];
        assert_eq!(res, ("", Some(Address(expect))));

        // Escaped delimiters are part of the pattern.
        let res = parse_address("/a\\/b\\d/").unwrap();
        let expect = vec![term!(search(MoveDir1D::Next, "a/b\\d"))];
        assert_eq!(res, ("", Some(Address(expect))));

        let res = parse_address("/foo/+1").unwrap();
        let expect = vec![term!(Some(search(MoveDir1D::Next, "foo")), 1)];
        assert_eq!(res, ("", Some(Address(expect))));
    }

    #[test]
    fn test_parse_address_chained() {
        let res = parse_address("/foo//bar/-1?baz?p").unwrap();
        let expect = vec![
            term!(search(MoveDir1D::Next, "foo")),
            term!(Some(search(MoveDir1D::Next, "bar")), -1),
            term!(search(MoveDir1D::Previous, "baz")),
        ];
        assert_eq!(res, ("p", Some(Address(expect))));
    }

    #[test]
    fn test_parse_range() {
        let res = parse_range("1,3d").unwrap();
        let expect = RangeSpec(vec![
            (addr!(term!(AddressBase::Line(1))), Some(RangeSep::Comma)),
            (addr!(term!(AddressBase::Line(3))), None),
        ]);
        assert_eq!(res, ("d", expect));

        let res = parse_range("%s/x/y/").unwrap();
        assert_eq!(res, ("s/x/y/", RangeSpec(vec![(RangeItem::All, None)])));

        let res = parse_range("%,3p").unwrap();
        assert_eq!(res, (",3p", RangeSpec(vec![(RangeItem::All, None)])));

        let res = parse_range("%;$d").unwrap();
        assert_eq!(res, (";$d", RangeSpec(vec![(RangeItem::All, None)])));

        let res = parse_range("d").unwrap();
        assert_eq!(res, ("d", RangeSpec(vec![(RangeItem::Empty, None)])));

        let res = parse_range(",5;+2p").unwrap();
        let expect = RangeSpec(vec![
            (RangeItem::Empty, Some(RangeSep::Comma)),
            (addr!(term!(AddressBase::Line(5))), Some(RangeSep::Semicolon)),
            (addr!(term!(None, 2)), None),
        ]);
        assert_eq!(res, ("p", expect));

        // Separators have to follow the address directly.
        let res = parse_range(" 2 , 4 y").unwrap();
        let expect = RangeSpec(vec![(addr!(term!(AddressBase::Line(2))), None)]);
        assert_eq!(res, (" , 4 y", expect));
    }

    #[test]
    fn test_parse_cmd_name() {
        assert_eq!(parse_cmd_name("delete x"), Ok((" x", "delete")));
        assert_eq!(parse_cmd_name("d3"), Ok(("3", "d")));
        assert_eq!(parse_cmd_name("ka"), Ok(("a", "k")));
        assert_eq!(parse_cmd_name("!ls"), Ok(("ls", "!")));
        assert_eq!(parse_cmd_name("@a"), Ok(("a", "@")));
        assert_eq!(parse_cmd_name(">>"), Ok((">", ">")));
        assert_eq!(parse_cmd_name("w!"), Ok(("!", "w")));
        assert_eq!(parse_cmd_name("1"), Ok(("1", "")));
        assert_eq!(parse_cmd_name(""), Ok(("", "")));

        assert_eq!(parse_bang("! foo"), Ok((" foo", true)));
        assert_eq!(parse_bang(" foo"), Ok((" foo", false)));
    }

    #[test]
    fn test_split_bar() {
        let res = split_bar(" foo.txt|10", true, false);
        assert_eq!(res, BarSplit { text: " foo.txt".into(), rest: Some("10".into()) });

        let res = split_bar(" a\\|b", true, false);
        assert_eq!(res, BarSplit { text: " a|b".into(), rest: None });

        let res = split_bar(" x \" comment | more", true, false);
        assert_eq!(res, BarSplit { text: " x".into(), rest: None });

        let res = split_bar(" x \" y|z", false, false);
        assert_eq!(res, BarSplit { text: " x \" y".into(), rest: Some("z".into()) });

        let res = split_bar(" a\u{16}|b|c", true, false);
        assert_eq!(res, BarSplit { text: " a|b".into(), rest: Some("c".into()) });

        let res = split_bar(" a\u{16}|b|c", true, true);
        assert_eq!(res, BarSplit { text: " a\u{16}|b".into(), rest: Some("c".into()) });

        let res = split_bar(" a\\  ", true, false);
        assert_eq!(res, BarSplit { text: " a\\ ".into(), rest: None });

        let res = split_bar("|", true, false);
        assert_eq!(res, BarSplit { text: "".into(), rest: Some("".into()) });
    }
}
