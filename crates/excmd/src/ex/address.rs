use crate::errors::{CommandError, CommandResult};
use crate::host::{LineBuffer, Marks, MoveDir1D};

use super::parse::{Address, AddressBase, RangeItem, RangeSep, RangeSpec};

/// A resolved range of lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LineRange {
    /// First line in the range.
    pub line1: usize,

    /// Last line in the range.
    pub line2: usize,

    /// How many addresses were given.
    pub addr_count: usize,
}

impl LineRange {
    /// A range covering lines `line1` through `line2`.
    pub fn new(line1: usize, line2: usize) -> Self {
        LineRange { line1, line2, addr_count: 2 }
    }

    /// Number of lines in the range.
    pub fn len(&self) -> usize {
        self.line2.saturating_sub(self.line1) + 1
    }
}

fn search<H>(host: &mut H, cur: usize, dir: MoveDir1D, pattern: &str) -> CommandResult<usize>
where
    H: LineBuffer + Marks + ?Sized,
{
    let count = host.line_count();

    let start = match dir {
        MoveDir1D::Next if cur >= count => 1,
        MoveDir1D::Next => cur + 1,
        MoveDir1D::Previous if cur <= 1 => count,
        MoveDir1D::Previous => cur - 1,
    };

    match host.search_from(start, pattern, dir)? {
        Some(lnum) => Ok(lnum),
        None => Err(CommandError::PatternNotFound(pattern.to_string())),
    }
}

/// Resolve an address to a line number, treating `cur` as the current line.
///
/// The result may be 0 (before the first line) or past the end of the buffer; callers check
/// it against what they accept.
pub fn resolve_address<H>(addr: &Address, cur: usize, host: &mut H) -> CommandResult<usize>
where
    H: LineBuffer + Marks + ?Sized,
{
    let mut lnum = cur;

    for term in addr.0.iter() {
        let base = match &term.base {
            None | Some(AddressBase::Current) => cur,
            Some(AddressBase::Last) => host.line_count(),
            Some(AddressBase::Line(n)) => *n,
            Some(AddressBase::Mark(None)) => return Err(CommandError::MarkNotSet),
            Some(AddressBase::Mark(Some(c))) => {
                host.mark_line(*c).ok_or(CommandError::MarkNotSet)?
            },
            Some(AddressBase::Search(dir, pattern)) => search(host, lnum, *dir, pattern)?,
        };

        let offset = term.offset.unwrap_or(0);
        let res = i64::try_from(base).unwrap_or(i64::MAX).saturating_add(offset);

        if res < 0 {
            return Err(CommandError::InvalidRange);
        }

        lnum = usize::try_from(res).map_err(|_| CommandError::InvalidRange)?;
    }

    return Ok(lnum);
}

/// Resolve the range typed before a command.
///
/// Each address becomes the end of the range, with the previous end moving to the start. A
/// `;` after an address makes it the current line for the addresses that follow. With a single
/// address, the range starts and ends on it; with none, it's the current line and
/// [LineRange::addr_count] is 0.
pub fn resolve_range<H>(spec: &RangeSpec, host: &mut H) -> CommandResult<LineRange>
where
    H: LineBuffer + Marks + ?Sized,
{
    let mut cur = host.cursor_line();
    let mut range = LineRange { line1: cur, line2: cur, addr_count: 0 };
    let mut last_empty = false;

    for (item, sep) in spec.0.iter() {
        range.line1 = range.line2;
        range.line2 = cur;
        last_empty = false;

        match item {
            RangeItem::Empty => {
                last_empty = true;
            },
            RangeItem::All => {
                range.line1 = 1;
                range.line2 = host.line_count();
                range.addr_count += 1;
                last_empty = true;
            },
            RangeItem::Address(addr) => {
                range.line2 = resolve_address(addr, cur, host)?;
            },
        }

        range.addr_count += 1;

        if let Some(RangeSep::Semicolon) = sep {
            cur = range.line2.max(1);
        }
    }

    if range.addr_count == 1 {
        range.line1 = range.line2;

        if last_empty {
            range.addr_count = 0;
        }
    }

    return Ok(range);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ex::parse::parse_range;
    use crate::memory::MemoryHost;

    fn host() -> MemoryHost {
        let mut host = MemoryHost::new(&["alpha", "beta", "gamma", "delta", "beta again"]);
        host.set_cursor_line(3);
        host.set_mark('a', 2);
        host
    }

    fn range(s: &str, host: &mut MemoryHost) -> CommandResult<LineRange> {
        let (_, spec) = parse_range(s).unwrap();

        resolve_range(&spec, host)
    }

    fn lines(s: &str, host: &mut MemoryHost) -> (usize, usize, usize) {
        let r = range(s, host).unwrap();

        (r.line1, r.line2, r.addr_count)
    }

    #[test]
    fn test_no_range() {
        let mut host = host();

        assert_eq!(lines("d", &mut host), (3, 3, 0));
        assert_eq!(lines("", &mut host), (3, 3, 0));
    }

    #[test]
    fn test_single() {
        let mut host = host();

        assert_eq!(lines(".", &mut host), (3, 3, 1));
        assert_eq!(lines("5", &mut host), (5, 5, 1));
        assert_eq!(lines("$", &mut host), (5, 5, 1));
        assert_eq!(lines("'a", &mut host), (2, 2, 1));
        assert_eq!(lines("+", &mut host), (4, 4, 1));
        assert_eq!(lines("-2", &mut host), (1, 1, 1));
        assert_eq!(lines("$-1", &mut host), (4, 4, 1));
        assert_eq!(lines("0", &mut host), (0, 0, 1));
    }

    #[test]
    fn test_pairs() {
        let mut host = host();

        assert_eq!(lines("1,$", &mut host), (1, 5, 2));
        assert_eq!(lines("%", &mut host), (1, 5, 2));
        assert_eq!(lines(",4", &mut host), (3, 4, 2));
        assert_eq!(lines("2,", &mut host), (2, 3, 2));
        assert_eq!(lines("'a,.", &mut host), (2, 3, 2));
        assert_eq!(lines("1,2,4", &mut host), (2, 4, 3));

        // A backwards range resolves; rejecting it is up to the interpreter.
        assert_eq!(lines("4,2", &mut host), (4, 2, 2));
    }

    #[test]
    fn test_semicolon() {
        let mut host = host();

        assert_eq!(lines("1;+1", &mut host), (1, 2, 2));
        assert_eq!(lines("1,+1", &mut host), (1, 4, 2));
        assert_eq!(lines("0;.", &mut host), (0, 1, 2));

        // The cursor itself doesn't move.
        assert_eq!(host.cursor_line(), 3);
    }

    #[test]
    fn test_search() {
        let mut host = host();

        assert_eq!(lines("/beta/", &mut host), (5, 5, 1));
        assert_eq!(lines("?beta?", &mut host), (2, 2, 1));
        assert_eq!(lines("/alpha/", &mut host), (1, 1, 1));
        assert_eq!(lines("/beta/-1", &mut host), (4, 4, 1));
        assert_eq!(lines("/beta//beta/", &mut host), (2, 2, 1));
        assert_eq!(lines("/gamma/,/beta/", &mut host), (3, 5, 2));

        // Searching forward from the last line starts over at the top.
        host.set_cursor_line(5);
        assert_eq!(lines("/a/", &mut host), (1, 1, 1));

        let err = range("/nothing/", &mut host).unwrap_err();
        assert_eq!(err, CommandError::PatternNotFound("nothing".into()));
    }

    #[test]
    fn test_errors() {
        let mut host = host();

        assert_eq!(range("'z", &mut host), Err(CommandError::MarkNotSet));
        assert_eq!(range("'", &mut host), Err(CommandError::MarkNotSet));
        assert_eq!(range("1-5", &mut host), Err(CommandError::InvalidRange));
    }
}
