use std::collections::VecDeque;

use crate::host::MoveDir1D;

/// Result of stepping through the history.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Recall<'a> {
    /// Replace the command line with this entry.
    Entry(&'a str),

    /// Moved forward past the newest entry: empty the command line.
    Clear,

    /// Nothing to move to.
    Unchanged,
}

/// A fixed-size ring of previously entered command lines.
///
/// Once the ring is full, pushing a new line drops the oldest one. Positions used with
/// [HistoryRing::recall] count from the oldest entry, with `None` meaning "not on a history
/// line".
#[derive(Clone, Debug)]
pub struct HistoryRing {
    capacity: usize,
    entries: VecDeque<String>,
}

impl HistoryRing {
    /// Create a ring that holds up to `capacity` lines.
    pub fn new(capacity: usize) -> Self {
        HistoryRing { capacity, entries: VecDeque::with_capacity(capacity) }
    }

    /// Maximum number of lines held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lines currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry at `idx`, counting from the oldest.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.entries.get(idx).map(String::as_str)
    }

    /// Iterate over the entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Change how many lines the ring holds, keeping the most recent ones.
    ///
    /// If the memory for a bigger ring can't be allocated, nothing changes.
    pub fn resize(&mut self, capacity: usize) {
        if capacity == self.capacity {
            return;
        }

        if capacity > self.entries.capacity() &&
            self.entries.try_reserve_exact(capacity - self.entries.len()).is_err()
        {
            return;
        }

        while self.entries.len() > capacity {
            let _ = self.entries.pop_front();
        }

        log::debug!("history resized from {} to {} entries", self.capacity, capacity);
        self.capacity = capacity;
    }

    /// Remember a copy of `text` without its surrounding whitespace. Blank lines aren't stored.
    pub fn push(&mut self, text: &str) {
        let text = text.trim();

        if self.capacity == 0 || text.is_empty() {
            return;
        }

        while self.entries.len() >= self.capacity {
            let _ = self.entries.pop_front();
        }

        self.entries.push_back(text.to_string());
    }

    /// Step from `pos` in `dir`, updating `pos`.
    ///
    /// With a `prefix`, entries that don't start with it are skipped over, and if none match
    /// then `pos` doesn't move. Moving forward from the newest entry leaves the history and
    /// returns [Recall::Clear].
    pub fn recall(
        &self,
        pos: &mut Option<usize>,
        dir: MoveDir1D,
        prefix: Option<&str>,
    ) -> Recall<'_> {
        if self.capacity == 0 || self.entries.is_empty() {
            return Recall::Unchanged;
        }

        let newest = self.entries.len() - 1;
        let mut cur = *pos;

        loop {
            let next = match (dir, cur) {
                (MoveDir1D::Previous, None) => newest,
                (MoveDir1D::Previous, Some(0)) => return Recall::Unchanged,
                (MoveDir1D::Previous, Some(i)) => i - 1,
                (MoveDir1D::Next, None) => return Recall::Unchanged,
                (MoveDir1D::Next, Some(i)) if i >= newest => {
                    *pos = None;
                    return Recall::Clear;
                },
                (MoveDir1D::Next, Some(i)) => i + 1,
            };

            let entry = self.entries[next].as_str();

            if prefix.map_or(true, |p| entry.starts_with(p)) {
                *pos = Some(next);
                return Recall::Entry(entry);
            }

            cur = Some(next);
        }
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        HistoryRing::new(20)
    }
}
