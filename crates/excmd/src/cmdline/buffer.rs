use crate::util::{char_width, is_id_char};

/// The text being edited on the command line.
///
/// The cursor is a character index in `0..=len`. Insertions that would take the buffer past its
/// maximum length are dropped.
#[derive(Clone, Debug)]
pub(crate) struct CommandBuffer {
    chars: Vec<char>,
    cursor: usize,
    max: usize,
}

impl CommandBuffer {
    /// Create an empty buffer holding at most `max` characters.
    pub fn new(max: usize) -> Self {
        CommandBuffer { chars: Vec::new(), cursor: 0, max }
    }

    /// The buffer's contents.
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Text from the start of the line up to the cursor.
    pub fn before_cursor(&self) -> String {
        self.chars[..self.cursor].iter().collect()
    }

    /// Text from the cursor to the end of the line.
    pub fn after_cursor(&self) -> String {
        self.chars[self.cursor..].iter().collect()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The largest number of characters this buffer may hold.
    pub fn max(&self) -> usize {
        self.max
    }

    pub fn get(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    /// Screen column of the cursor, relative to the start of the text.
    pub fn column(&self) -> usize {
        self.chars[..self.cursor].iter().copied().map(char_width).sum()
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.chars.len());
    }

    /// Replace the contents, leaving the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().take(self.max).collect();
        self.cursor = self.chars.len();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Insert `c` at the cursor and move past it, unless the buffer is full.
    pub fn insert(&mut self, c: char) -> bool {
        if self.chars.len() + 2 >= self.max {
            return false;
        }

        self.chars.insert(self.cursor, c);
        self.cursor += 1;

        return true;
    }

    /// Remove the characters in `start..end` and put `text` in their place, leaving the cursor
    /// after it.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) {
        let end = end.min(self.chars.len());
        let start = start.min(end);

        self.chars.splice(start..end, text.chars());
        self.cursor = start + text.chars().count();
    }

    /// Remove the character before the cursor.
    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    /// Remove the word before the cursor, along with any spaces between it and the cursor.
    ///
    /// A word is a run of identifier characters, or a run of other non-space characters.
    pub fn delete_word(&mut self) {
        let end = self.cursor;
        let mut start = end;

        while start > 0 && self.chars[start - 1] == ' ' {
            start -= 1;
        }

        if start > 0 {
            let class = is_id_char(self.chars[start - 1]);

            while start > 0 {
                let c = self.chars[start - 1];

                if c == ' ' || is_id_char(c) != class {
                    break;
                }

                start -= 1;
            }
        }

        self.chars.drain(start..end);
        self.cursor = start;
    }

    /// Where the filename being typed starts: just after the last space before the cursor.
    pub fn fragment_start(&self) -> usize {
        self.chars[..self.cursor].iter().rposition(|c| *c == ' ').map_or(0, |i| i + 1)
    }

    /// Where the word before the cursor starts, counting only identifier characters.
    pub fn word_start(&self) -> usize {
        self.chars[..self.cursor].iter().rposition(|c| !is_id_char(*c)).map_or(0, |i| i + 1)
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}
