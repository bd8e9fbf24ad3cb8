//! Char-offset rope storage for [`DocumentBuffer`](super::DocumentBuffer).

use ropey::{Rope, RopeSlice};

/// Wrapper around ropey::Rope with clamped, char-offset convenience methods.
#[derive(Clone, Debug, Default)]
pub struct RopeWrapper {
    rope: Rope,
}

impl RopeWrapper {
    /// Create a rope from a string.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }

    /// Get the number of characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Get the number of lines.
    #[must_use]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get a slice of the rope, clamped to its length.
    #[must_use]
    pub fn slice(&self, from: usize, to: usize) -> RopeSlice<'_> {
        let len = self.len_chars();
        let to = to.min(len);
        let from = from.min(to);
        self.rope.slice(from..to)
    }

    /// Character at a position.
    #[must_use]
    pub fn char(&self, char_idx: usize) -> Option<char> {
        self.rope.get_char(char_idx)
    }

    /// Insert text at a character position.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        if char_idx <= self.len_chars() {
            self.rope.insert(char_idx, text);
        }
    }

    /// Remove `from..to`, clamped to the rope.
    pub fn remove(&mut self, from: usize, to: usize) {
        let len = self.len_chars();
        let to = to.min(len);
        if from < to {
            self.rope.remove(from..to);
        }
    }

    /// Replace the entire contents.
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Convert to string.
    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Convert char index to line index.
    #[must_use]
    pub fn char_to_line(&self, char_idx: usize) -> usize {
        self.rope.char_to_line(char_idx.min(self.len_chars()))
    }

    /// Get the char index at the start of a line.
    #[must_use]
    pub fn line_to_char(&self, line_idx: usize) -> usize {
        if line_idx >= self.len_lines() {
            self.len_chars()
        } else {
            self.rope.line_to_char(line_idx)
        }
    }

    /// Char range of a line, excluding its line break.
    #[must_use]
    pub fn line_bounds(&self, line_idx: usize) -> (usize, usize) {
        let start = self.line_to_char(line_idx);
        let Some(line) = self.rope.get_line(line_idx) else {
            return (start, start);
        };
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && line.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        (start, start + len)
    }
}
