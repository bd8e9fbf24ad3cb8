//! Edit descriptions and position mapping.
//!
//! An [`Edit`] describes one replacement in char offsets of the document as
//! it was *before* the edit. Everything that holds a position into the
//! document (annotations, predictions, pending check windows, the cursor)
//! is carried across an edit with [`Edit::map`].
//!
//! # Examples
//!
//! ```
//! use livecheck::text::{Bias, Edit};
//!
//! // "Teh cat" -> "The cat"
//! let edit = Edit::replace(0, 3, "The");
//! assert_eq!(edit.map(5, Bias::After), 5);
//!
//! // Typing at offset 3 of "abc"
//! let edit = Edit::insert(3, "d");
//! assert_eq!(edit.map(3, Bias::Before), 3);
//! assert_eq!(edit.map(3, Bias::After), 4);
//! ```

use serde::Serialize;

/// Which side a position sticks to when text is inserted exactly at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bias {
    /// Stay before inserted text.
    Before,
    /// Move past inserted text.
    After,
}

/// A single replacement of `from..to` (pre-edit offsets) with `inserted`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub from: usize,
    pub to: usize,
    inserted: String,
    #[serde(skip)]
    inserted_len: usize,
}

impl Edit {
    /// Replace `from..to` with `text`. Inverted bounds are swapped.
    #[must_use]
    pub fn replace(from: usize, to: usize, text: &str) -> Self {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        Self {
            from,
            to,
            inserted: text.to_string(),
            inserted_len: text.chars().count(),
        }
    }

    /// Insert `text` at `pos`.
    #[must_use]
    pub fn insert(pos: usize, text: &str) -> Self {
        Self::replace(pos, pos, text)
    }

    /// Delete `from..to`.
    #[must_use]
    pub fn delete(from: usize, to: usize) -> Self {
        Self::replace(from, to, "")
    }

    /// The inserted text.
    #[must_use]
    pub fn inserted(&self) -> &str {
        &self.inserted
    }

    /// Number of chars inserted.
    #[must_use]
    pub fn inserted_len(&self) -> usize {
        self.inserted_len
    }

    /// Number of chars removed.
    #[must_use]
    pub fn deleted_len(&self) -> usize {
        self.to - self.from
    }

    /// True if nothing was removed.
    #[must_use]
    pub fn is_insertion(&self) -> bool {
        self.from == self.to && self.inserted_len > 0
    }

    /// True if the edit does not change the document.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.inserted_len == 0
    }

    /// Signed change in document length.
    #[must_use]
    pub fn len_delta(&self) -> isize {
        self.inserted_len as isize - self.deleted_len() as isize
    }

    /// Post-edit range covering the inserted text (empty for deletions).
    #[must_use]
    pub fn touched_range(&self) -> (usize, usize) {
        (self.from, self.from + self.inserted_len)
    }

    /// The last inserted character, if any.
    #[must_use]
    pub fn last_inserted_char(&self) -> Option<char> {
        self.inserted.chars().next_back()
    }

    /// Map a pre-edit position to its post-edit position.
    ///
    /// Positions before the edit are unchanged and positions after it shift
    /// by the length delta. A position at the start of a replaced range
    /// stays at the start; one at its end follows the end of the new text.
    /// Positions strictly inside a replaced range, and positions at a pure
    /// insertion point, go to whichever side `bias` names.
    #[must_use]
    pub fn map(&self, pos: usize, bias: Bias) -> usize {
        if pos < self.from {
            return pos;
        }
        if pos > self.to {
            return pos - self.deleted_len() + self.inserted_len;
        }
        let side = if self.from == self.to {
            bias
        } else if pos == self.from {
            Bias::Before
        } else if pos == self.to {
            Bias::After
        } else {
            bias
        };
        match side {
            Bias::Before => self.from,
            Bias::After => self.from + self.inserted_len,
        }
    }

    /// Map a half-open range so that text inserted at either end stays
    /// outside it. Returns `None` if the range collapses.
    #[must_use]
    pub fn map_range(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        let new_from = self.map(from, Bias::After);
        let new_to = self.map(to, Bias::Before);
        (new_from < new_to).then_some((new_from, new_to))
    }

    /// Map a range that should grow when text is typed at its end, such as
    /// a pending check window. Returns `None` if it collapses.
    #[must_use]
    pub fn map_window(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        let new_from = self.map(from, Bias::Before);
        let new_to = self.map(to, Bias::After);
        (new_from < new_to).then_some((new_from, new_to))
    }

    /// True if the pre-edit range `from..to` (inclusive of its ends) is
    /// touched by this edit.
    #[must_use]
    pub fn touches(&self, from: usize, to: usize) -> bool {
        self.from <= to && self.to >= from
    }
}
