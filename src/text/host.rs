//! The text buffer interface the engine drives.
//!
//! The engine never owns the document. Hosts (a rich-text surface, a plain
//! text widget, or [`DocumentBuffer`](crate::text::DocumentBuffer)) implement
//! [`TextHost`] and hand themselves to each engine call.

use crate::text::edit::{Bias, Edit};

/// Selection expressed as anchor (fixed end) and head (moving end, the cursor).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    /// Collapsed selection at `pos`.
    #[must_use]
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// True if anchor and head coincide.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Carry the selection across an edit.
    #[must_use]
    pub fn map(&self, edit: &Edit) -> Self {
        Self {
            anchor: edit.map(self.anchor, Bias::After),
            head: edit.map(self.head, Bias::After),
        }
    }
}

/// Options for [`TextHost::replace`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Keep the change out of the undo history.
    pub skip_undo: bool,
}

impl ReplaceOptions {
    /// A change the user did not make directly.
    #[must_use]
    pub fn background() -> Self {
        Self { skip_undo: true }
    }
}

/// Live document the engine annotates.
///
/// All positions are char offsets.
pub trait TextHost {
    /// Document length in chars.
    fn len_chars(&self) -> usize;

    /// Text in `from..to`, clamped to the document.
    fn text(&self, from: usize, to: usize) -> String;

    /// Replace `from..to` with `text` as a single change.
    ///
    /// Returns the edit that was applied. Hosts may move the selection
    /// however they like here; callers that care re-set it afterwards.
    fn replace(&mut self, from: usize, to: usize, text: &str, options: ReplaceOptions) -> Edit;

    /// Current selection.
    fn selection(&self) -> Selection;

    /// Replace the selection. Positions are clamped to the document.
    fn set_selection(&mut self, selection: Selection);

    /// Map a position through an edit.
    fn map_position(&self, pos: usize, edit: &Edit, bias: Bias) -> usize {
        edit.map(pos, bias)
    }

    /// Cursor position (selection head).
    fn cursor(&self) -> usize {
        self.selection().head
    }

    /// Collapse the selection to `pos`.
    fn set_cursor(&mut self, pos: usize) {
        self.set_selection(Selection::cursor(pos));
    }

    /// Char at `pos`, if any.
    fn char_at(&self, pos: usize) -> Option<char> {
        if pos >= self.len_chars() {
            return None;
        }
        self.text(pos, pos + 1).chars().next()
    }

    /// The paragraph-like block containing `pos`, as `(from, to)` with `to`
    /// excluding the block separator.
    ///
    /// The default treats each newline-separated line as a block.
    fn block_range(&self, pos: usize) -> (usize, usize) {
        let text = self.text(0, self.len_chars());
        crate::unicode::line_bounds(&text, pos)
    }
}
