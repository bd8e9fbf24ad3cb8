//! Rope-backed plain-text document with selection and undo/redo.
//!
//! [`DocumentBuffer`] is the reference [`TextHost`]: hosts without a widget
//! of their own (tests, the demo binary, headless tools) drive the engine
//! through it.
//!
//! # Examples
//!
//! ```
//! use livecheck::text::{DocumentBuffer, ReplaceOptions, TextHost};
//!
//! let mut doc = DocumentBuffer::with_text("Teh cat");
//! doc.set_cursor(7);
//!
//! // A background correction stays out of the undo history.
//! doc.replace(0, 3, "The", ReplaceOptions::background());
//! assert_eq!(doc.to_string(), "The cat");
//! assert!(!doc.can_undo());
//! ```

// if-let-else is clearer than map_or for the history bookkeeping
#![allow(clippy::option_if_let_else)]

use crate::text::edit::Edit;
use crate::text::host::{ReplaceOptions, Selection, TextHost};
use crate::text::rope::RopeWrapper;

/// A recorded change for undo/redo.
#[derive(Clone, Debug)]
enum EditOp {
    Insert { offset: usize, text: String },
    Delete { offset: usize, text: String },
}

/// An unrecorded change being carried back through the history, in the
/// coordinates of the document right after the op it is compared with.
#[derive(Debug)]
struct Carried {
    from: usize,
    to: usize,
    text: String,
}

impl Carried {
    fn len_delta(&self) -> isize {
        self.text.chars().count() as isize - (self.to - self.from) as isize
    }

    fn shift_back(&mut self, len: usize) {
        self.from -= len;
        self.to -= len;
    }
}

/// Outcome of carrying a change back past one op.
enum Carry {
    /// The change lies beside the op; keep walking.
    Passed,
    /// The change falls inside inserted text and became part of it.
    Absorbed,
    /// The change straddles the op; older history cannot follow it.
    Conflict,
}

impl EditOp {
    fn invert(&self) -> Self {
        match self {
            Self::Insert { offset, text } => Self::Delete {
                offset: *offset,
                text: text.clone(),
            },
            Self::Delete { offset, text } => Self::Insert {
                offset: *offset,
                text: text.clone(),
            },
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Insert { text, .. } | Self::Delete { text, .. } => text,
        }
    }

    /// Move `change` from after this op to before it, adjusting the op so
    /// that replaying history still lines up with the document.
    fn carry(&mut self, change: &mut Carried) -> Carry {
        match self {
            Self::Insert { offset, text } => {
                let len = text.chars().count();
                let end = *offset + len;
                if change.from >= *offset && change.to <= end {
                    let mut rewritten: String = text.chars().take(change.from - *offset).collect();
                    rewritten.push_str(&change.text);
                    rewritten.extend(text.chars().skip(change.to - *offset));
                    *text = rewritten;
                    Carry::Absorbed
                } else if change.to <= *offset {
                    *offset = offset.saturating_add_signed(change.len_delta());
                    Carry::Passed
                } else if change.from >= end {
                    change.shift_back(len);
                    Carry::Passed
                } else {
                    Carry::Conflict
                }
            }
            Self::Delete { offset, text } => {
                if change.to <= *offset {
                    *offset = offset.saturating_add_signed(change.len_delta());
                    Carry::Passed
                } else if change.from >= *offset {
                    let len = text.chars().count();
                    change.from += len;
                    change.to += len;
                    Carry::Passed
                } else {
                    Carry::Conflict
                }
            }
        }
    }
}

/// Default maximum number of undo groups to retain.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 1000;

/// Edit history for undo/redo with bounded memory usage.
#[derive(Clone, Debug)]
struct History {
    undo_stack: Vec<Vec<EditOp>>,
    redo_stack: Vec<Vec<EditOp>>,
    current_group: Vec<EditOp>,
    /// Maximum number of undo groups to retain. Oldest entries are dropped when exceeded.
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current_group: Vec::new(),
            max_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl History {
    /// Record an op. Typing that continues the previous insert extends it.
    fn push(&mut self, op: EditOp) {
        self.redo_stack.clear();
        if let (Some(EditOp::Insert { offset: last, text: typed }), EditOp::Insert { offset, text }) =
            (self.current_group.last_mut(), &op)
        {
            if *offset == *last + typed.chars().count() {
                typed.push_str(text);
                return;
            }
        }
        self.current_group.push(op);
    }

    fn commit(&mut self) {
        if !self.current_group.is_empty() {
            self.undo_stack
                .push(std::mem::take(&mut self.current_group));
            if self.undo_stack.len() > self.max_depth {
                let excess = self.undo_stack.len() - self.max_depth;
                self.undo_stack.drain(..excess);
            }
        }
    }

    fn pop_undo(&mut self) -> Option<Vec<EditOp>> {
        self.commit();
        self.undo_stack.pop()
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || !self.current_group.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_group.clear();
    }

    /// Carry recorded ops across a change that is not itself recorded.
    ///
    /// The change is walked back through the ops, newest first. Ops beside
    /// it are shifted. Once it falls inside recorded typing it is folded
    /// into that text, as if it had been typed that way, and older ops are
    /// left alone. If it straddles an op, the group holding that op and
    /// every older group are forgotten; newer groups stay undoable. Redo
    /// does not survive a change to the document.
    fn rebase(&mut self, edit: &Edit) {
        self.redo_stack.clear();
        let mut change = Carried {
            from: edit.from,
            to: edit.to,
            text: edit.inserted().to_string(),
        };

        'walk: {
            for k in (0..self.current_group.len()).rev() {
                match self.current_group[k].carry(&mut change) {
                    Carry::Passed => {}
                    Carry::Absorbed => break 'walk,
                    Carry::Conflict => {
                        self.current_group.drain(..=k);
                        self.undo_stack.clear();
                        break 'walk;
                    }
                }
            }
            for g in (0..self.undo_stack.len()).rev() {
                for k in (0..self.undo_stack[g].len()).rev() {
                    match self.undo_stack[g][k].carry(&mut change) {
                        Carry::Passed => {}
                        Carry::Absorbed => break 'walk,
                        Carry::Conflict => {
                            self.undo_stack.drain(..=g);
                            break 'walk;
                        }
                    }
                }
            }
        }

        self.current_group.retain(|op| !op.text().is_empty());
        for group in &mut self.undo_stack {
            group.retain(|op| !op.text().is_empty());
        }
        self.undo_stack.retain(|group| !group.is_empty());
    }
}

/// Plain-text document with a selection and grouped undo/redo.
///
/// Offsets are char offsets. Every mutating method returns the [`Edit`]s it
/// applied so the caller can forward them to the engine.
#[derive(Clone, Debug, Default)]
pub struct DocumentBuffer {
    rope: RopeWrapper,
    selection: Selection,
    history: History,
}

impl DocumentBuffer {
    /// Create a new empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with initial text and the cursor at the start.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self {
            rope: RopeWrapper::from_str(text),
            ..Self::default()
        }
    }

    /// Create a document with a custom maximum undo history depth.
    #[must_use]
    pub fn with_max_history_depth(max_depth: usize) -> Self {
        let mut doc = Self::new();
        doc.history.max_depth = max_depth;
        doc
    }

    /// Get the current maximum undo history depth.
    #[must_use]
    pub fn max_history_depth(&self) -> usize {
        self.history.max_depth
    }

    /// Get the underlying rope.
    #[must_use]
    pub fn rope(&self) -> &RopeWrapper {
        &self.rope
    }

    /// Full text content.
    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the entire text, resetting selection and history.
    pub fn set_text(&mut self, text: &str) {
        self.rope.replace(text);
        self.selection = Selection::default();
        self.history.clear();
    }

    /// Select `anchor..head`.
    pub fn select(&mut self, anchor: usize, head: usize) {
        self.set_selection(Selection { anchor, head });
    }

    /// Type `text` over the selection, leaving the cursor after it.
    pub fn insert(&mut self, text: &str) -> Edit {
        let (from, to) = self.selection_bounds();
        let edit = self.apply(from, to, text, true);
        self.selection = Selection::cursor(from + edit.inserted_len());
        edit
    }

    /// Type `text` one char at a time, returning one edit per char.
    pub fn type_text(&mut self, text: &str) -> Vec<Edit> {
        let mut buf = [0u8; 4];
        text.chars()
            .map(|ch| self.insert(ch.encode_utf8(&mut buf)))
            .collect()
    }

    /// Delete the selection, or the char before the cursor.
    pub fn delete_backward(&mut self) -> Option<Edit> {
        let (from, to) = self.selection_bounds();
        let (from, to) = if from == to {
            if from == 0 {
                return None;
            }
            (from - 1, to)
        } else {
            (from, to)
        };
        let edit = self.apply(from, to, "", true);
        self.selection = Selection::cursor(from);
        Some(edit)
    }

    /// Delete the selection, or the char after the cursor.
    pub fn delete_forward(&mut self) -> Option<Edit> {
        let (from, to) = self.selection_bounds();
        let to = if from == to { to + 1 } else { to };
        if from >= self.rope.len_chars() {
            return None;
        }
        let edit = self.apply(from, to, "", true);
        self.selection = Selection::cursor(from);
        Some(edit)
    }

    /// Undo the last group of recorded changes.
    pub fn undo(&mut self) -> Vec<Edit> {
        let Some(ops) = self.history.pop_undo() else {
            return Vec::new();
        };

        let mut edits = Vec::new();
        for op in ops.iter().rev() {
            edits.push(self.apply_op(&op.invert()));
        }
        self.history.redo_stack.push(ops);
        edits
    }

    /// Redo the last undone group.
    pub fn redo(&mut self) -> Vec<Edit> {
        let Some(ops) = self.history.redo_stack.pop() else {
            return Vec::new();
        };

        let edits = ops.iter().map(|op| self.apply_op(op)).collect();
        self.history.undo_stack.push(ops);
        edits
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Commit current changes as an undo group.
    pub fn commit(&mut self) {
        self.history.commit();
    }

    fn selection_bounds(&self) -> (usize, usize) {
        let Selection { anchor, head } = self.selection;
        (anchor.min(head), anchor.max(head))
    }

    fn apply(&mut self, from: usize, to: usize, text: &str, record: bool) -> Edit {
        let len = self.rope.len_chars();
        let to = to.min(len);
        let from = from.min(to);
        let edit = Edit::replace(from, to, text);
        let removed = self.rope.slice(from, to).to_string();

        if record {
            if !removed.is_empty() {
                self.history.push(EditOp::Delete {
                    offset: from,
                    text: removed,
                });
            }
            if !text.is_empty() {
                self.history.push(EditOp::Insert {
                    offset: from,
                    text: text.to_string(),
                });
            }
        } else if !edit.is_noop() {
            self.history.rebase(&edit);
        }

        self.rope.remove(from, to);
        self.rope.insert(from, text);
        edit
    }

    fn apply_op(&mut self, op: &EditOp) -> Edit {
        let edit = match op {
            EditOp::Insert { offset, text } => {
                self.rope.insert(*offset, text);
                Edit::insert(*offset, text)
            }
            EditOp::Delete { offset, text } => {
                let end = offset + text.chars().count();
                self.rope.remove(*offset, end);
                Edit::delete(*offset, end)
            }
        };
        self.selection = Selection::cursor(edit.touched_range().1);
        edit
    }
}

impl TextHost for DocumentBuffer {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn text(&self, from: usize, to: usize) -> String {
        self.rope.slice(from, to).to_string()
    }

    fn replace(&mut self, from: usize, to: usize, text: &str, options: ReplaceOptions) -> Edit {
        let edit = self.apply(from, to, text, !options.skip_undo);
        // Like most editors, a programmatic replace leaves the cursor after it.
        self.selection = Selection::cursor(edit.touched_range().1);
        edit
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        let len = self.rope.len_chars();
        self.selection = Selection {
            anchor: selection.anchor.min(len),
            head: selection.head.min(len),
        };
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.rope.char(pos)
    }

    fn block_range(&self, pos: usize) -> (usize, usize) {
        self.rope.line_bounds(self.rope.char_to_line(pos))
    }
}
