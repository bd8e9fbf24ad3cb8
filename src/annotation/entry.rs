//! Annotation values.

use std::fmt;

use serde::Serialize;

use crate::provider::Suggestion;

/// Identifier of a live correction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a correction was already applied to the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CorrectionKind {
    /// Applied automatically; the entry covers the replacement text and can
    /// be reverted to `original_value`.
    Auto,
    /// Awaiting a user decision; the entry covers the flagged text.
    Manual,
}

/// Which check produced a correction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CorrectionSource {
    Word,
    Grammar,
}

/// A correction anchored to a range of the live document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionEntry {
    pub id: AnnotationId,
    pub from: usize,
    pub to: usize,
    pub kind: CorrectionKind,
    pub source: CorrectionSource,
    /// Text before any correction was applied.
    pub original_value: String,
    /// Text currently at `from..to`.
    pub current_value: String,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CorrectionEntry {
    #[must_use]
    pub fn range(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    /// Whether this entry shares at least one char with `from..to`.
    #[must_use]
    pub fn overlaps(&self, from: usize, to: usize) -> bool {
        self.from < to && from < self.to
    }

    #[must_use]
    pub fn contains(&self, pos: usize) -> bool {
        self.from <= pos && pos < self.to
    }
}

/// A correction about to be added; the store assigns its id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCorrection {
    pub from: usize,
    pub to: usize,
    pub kind: CorrectionKind,
    pub source: CorrectionSource,
    pub original_value: String,
    pub current_value: String,
    pub suggestions: Vec<Suggestion>,
    pub message: Option<String>,
}

impl NewCorrection {
    /// A manual word correction flagging `text` at `from`.
    #[must_use]
    pub fn manual(from: usize, text: &str, suggestions: Vec<Suggestion>) -> Self {
        Self {
            from,
            to: from + text.chars().count(),
            kind: CorrectionKind::Manual,
            source: CorrectionSource::Word,
            original_value: text.to_string(),
            current_value: text.to_string(),
            suggestions,
            message: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: CorrectionSource) -> Self {
        self.source = source;
        self
    }

    pub(crate) fn into_entry(self, id: AnnotationId) -> CorrectionEntry {
        CorrectionEntry {
            id,
            from: self.from,
            to: self.to,
            kind: self.kind,
            source: self.source,
            original_value: self.original_value,
            current_value: self.current_value,
            suggestions: self.suggestions,
            message: self.message,
        }
    }
}

/// Ghost text shown after the cursor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionEntry {
    /// The whole predicted word or phrase, including what was typed.
    pub full_text: String,
    /// The part not typed yet.
    pub ghost_text: String,
    /// Cursor position the ghost text is drawn at.
    pub anchor_pos: usize,
}
