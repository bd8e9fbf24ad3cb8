//! The authoritative set of live annotations.
//!
//! [`AnnotationStore`] holds every current correction plus at most one
//! prediction. All changes go through [`AnnotationStore::reduce`], and every
//! document edit goes through [`AnnotationStore::remap`], which keeps these
//! invariants:
//!
//! - every correction range lies within the document and is non-empty,
//! - no two correction ranges overlap,
//! - `current_value` equals the live text at the range, otherwise the
//!   entry is gone.

mod entry;

use std::collections::HashSet;

pub use entry::{
    AnnotationId, CorrectionEntry, CorrectionKind, CorrectionSource, NewCorrection,
    PredictionEntry,
};

use crate::text::{Bias, Edit, TextHost};
use crate::unicode::{is_word_char, normalize_word};

/// Engine-internal state transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    AddCorrection(NewCorrection),
    RemoveCorrection(AnnotationId),
    SetPrediction(PredictionEntry),
    ClearPrediction,
    /// Remove a correction and stop flagging its text for the session.
    Dismiss(AnnotationId),
}

/// Why an addition was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// First writer wins.
    Overlaps(AnnotationId),
    /// Empty, inverted or out-of-bounds range.
    InvalidRange,
    /// The document no longer holds `current_value` there.
    TextMismatch,
    /// The user dismissed this text earlier.
    Dismissed,
}

/// Outcome of [`AnnotationStore::reduce`].
#[derive(Clone, Debug, PartialEq)]
pub enum Reduced {
    Added(AnnotationId),
    Rejected(Rejection),
    Removed(CorrectionEntry),
    PredictionSet,
    PredictionCleared,
    /// Nothing to do (unknown id, no prediction).
    Unchanged,
}

/// Who made an edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOrigin {
    User,
    Engine,
}

/// What an edit did to the prediction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PredictionChange {
    /// There was no prediction.
    #[default]
    None,
    /// Still valid, anchor moved.
    Kept,
    /// The user typed a prefix of the ghost text.
    Continued,
    /// Dropped.
    Cleared,
}

/// What [`AnnotationStore::remap`] changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemapReport {
    pub dropped: Vec<AnnotationId>,
    pub prediction: PredictionChange,
}

/// Corrections ordered by position, plus an optional prediction.
#[derive(Clone, Debug, Default)]
pub struct AnnotationStore {
    entries: Vec<CorrectionEntry>,
    prediction: Option<PredictionEntry>,
    next_id: u64,
    dismissed: HashSet<String>,
}

impl AnnotationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Corrections in document order.
    #[must_use]
    pub fn list(&self) -> &[CorrectionEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: AnnotationId) -> Option<&CorrectionEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The correction covering `pos`.
    #[must_use]
    pub fn entry_at(&self, pos: usize) -> Option<&CorrectionEntry> {
        self.entries.iter().find(|e| e.contains(pos))
    }

    /// The first correction overlapping `from..to`.
    #[must_use]
    pub fn overlapping(&self, from: usize, to: usize) -> Option<&CorrectionEntry> {
        self.entries.iter().find(|e| e.overlaps(from, to))
    }

    #[must_use]
    pub fn prediction(&self) -> Option<&PredictionEntry> {
        self.prediction.as_ref()
    }

    /// Whether `text` was dismissed this session.
    #[must_use]
    pub fn is_dismissed(&self, text: &str) -> bool {
        self.dismissed.contains(&normalize_word(text))
    }

    /// Ids of corrections whose original text matches `word`, ignoring case.
    #[must_use]
    pub fn ids_matching(&self, word: &str) -> Vec<AnnotationId> {
        let word = normalize_word(word);
        self.entries
            .iter()
            .filter(|e| normalize_word(&e.original_value) == word)
            .map(|e| e.id)
            .collect()
    }

    /// Apply one state transition.
    pub fn reduce<H: TextHost + ?Sized>(&mut self, action: Action, host: &H) -> Reduced {
        match action {
            Action::AddCorrection(new) => self.add(new, host),
            Action::RemoveCorrection(id) => self.remove(id).map_or(Reduced::Unchanged, Reduced::Removed),
            Action::Dismiss(id) => self.dismiss(id).map_or(Reduced::Unchanged, Reduced::Removed),
            Action::SetPrediction(prediction) => {
                if prediction.ghost_text.is_empty() || prediction.anchor_pos > host.len_chars() {
                    return Reduced::Unchanged;
                }
                self.prediction = Some(prediction);
                Reduced::PredictionSet
            }
            Action::ClearPrediction => {
                if self.clear_prediction() {
                    Reduced::PredictionCleared
                } else {
                    Reduced::Unchanged
                }
            }
        }
    }

    fn add<H: TextHost + ?Sized>(&mut self, new: NewCorrection, host: &H) -> Reduced {
        if new.from >= new.to || new.to > host.len_chars() {
            return Reduced::Rejected(Rejection::InvalidRange);
        }
        if host.text(new.from, new.to) != new.current_value {
            return Reduced::Rejected(Rejection::TextMismatch);
        }
        if new.kind == CorrectionKind::Manual && self.is_dismissed(&new.original_value) {
            return Reduced::Rejected(Rejection::Dismissed);
        }
        if let Some(existing) = self.overlapping(new.from, new.to) {
            return Reduced::Rejected(Rejection::Overlaps(existing.id));
        }

        self.next_id += 1;
        let id = AnnotationId(self.next_id);
        let at = self.entries.partition_point(|e| e.from < new.from);
        self.entries.insert(at, new.into_entry(id));
        Reduced::Added(id)
    }

    /// Remove a correction. Needs no document access.
    pub fn remove(&mut self, id: AnnotationId) -> Option<CorrectionEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Remove a correction and remember its text as dismissed.
    pub fn dismiss(&mut self, id: AnnotationId) -> Option<CorrectionEntry> {
        let entry = self.remove(id)?;
        self.dismissed.insert(normalize_word(&entry.original_value));
        Some(entry)
    }

    /// Drop the prediction; `false` if there was none.
    pub fn clear_prediction(&mut self) -> bool {
        self.prediction.take().is_some()
    }

    /// Carry every annotation across an edit already applied to `host`.
    ///
    /// 1. Ranges are mapped so text inserted at either end stays outside;
    ///    collapsed ranges are dropped.
    /// 2. Entries whose live text no longer equals `current_value` are dropped.
    /// 3. Word entries now touching a word char on either side are dropped:
    ///    the word grew and must be checked afresh.
    /// 4. Grammar entries whose block was touched by the edit are dropped.
    /// 5. The prediction survives a user edit only if the edit typed a
    ///    prefix of its ghost text at the anchor. Engine edits elsewhere
    ///    just move it.
    pub fn remap<H: TextHost + ?Sized>(
        &mut self,
        edit: &Edit,
        host: &H,
        origin: EditOrigin,
    ) -> RemapReport {
        let mut report = RemapReport::default();
        let len = host.len_chars();
        let (touched_from, touched_to) = edit.touched_range();

        self.entries.retain_mut(|entry| {
            let keep = match edit.map_range(entry.from, entry.to) {
                Some((from, to)) if to <= len => {
                    entry.from = from;
                    entry.to = to;
                    host.text(from, to) == entry.current_value
                        && match entry.source {
                            CorrectionSource::Word => !word_extended(host, from, to),
                            CorrectionSource::Grammar => {
                                let (block_from, block_to) = host.block_range(from);
                                touched_to < block_from || touched_from > block_to
                            }
                        }
                }
                _ => false,
            };
            if !keep {
                report.dropped.push(entry.id);
            }
            keep
        });

        report.prediction = self.remap_prediction(edit, origin);
        report
    }

    fn remap_prediction(&mut self, edit: &Edit, origin: EditOrigin) -> PredictionChange {
        let Some(prediction) = self.prediction.as_mut() else {
            return PredictionChange::None;
        };

        let continues = edit.is_insertion()
            && edit.from == prediction.anchor_pos
            && prediction.ghost_text.starts_with(edit.inserted());
        if continues {
            prediction.ghost_text.drain(..edit.inserted().len());
            prediction.anchor_pos += edit.inserted_len();
            if prediction.ghost_text.is_empty() {
                self.prediction = None;
                return PredictionChange::Cleared;
            }
            return PredictionChange::Continued;
        }

        let untouched = !edit.touches(prediction.anchor_pos, prediction.anchor_pos);
        if origin == EditOrigin::Engine && untouched {
            prediction.anchor_pos = edit.map(prediction.anchor_pos, Bias::After);
            return PredictionChange::Kept;
        }

        self.prediction = None;
        PredictionChange::Cleared
    }

    /// Whether every invariant holds against `host`.
    #[must_use]
    pub fn is_consistent_with<H: TextHost + ?Sized>(&self, host: &H) -> bool {
        let len = host.len_chars();
        let ranges_ok = self.entries.iter().all(|e| {
            e.from < e.to && e.to <= len && host.text(e.from, e.to) == e.current_value
        });
        let disjoint = self
            .entries
            .windows(2)
            .all(|pair| pair[0].to <= pair[1].from);
        let prediction_ok = self
            .prediction
            .as_ref()
            .is_none_or(|p| p.anchor_pos <= len && !p.ghost_text.is_empty());
        ranges_ok && disjoint && prediction_ok
    }
}

fn word_extended<H: TextHost + ?Sized>(host: &H, from: usize, to: usize) -> bool {
    let before = from
        .checked_sub(1)
        .and_then(|pos| host.char_at(pos))
        .is_some_and(is_word_char);
    let after = host.char_at(to).is_some_and(is_word_char);
    before || after
}
