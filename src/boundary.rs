//! When to check, and which text.
//!
//! [`BoundaryDetector`] turns edits and cursor moves into [`Trigger`]s. It
//! only reads the document; scheduling is the coordinator's job.

use std::time::Duration;

use crate::config::EngineOptions;
use crate::provider::{CheckReason, Domain};
use crate::text::{Edit, Selection, TextHost};
use crate::unicode::{
    is_boundary_char, is_sentence_terminator, is_word_char, sentence_bounds, slice_chars,
    trimmed_len, word_at,
};

/// A check to schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trigger {
    pub domain: Domain,
    pub reason: CheckReason,
    /// Document range to send to the provider.
    pub window: (usize, usize),
    /// Debounce before the check runs.
    pub delay: Duration,
}

/// Decides when a check is due and what window it covers.
#[derive(Clone, Debug)]
pub struct BoundaryDetector {
    min_word_chars: usize,
    min_sentence_chars: usize,
    grammar_enabled: bool,
    predictions_enabled: bool,
    word_debounce: Duration,
    prediction_debounce: Duration,
    grammar_sentence_end: Duration,
    grammar_edit: Duration,
}

impl BoundaryDetector {
    #[must_use]
    pub fn new(options: &EngineOptions) -> Self {
        Self {
            min_word_chars: options.min_word_chars,
            min_sentence_chars: options.min_sentence_chars,
            grammar_enabled: options.grammar_enabled,
            predictions_enabled: options.predictions_enabled,
            word_debounce: options.word_debounce(),
            prediction_debounce: options.prediction_debounce(),
            grammar_sentence_end: options.grammar_delay(true),
            grammar_edit: options.grammar_delay(false),
        }
    }

    /// Checks caused by an edit already applied to `host`.
    ///
    /// - a boundary char after a word checks the fragment ending there,
    /// - a sentence terminator or line break (or a space after one) checks
    ///   grammar on the fast schedule, anything else on the slow one,
    /// - a typed word char asks for a completion.
    pub fn on_edit<H: TextHost + ?Sized>(&self, host: &H, edit: &Edit) -> Vec<Trigger> {
        let mut triggers = Vec::new();
        let (_, end) = edit.touched_range();
        let last = edit.last_inserted_char();

        if last.is_some_and(is_boundary_char) {
            if let Some(window) = self.fragment_before(host, end - 1) {
                triggers.push(Trigger {
                    domain: Domain::Word,
                    reason: CheckReason::WordBoundary,
                    window,
                    delay: self.word_debounce,
                });
            }
        }

        if self.grammar_enabled {
            let sentence_end = match last {
                Some(ch) if ch == '\n' || is_sentence_terminator(ch) => true,
                Some(ch) if ch.is_whitespace() => {
                    end >= 2
                        && host
                            .char_at(end - 2)
                            .is_some_and(|c| c == '\n' || is_sentence_terminator(c))
                }
                _ => false,
            };
            let probe = if last == Some('\n') { end - 1 } else { end };
            if let Some(window) = self.sentence_window(host, probe) {
                let (reason, delay) = if sentence_end {
                    (CheckReason::SentenceEnd, self.grammar_sentence_end)
                } else {
                    (CheckReason::Edit, self.grammar_edit)
                };
                triggers.push(Trigger {
                    domain: Domain::Grammar,
                    reason,
                    window,
                    delay,
                });
            }
        }

        if self.predictions_enabled && last.is_some_and(is_word_char) {
            let (block_from, _) = host.block_range(end);
            triggers.push(Trigger {
                domain: Domain::Prediction,
                reason: CheckReason::Typing,
                window: (block_from, end),
                delay: self.prediction_debounce,
            });
        }

        triggers
    }

    /// Re-check the word the cursor just left, if it left one.
    pub fn on_cursor_move<H: TextHost + ?Sized>(
        &self,
        host: &H,
        old: Selection,
        new: Selection,
    ) -> Option<Trigger> {
        let (old, new) = (old.head, new.head);
        if old == new || old > host.len_chars() {
            return None;
        }
        let (from, to) = self.word_around(host, old)?;
        if from <= new && new <= to {
            return None;
        }
        Some(Trigger {
            domain: Domain::Word,
            reason: CheckReason::CursorLeftWord,
            window: (from, to),
            delay: self.word_debounce,
        })
    }

    /// Re-check the word under the cursor after a quiet period.
    pub fn on_idle<H: TextHost + ?Sized>(&self, host: &H) -> Option<Trigger> {
        let window = self.word_around(host, host.cursor())?;
        Some(Trigger {
            domain: Domain::Word,
            reason: CheckReason::Idle,
            window,
            delay: Duration::ZERO,
        })
    }

    /// Immediate checks at the cursor, for events that bypass normal typing
    /// (Enter splitting a block, paste, an explicit command).
    pub fn on_explicit<H: TextHost + ?Sized>(&self, host: &H, reason: CheckReason) -> Vec<Trigger> {
        let cursor = host.cursor();
        let probe = match cursor.checked_sub(1) {
            Some(prev) if host.char_at(prev) == Some('\n') => prev,
            _ => cursor,
        };

        let mut triggers = Vec::new();
        if let Some(window) = self.fragment_before(host, probe) {
            triggers.push(Trigger {
                domain: Domain::Word,
                reason,
                window,
                delay: Duration::ZERO,
            });
        }
        if self.grammar_enabled {
            if let Some(window) = self.sentence_window(host, probe) {
                triggers.push(Trigger {
                    domain: Domain::Grammar,
                    reason,
                    window,
                    delay: Duration::ZERO,
                });
            }
        }
        triggers
    }

    /// Sentence fragment from the start of its sentence up to `end`.
    fn fragment_before<H: TextHost + ?Sized>(&self, host: &H, end: usize) -> Option<(usize, usize)> {
        let (block_from, _) = host.block_range(end);
        let text = host.text(block_from, end);
        let (start, _) = sentence_bounds(&text, text.chars().count());
        let fragment = slice_chars(&text, start, usize::MAX);
        (trimmed_len(fragment) >= self.min_word_chars).then_some((block_from + start, end))
    }

    /// The sentence around `pos`, within its block.
    fn sentence_window<H: TextHost + ?Sized>(&self, host: &H, pos: usize) -> Option<(usize, usize)> {
        let (block_from, block_to) = host.block_range(pos);
        let text = host.text(block_from, block_to);
        let (start, end) = sentence_bounds(&text, pos.saturating_sub(block_from));
        (trimmed_len(slice_chars(&text, start, end)) >= self.min_sentence_chars)
            .then_some((block_from + start, block_from + end))
    }

    /// The word containing or touching `pos`, if long enough to check.
    fn word_around<H: TextHost + ?Sized>(&self, host: &H, pos: usize) -> Option<(usize, usize)> {
        let (block_from, block_to) = host.block_range(pos);
        let text = host.text(block_from, block_to);
        let (from, to) = word_at(&text, pos.saturating_sub(block_from))?;
        (to - from >= self.min_word_chars).then_some((block_from + from, block_from + to))
    }
}
