//! Word and sentence scanning in char offsets.
//!
//! Word segmentation follows UAX #29 word bounds so that contractions
//! ("don't") and non-Latin scripts come out as single words. Sentence
//! scanning is deliberately simpler: a sentence ends at `.`, `!`, `?` or `…`
//! followed by whitespace or the end of the block.

use unicode_segmentation::UnicodeSegmentation;

/// Chars that end a sentence.
pub const SENTENCE_TERMINATORS: [char; 4] = ['.', '!', '?', '…'];

/// Whether `ch` can be part of a word.
#[must_use]
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '\'' || ch == '’'
}

/// Whether `ch` ends a sentence.
#[must_use]
pub fn is_sentence_terminator(ch: char) -> bool {
    SENTENCE_TERMINATORS.contains(&ch)
}

/// Whether typing `ch` completes the word before it.
#[must_use]
pub fn is_boundary_char(ch: char) -> bool {
    ch.is_whitespace() || (!is_word_char(ch) && !ch.is_control())
}

/// Number of chars in `s` once surrounding whitespace is trimmed.
#[must_use]
pub fn trimmed_len(s: &str) -> usize {
    s.trim().chars().count()
}

/// Byte index of the char at `char_idx`, clamped to the string.
#[must_use]
pub fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(byte, _)| byte)
}

/// Char spans `(from, to)` of every word in `text`.
#[must_use]
pub fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut chars_seen = 0;
    let mut bytes_seen = 0;
    for (byte_idx, segment) in text.split_word_bound_indices() {
        chars_seen += text[bytes_seen..byte_idx].chars().count();
        bytes_seen = byte_idx;
        let len = segment.chars().count();
        if segment.chars().any(char::is_alphanumeric) {
            spans.push((chars_seen, chars_seen + len));
        }
    }
    spans
}

/// The word containing or touching `pos`.
///
/// A position right after a word (or right before one) counts as touching
/// it; when both apply, the word ending at `pos` wins.
#[must_use]
pub fn word_at(text: &str, pos: usize) -> Option<(usize, usize)> {
    let spans = word_spans(text);
    spans
        .iter()
        .copied()
        .find(|&(from, to)| from < pos && pos <= to)
        .or_else(|| spans.iter().copied().find(|&(from, _)| from == pos))
}

/// The last word ending at or before `pos`.
#[must_use]
pub fn word_before(text: &str, pos: usize) -> Option<(usize, usize)> {
    word_spans(text)
        .into_iter()
        .take_while(|&(_, to)| to <= pos)
        .last()
}

/// Char offset of the last whole-word occurrence of `word` in `text`.
#[must_use]
pub fn find_last_word(text: &str, word: &str) -> Option<usize> {
    let len = word.chars().count();
    word_spans(text)
        .into_iter()
        .rev()
        .find(|&(from, to)| to - from == len && slice_chars(text, from, to) == word)
        .map(|(from, _)| from)
}

/// Substring of `text` by char offsets, clamped.
#[must_use]
pub fn slice_chars(text: &str, from: usize, to: usize) -> &str {
    let start = char_to_byte(text, from);
    let end = char_to_byte(text, to.max(from));
    &text[start..end]
}

/// Bounds of the newline-delimited line containing `pos`, excluding the
/// line break itself.
#[must_use]
pub fn line_bounds(text: &str, pos: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    let pos = pos.min(chars.len());
    let mut start = pos;
    while start > 0 && chars[start - 1] != '\n' {
        start -= 1;
    }
    let mut end = pos;
    while end < chars.len() && chars[end] != '\n' {
        end += 1;
    }
    if end > start && chars[end - 1] == '\r' {
        end -= 1;
    }
    (start, end)
}

/// Bounds of the sentence around `pos` within a single block of text.
///
/// If `pos` sits just after a finished sentence (after its terminator and
/// any trailing spaces), that sentence is returned. The result excludes
/// leading and trailing whitespace.
#[must_use]
pub fn sentence_bounds(block: &str, pos: usize) -> (usize, usize) {
    let chars: Vec<char> = block.chars().collect();
    let len = chars.len();
    let mut probe = pos.min(len);

    // Step back over whitespace and the terminator we may be sitting after.
    while probe > 0 && chars[probe - 1].is_whitespace() {
        probe -= 1;
    }
    while probe > 0 && is_sentence_terminator(chars[probe - 1]) {
        probe -= 1;
    }

    let mut start = probe;
    while start > 0 {
        let prev = chars[start - 1];
        if prev.is_whitespace()
            && start >= 2
            && is_sentence_terminator(chars[start - 2])
        {
            break;
        }
        start -= 1;
    }
    while start < len && chars[start].is_whitespace() {
        start += 1;
    }

    let mut end = probe;
    while end < len && !is_sentence_terminator(chars[end]) {
        end += 1;
    }
    while end < len && is_sentence_terminator(chars[end]) {
        end += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    (start, end.max(start))
}
