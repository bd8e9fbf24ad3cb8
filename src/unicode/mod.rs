//! Unicode utilities for word, sentence and dictionary handling.

mod normalize;
mod words;

pub use normalize::{normalize_nfc, normalize_word, words_equal_ignoring_case};
pub use words::{
    SENTENCE_TERMINATORS, char_to_byte, find_last_word, is_boundary_char, is_sentence_terminator,
    is_word_char, line_bounds, sentence_bounds, slice_chars, trimmed_len, word_at, word_before,
    word_spans,
};
