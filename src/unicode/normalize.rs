//! Unicode normalization helpers.

use unicode_normalization::UnicodeNormalization;

/// Normalize `text` to NFC (canonical composition).
#[must_use]
pub fn normalize_nfc(text: &str) -> String {
    text.nfc().collect()
}

/// Canonical dictionary form of a word: trimmed, NFC, lower-cased.
#[must_use]
pub fn normalize_word(word: &str) -> String {
    word.trim().nfc().collect::<String>().to_lowercase()
}

/// Compare two words case-insensitively after NFC normalization.
#[must_use]
pub fn words_equal_ignoring_case(a: &str, b: &str) -> bool {
    normalize_word(a) == normalize_word(b)
}
