//! Built-in local engine backed by a frequency word list.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::provider::{
    Backend, CheckRequest, Completion, Correction, Domain, ProviderError, Suggestion,
};
use crate::unicode::{normalize_word, slice_chars, word_before, word_spans};

/// Largest edit distance considered for a suggestion.
const MAX_DISTANCE: usize = 2;

/// Shortest word prefix worth completing.
const MIN_PREFIX_CHARS: usize = 2;

/// Local spelling engine: a word list with frequencies.
///
/// Spelling suggestions are words within Damerau-Levenshtein distance 2,
/// scored by frequency and distance and normalised to sum to 1. Grammar
/// checks catch doubled words and lower-case sentence starts. Completions
/// are the most frequent known word extending the prefix at the cursor.
#[derive(Debug)]
pub struct WordListBackend {
    words: RwLock<HashMap<String, u32>>,
    excluded: RwLock<HashSet<String>>,
    ready: AtomicBool,
}

impl WordListBackend {
    /// Build from `(word, frequency)` pairs. Ready immediately.
    pub fn from_frequencies<'a>(entries: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let words = entries
            .into_iter()
            .map(|(w, f)| (normalize_word(w), f.max(1)))
            .filter(|(w, _)| !w.is_empty())
            .collect();
        Self {
            words: RwLock::new(words),
            excluded: RwLock::new(HashSet::new()),
            ready: AtomicBool::new(true),
        }
    }

    /// Parse a list with one `word [frequency]` per line; `#` starts a comment.
    #[must_use]
    pub fn from_list(list: &str) -> Self {
        let entries: Vec<(&str, u32)> = list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let word = parts.next()?;
                let freq = parts.next().and_then(|f| f.parse().ok()).unwrap_or(1);
                Some((word, freq))
            })
            .collect();
        Self::from_frequencies(entries)
    }

    /// Add or bump a word.
    pub fn learn(&self, word: &str, frequency: u32) {
        if let Ok(mut words) = self.words.write() {
            *words.entry(normalize_word(word)).or_insert(0) += frequency.max(1);
        }
    }

    fn is_known(&self, word: &str) -> bool {
        let key = normalize_word(word);
        self.words.read().is_ok_and(|w| w.contains_key(&key))
            || self.excluded.read().is_ok_and(|e| e.contains(&key))
    }

    fn suggest(&self, word: &str) -> Vec<Suggestion> {
        let key = normalize_word(word);
        let Ok(words) = self.words.read() else {
            return Vec::new();
        };
        let mut scored: Vec<(&String, f32)> = words
            .iter()
            .filter_map(|(candidate, &freq)| {
                let distance = edit_distance(&key, candidate);
                (distance > 0 && distance <= MAX_DISTANCE).then(|| {
                    let weight = (freq as f32).ln_1p() + 1.0;
                    (candidate, weight / (distance * distance) as f32)
                })
            })
            .collect();
        let total: f32 = scored.iter().map(|(_, s)| s).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        scored
            .into_iter()
            .map(|(candidate, s)| Suggestion::new(&match_case(word, candidate), s / total))
            .collect()
    }

    fn check_word(&self, request: &CheckRequest) -> Vec<Correction> {
        let end = request.text.chars().count();
        let Some((from, to)) = word_before(&request.text, end) else {
            return Vec::new();
        };
        let word = slice_chars(&request.text, from, to);
        if word.chars().count() < MIN_PREFIX_CHARS
            || word.chars().any(|c| c.is_numeric())
            || self.is_known(word)
        {
            return Vec::new();
        }
        let suggestions = self.suggest(word);
        if suggestions.is_empty() {
            return Vec::new();
        }
        vec![Correction::new(word, suggestions).at(from)]
    }

    fn check_grammar(request: &CheckRequest) -> Vec<Correction> {
        let text = &request.text;
        let spans = word_spans(text);
        let mut corrections = Vec::new();

        if let Some(&(from, to)) = spans.first() {
            let first = slice_chars(text, from, to);
            let leading = slice_chars(text, 0, from);
            if leading.trim().is_empty() && first.chars().next().is_some_and(char::is_lowercase) {
                corrections.push(
                    Correction::new(first, vec![Suggestion::new(&capitalize(first), 0.8)])
                        .at(from)
                        .with_message("Sentences start with a capital letter"),
                );
            }
        }

        for pair in spans.windows(2) {
            let (a_from, a_to) = pair[0];
            let (b_from, b_to) = pair[1];
            let a = slice_chars(text, a_from, a_to);
            let b = slice_chars(text, b_from, b_to);
            let gap = slice_chars(text, a_to, b_from);
            if gap.chars().all(char::is_whitespace) && a.to_lowercase() == b.to_lowercase() {
                corrections.push(
                    Correction::new(slice_chars(text, a_from, b_to), vec![Suggestion::new(a, 0.9)])
                        .at(a_from)
                        .with_message("Repeated word"),
                );
            }
        }
        corrections
    }
}

impl Backend for WordListBackend {
    fn name(&self) -> &str {
        "wordlist"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn correct(&self, request: &CheckRequest) -> Result<Vec<Correction>, ProviderError> {
        if !self.is_ready() {
            return Err(ProviderError::Unavailable("word list unloaded".into()));
        }
        Ok(match request.domain {
            Domain::Word => self.check_word(request),
            Domain::Grammar => Self::check_grammar(request),
            Domain::Prediction => Vec::new(),
        })
    }

    fn complete(&self, request: &CheckRequest) -> Result<Option<Completion>, ProviderError> {
        let end = request.text.chars().count();
        let Some((from, to)) = word_before(&request.text, end) else {
            return Ok(None);
        };
        if to != end || to - from < MIN_PREFIX_CHARS {
            return Ok(None);
        }
        let typed = slice_chars(&request.text, from, to);
        let prefix = normalize_word(typed);
        let Ok(words) = self.words.read() else {
            return Ok(None);
        };
        let best = words
            .iter()
            .filter(|(w, _)| w.len() > prefix.len() && w.starts_with(&prefix))
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)));
        Ok(best.map(|(word, _)| Completion::new(&word[prefix.len()..])))
    }

    fn exclude_word(&self, word: &str) {
        if let Ok(mut excluded) = self.excluded.write() {
            excluded.insert(normalize_word(word));
        }
    }

    fn destroy(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }
}

/// Optimal string alignment distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > MAX_DISTANCE {
        return MAX_DISTANCE + 1;
    }
    let width = b.len() + 1;
    let mut d = vec![0usize; (a.len() + 1) * width];
    for i in 0..=a.len() {
        d[i * width] = i;
    }
    for j in 0..=b.len() {
        d[j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[(i - 1) * width + j] + 1)
                .min(d[i * width + j - 1] + 1)
                .min(d[(i - 1) * width + j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[(i - 2) * width + j - 2] + 1);
            }
            d[i * width + j] = best;
        }
    }
    d[a.len() * width + b.len()]
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Give `candidate` the capitalisation pattern of `original`.
fn match_case(original: &str, candidate: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        candidate.to_uppercase()
    } else if letters.first().is_some_and(|c| c.is_uppercase()) {
        capitalize(candidate)
    } else {
        candidate.to_string()
    }
}
