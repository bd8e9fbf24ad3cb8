//! User dictionary of words that are never corrected.
//!
//! Words are stored NFC-normalised and lower-cased, persisted as a JSON
//! array under [`DICTIONARY_KEY`] every time one is added.
//!
//! # Examples
//!
//! ```
//! use livecheck::dictionary::{Dictionary, MemoryStore};
//!
//! let mut dict = Dictionary::load(Box::new(MemoryStore::new()))?;
//! assert!(dict.add("Rustacean")?);
//! assert!(dict.contains("RUSTACEAN"));
//! # Ok::<(), livecheck::Error>(())
//! ```

mod store;

use std::collections::BTreeSet;

pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

use crate::error::Result;
use crate::unicode::normalize_word;

/// Key the dictionary is persisted under.
pub const DICTIONARY_KEY: &str = "livecheck.userDictionary";

/// Set of user-approved words backed by a [`KeyValueStore`].
pub struct Dictionary {
    words: BTreeSet<String>,
    store: Box<dyn KeyValueStore>,
}

impl Dictionary {
    /// Load the persisted word list from `store`.
    pub fn load(store: Box<dyn KeyValueStore>) -> Result<Self> {
        let words = read_words(store.as_ref())?;
        tracing::debug!(count = words.len(), "loaded user dictionary");
        Ok(Self { words, store })
    }

    /// Load from `store`, starting empty if the stored list is unreadable.
    #[must_use]
    pub fn load_or_empty(store: Box<dyn KeyValueStore>) -> Self {
        let words = read_words(store.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "user dictionary unreadable, starting empty");
            BTreeSet::new()
        });
        Self { words, store }
    }

    /// An empty dictionary that persists nowhere.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            words: BTreeSet::new(),
            store: Box::new(MemoryStore::new()),
        }
    }

    /// Add a word and persist the list.
    ///
    /// Returns `Ok(false)` if the word was already present or empty. If
    /// persisting fails the word is still kept for this session.
    pub fn add(&mut self, word: &str) -> Result<bool> {
        let word = normalize_word(word);
        if word.is_empty() || !self.words.insert(word) {
            return Ok(false);
        }
        self.persist().inspect_err(|e| {
            tracing::warn!(error = %e, "failed to persist user dictionary");
        })?;
        Ok(true)
    }

    /// Whether `word` is in the dictionary, ignoring case.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&normalize_word(word))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in sorted order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.words)?;
        self.store.set(DICTIONARY_KEY, &json)
    }
}

fn read_words(store: &dyn KeyValueStore) -> Result<BTreeSet<String>> {
    let Some(json) = store.get(DICTIONARY_KEY)? else {
        return Ok(BTreeSet::new());
    };
    Ok(serde_json::from_str::<Vec<String>>(&json)?
        .iter()
        .map(|w| normalize_word(w))
        .filter(|w| !w.is_empty())
        .collect())
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("words", &self.words)
            .finish_non_exhaustive()
    }
}
