//! Engine configuration.
//!
//! [`EngineOptions`] accepts the option names hosts already use, as JSON:
//!
//! ```
//! use livecheck::config::{EngineOptions, ProviderPolicy};
//!
//! let options = EngineOptions::from_json(
//!     r#"{ "policy": "apiPreferred", "languages": ["en-US"], "predictionDebounceMs": 150 }"#,
//! )?;
//! assert_eq!(options.policy, ProviderPolicy::ApiPreferred);
//! assert_eq!(options.prediction_debounce_ms, 150);
//! assert!(options.autocorrect_enabled);
//! # Ok::<(), livecheck::Error>(())
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which backend answers first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderPolicy {
    /// Local engine only; never call the remote service.
    OfflineOnly,
    /// Local engine first; remote only when the local engine is not ready.
    #[default]
    OfflinePreferred,
    /// Remote first; local engine on failure.
    ApiPreferred,
}

/// Options recognised by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    pub policy: ProviderPolicy,
    /// Language tags passed through to providers.
    pub languages: Vec<String>,
    /// Apply high-confidence word corrections without asking.
    pub autocorrect_enabled: bool,
    /// Request completions while typing.
    pub predictions_enabled: bool,
    /// Request sentence-level grammar checks.
    pub grammar_enabled: bool,
    pub prediction_debounce_ms: u64,
    pub word_debounce_ms: u64,
    /// Grammar delay after a sentence was just finished.
    pub grammar_sentence_end_ms: u64,
    /// Grammar delay after any other edit.
    pub grammar_edit_ms: u64,
    /// Quiet period before the word under the cursor is re-checked.
    pub idle_ms: u64,
    /// Minimum best-suggestion score for an automatic correction.
    pub auto_apply_threshold: f32,
    /// Suggestions at or below this score are dropped.
    pub suggestion_threshold: f32,
    pub min_word_chars: usize,
    pub min_sentence_chars: usize,
    pub max_suggestions: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            policy: ProviderPolicy::default(),
            languages: vec!["en-US".to_string()],
            autocorrect_enabled: true,
            predictions_enabled: true,
            grammar_enabled: true,
            prediction_debounce_ms: 0,
            word_debounce_ms: 0,
            grammar_sentence_end_ms: 800,
            grammar_edit_ms: 2000,
            idle_ms: 5000,
            auto_apply_threshold: 0.5,
            suggestion_threshold: 0.05,
            min_word_chars: 2,
            min_sentence_chars: 3,
            max_suggestions: 5,
        }
    }
}

impl EngineOptions {
    /// Parse options from JSON; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn prediction_debounce(&self) -> Duration {
        Duration::from_millis(self.prediction_debounce_ms)
    }

    #[must_use]
    pub fn word_debounce(&self) -> Duration {
        Duration::from_millis(self.word_debounce_ms)
    }

    #[must_use]
    pub fn grammar_delay(&self, sentence_end: bool) -> Duration {
        if sentence_end {
            Duration::from_millis(self.grammar_sentence_end_ms)
        } else {
            Duration::from_millis(self.grammar_edit_ms)
        }
    }

    #[must_use]
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }
}
