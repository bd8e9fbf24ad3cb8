//! Correction and prediction providers.
//!
//! A [`Backend`] is one source of answers (a local engine, a remote
//! service). [`ProviderService`] owns up to one of each and resolves every
//! request according to a [`ProviderPolicy`]:
//!
//! | policy             | order                                          |
//! |--------------------|------------------------------------------------|
//! | `offlineOnly`      | local, else unavailable                        |
//! | `offlinePreferred` | local; remote if local is not ready or fails   |
//! | `apiPreferred`     | remote; local if remote fails or is missing    |
//!
//! "Nothing to suggest" (an empty `Vec` or `None`) is a successful answer
//! and never triggers a fallback.

mod wordlist;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::config::ProviderPolicy;

pub use wordlist::WordListBackend;

/// Check domains; each is debounced and sequenced independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    Word,
    Grammar,
    Prediction,
}

impl Domain {
    pub const ALL: [Self; 3] = [Self::Word, Self::Grammar, Self::Prediction];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Word => 0,
            Self::Grammar => 1,
            Self::Prediction => 2,
        }
    }
}

/// Why a check was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckReason {
    /// Whitespace or punctuation was typed after a word.
    WordBoundary,
    /// A sentence was just finished.
    SentenceEnd,
    /// Any other edit (grammar on the slow schedule).
    Edit,
    /// The cursor moved off a word.
    CursorLeftWord,
    /// Nothing happened for a while.
    Idle,
    /// Text was typed and a completion may be useful.
    Typing,
    /// The host asked for a check right now (Enter, paste, command).
    Explicit,
}

/// Soft-cancellation flag shared between the engine and a running request.
///
/// Aborting never stops a call by force; providers may poll the flag, and
/// the engine discards the result either way.
#[derive(Clone, Debug, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A window of text to check.
#[derive(Clone, Debug)]
pub struct CheckRequest {
    pub domain: Domain,
    pub reason: CheckReason,
    /// Document offset of the first char of `text`.
    pub window_start: usize,
    pub text: String,
    /// Cursor position the request was computed for.
    pub anchor: usize,
    pub languages: Vec<String>,
    pub abort: AbortFlag,
}

impl CheckRequest {
    /// A request with no language preference and a fresh abort flag.
    #[must_use]
    pub fn new(domain: Domain, reason: CheckReason, window_start: usize, text: &str) -> Self {
        Self {
            domain,
            reason,
            window_start,
            text: text.to_string(),
            anchor: window_start + text.chars().count(),
            languages: Vec::new(),
            abort: AbortFlag::new(),
        }
    }
}

/// One replacement candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub score: f32,
}

impl Suggestion {
    #[must_use]
    pub fn new(text: &str, score: f32) -> Self {
        Self {
            text: text.to_string(),
            score,
        }
    }
}

/// A problem found inside a checked window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    /// Text the correction replaces.
    #[serde(rename = "original_word", alias = "original")]
    pub original: String,
    /// Char offset of `original` inside the window. When absent the last
    /// whole-word occurrence in the window is used.
    #[serde(default)]
    pub offset: Option<usize>,
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Correction {
    #[must_use]
    pub fn new(original: &str, suggestions: Vec<Suggestion>) -> Self {
        Self {
            original: original.to_string(),
            offset: None,
            suggestions,
            message: None,
        }
    }

    #[must_use]
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

/// Text predicted to follow the cursor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
}

impl Completion {
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// Why a provider produced no answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderError {
    /// Not initialised, destroyed, or missing credentials.
    Unavailable(String),
    /// The call itself failed (network, model, parse).
    Failed(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(why) => write!(f, "provider unavailable: {why}"),
            Self::Failed(why) => write!(f, "provider failed: {why}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One source of corrections and completions.
///
/// Methods take `&self` so a backend can be shared with worker threads;
/// implementations use interior mutability for their own state.
pub trait Backend: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Prepare the backend (load models, open sessions).
    fn initialize(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Whether the backend can answer right now.
    fn is_ready(&self) -> bool {
        true
    }

    /// Corrections for the request window; empty means nothing to suggest.
    fn correct(&self, request: &CheckRequest) -> Result<Vec<Correction>, ProviderError>;

    /// Completion for the text ending at the request anchor.
    fn complete(&self, _request: &CheckRequest) -> Result<Option<Completion>, ProviderError> {
        Ok(None)
    }

    /// Never suggest corrections for `word` again.
    fn exclude_word(&self, _word: &str) {}

    /// Release resources.
    fn destroy(&self) {}
}

/// Policy-driven front for a local and a remote backend.
pub struct ProviderService {
    policy: ProviderPolicy,
    local: Option<Arc<dyn Backend>>,
    remote: Option<Arc<dyn Backend>>,
    active: AtomicBool,
}

impl ProviderService {
    /// A service with no backends; every call is unavailable until some
    /// are attached.
    #[must_use]
    pub fn new(policy: ProviderPolicy) -> Self {
        Self {
            policy,
            local: None,
            remote: None,
            active: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_local(mut self, backend: Arc<dyn Backend>) -> Self {
        self.local = Some(backend);
        self
    }

    #[must_use]
    pub fn with_remote(mut self, backend: Arc<dyn Backend>) -> Self {
        self.remote = Some(backend);
        self
    }

    #[must_use]
    pub fn policy(&self) -> ProviderPolicy {
        self.policy
    }

    /// Initialise every backend. Failures are logged; the service still
    /// comes up and routes around backends that are not ready.
    pub fn initialize(&self) {
        for backend in self.backends() {
            if let Err(e) = backend.initialize() {
                tracing::warn!(backend = backend.name(), error = %e, "backend failed to initialize");
            }
        }
        self.active.store(true, Ordering::SeqCst);
    }

    /// Tear down every backend. Afterwards all calls are unavailable.
    pub fn destroy(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            for backend in self.backends() {
                backend.destroy();
            }
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Resolve corrections for `request`.
    pub fn correct(&self, request: &CheckRequest) -> Result<Vec<Correction>, ProviderError> {
        let result = self.resolve(request, |backend| backend.correct(request));
        if let Ok(corrections) = &result {
            tracing::debug!(
                domain = ?request.domain,
                reason = ?request.reason,
                count = corrections.len(),
                "correction result"
            );
        }
        result
    }

    /// Resolve a completion for `request`.
    pub fn complete(&self, request: &CheckRequest) -> Result<Option<Completion>, ProviderError> {
        let result = self.resolve(request, |backend| backend.complete(request));
        if let Ok(completion) = &result {
            tracing::debug!(
                found = completion.is_some(),
                anchor = request.anchor,
                "prediction result"
            );
        }
        result
    }

    /// Tell the local engine to stop correcting `word`.
    pub fn exclude_word(&self, word: &str) {
        if let Some(local) = &self.local {
            local.exclude_word(word);
        }
    }

    fn backends(&self) -> impl Iterator<Item = &Arc<dyn Backend>> {
        self.local.iter().chain(self.remote.iter())
    }

    fn ready(backend: Option<&Arc<dyn Backend>>) -> Option<&Arc<dyn Backend>> {
        backend.filter(|b| b.is_ready())
    }

    fn resolve<T: Default>(
        &self,
        request: &CheckRequest,
        call: impl Fn(&dyn Backend) -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        if !self.is_active() {
            return Err(ProviderError::Unavailable("service not initialized".into()));
        }
        if request.abort.is_aborted() {
            return Ok(T::default());
        }

        let local = Self::ready(self.local.as_ref());
        let remote = Self::ready(self.remote.as_ref());
        let (first, second) = match self.policy {
            ProviderPolicy::OfflineOnly => (local, None),
            ProviderPolicy::OfflinePreferred => (local, remote),
            ProviderPolicy::ApiPreferred => (remote, local),
        };

        let Some(first) = first.or(second) else {
            return Err(ProviderError::Unavailable("no backend ready".into()));
        };
        match call(first.as_ref()) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(backend = first.name(), error = %e, "backend call failed");
                match second.filter(|s| !Arc::ptr_eq(s, first)) {
                    Some(fallback) if !request.abort.is_aborted() => {
                        tracing::debug!(backend = fallback.name(), "falling back");
                        call(fallback.as_ref()).inspect_err(|e| {
                            tracing::warn!(backend = fallback.name(), error = %e, "fallback failed");
                        })
                    }
                    _ => Err(e),
                }
            }
        }
    }
}

impl fmt::Debug for ProviderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderService")
            .field("policy", &self.policy)
            .field("local", &self.local.as_ref().map(|b| b.name().to_string()))
            .field("remote", &self.remote.as_ref().map(|b| b.name().to_string()))
            .field("active", &self.is_active())
            .finish()
    }
}
