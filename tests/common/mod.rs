//! Shared fixtures for integration tests: scripted backends, a manual
//! executor and engine builders.

#![allow(dead_code)]
#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use livecheck::coordinator::{Job, JobOutput};
use livecheck::unicode::{normalize_word, slice_chars, word_before, word_spans};
use livecheck::{
    Backend, CheckRequest, Completion, Correction, Dictionary, DocumentBuffer, Domain, Engine,
    EngineOptions, Executor, InlineExecutor, ProviderError, ProviderPolicy, ProviderService,
    Suggestion,
};

static INIT: Once = Once::new();

/// Route engine logs to the test output.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    });
}

/// Backend answering from fixed tables.
///
/// Word checks look up the last word of the window (every word with
/// [`ScriptedBackend::all_words`]), grammar checks search the window for
/// known phrases, completions look up the word at the end.
#[derive(Default)]
pub struct ScriptedBackend {
    name: &'static str,
    words: Mutex<HashMap<String, Vec<Suggestion>>>,
    phrases: Mutex<Vec<(String, Vec<Suggestion>, Option<String>)>>,
    completions: Mutex<HashMap<String, String>>,
    not_ready: AtomicBool,
    failing: AtomicBool,
    all_words: AtomicBool,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
    excluded: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn word(self, word: &str, suggestions: &[(&str, f32)]) -> Self {
        let suggestions = suggestions
            .iter()
            .map(|&(text, score)| Suggestion::new(text, score))
            .collect();
        self.words
            .lock()
            .unwrap()
            .insert(normalize_word(word), suggestions);
        self
    }

    pub fn phrase(self, phrase: &str, replacement: &str, score: f32, message: &str) -> Self {
        self.phrases.lock().unwrap().push((
            phrase.to_string(),
            vec![Suggestion::new(replacement, score)],
            Some(message.to_string()),
        ));
        self
    }

    pub fn completion(self, prefix: &str, rest: &str) -> Self {
        self.completions
            .lock()
            .unwrap()
            .insert(prefix.to_string(), rest.to_string());
        self
    }

    pub fn not_ready(self) -> Self {
        self.not_ready.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Answer word checks for every known word in the window.
    pub fn all_words(self) -> Self {
        self.all_words.store(true, Ordering::SeqCst);
        self
    }

    /// Sleep this long inside every call.
    pub fn delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn excluded(&self) -> Vec<String> {
        self.excluded.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Failed(format!("{} is down", self.name)));
        }
        Ok(())
    }
}

impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn is_ready(&self) -> bool {
        !self.not_ready.load(Ordering::SeqCst)
    }

    fn correct(&self, request: &CheckRequest) -> Result<Vec<Correction>, ProviderError> {
        self.check()?;
        let text = &request.text;
        match request.domain {
            Domain::Word if self.all_words.load(Ordering::SeqCst) => {
                let words = self.words.lock().unwrap();
                Ok(word_spans(text)
                    .into_iter()
                    .filter_map(|(from, to)| {
                        let word = slice_chars(text, from, to);
                        let suggestions = words.get(&normalize_word(word))?;
                        Some(Correction::new(word, suggestions.clone()).at(from))
                    })
                    .collect())
            }
            Domain::Word => {
                let Some((from, to)) = word_before(text, text.chars().count()) else {
                    return Ok(Vec::new());
                };
                let word = slice_chars(text, from, to);
                let words = self.words.lock().unwrap();
                Ok(words
                    .get(&normalize_word(word))
                    .map(|s| vec![Correction::new(word, s.clone()).at(from)])
                    .unwrap_or_default())
            }
            Domain::Grammar => {
                let phrases = self.phrases.lock().unwrap();
                Ok(phrases
                    .iter()
                    .filter_map(|(phrase, suggestions, message)| {
                        let byte = text.find(phrase.as_str())?;
                        let offset = text[..byte].chars().count();
                        let mut correction = Correction::new(phrase, suggestions.clone()).at(offset);
                        correction.message = message.clone();
                        Some(correction)
                    })
                    .collect())
            }
            Domain::Prediction => Ok(Vec::new()),
        }
    }

    fn complete(&self, request: &CheckRequest) -> Result<Option<Completion>, ProviderError> {
        self.check()?;
        let end = request.text.chars().count();
        let Some((from, to)) = word_before(&request.text, end).filter(|&(_, to)| to == end) else {
            return Ok(None);
        };
        let prefix = slice_chars(&request.text, from, to);
        let completions = self.completions.lock().unwrap();
        Ok(completions.get(prefix).map(|rest| Completion::new(rest)))
    }

    fn exclude_word(&self, word: &str) {
        self.excluded.lock().unwrap().push(normalize_word(word));
    }
}

#[derive(Default)]
struct Held {
    queued: VecDeque<Job>,
    done: Vec<JobOutput>,
}

/// Executor that holds every job until the test releases it.
pub struct ManualExecutor {
    held: Rc<RefCell<Held>>,
}

/// Test-side handle of a [`ManualExecutor`].
#[derive(Clone)]
pub struct ManualHandle {
    held: Rc<RefCell<Held>>,
}

impl ManualExecutor {
    pub fn new() -> (Self, ManualHandle) {
        let held = Rc::new(RefCell::new(Held::default()));
        (
            Self {
                held: Rc::clone(&held),
            },
            ManualHandle { held },
        )
    }
}

impl Executor for ManualExecutor {
    fn submit(&mut self, job: Job) {
        self.held.borrow_mut().queued.push_back(job);
    }

    fn drain(&mut self) -> Vec<JobOutput> {
        std::mem::take(&mut self.held.borrow_mut().done)
    }
}

impl ManualHandle {
    /// Jobs submitted but not yet run.
    pub fn queued(&self) -> usize {
        self.held.borrow().queued.len()
    }

    /// Domains of the queued jobs, oldest first.
    pub fn queued_domains(&self) -> Vec<Domain> {
        self.held
            .borrow()
            .queued
            .iter()
            .map(|job| job.request.domain)
            .collect()
    }

    /// Run every queued job; outputs arrive on the next poll.
    pub fn run_all(&self) {
        let mut held = self.held.borrow_mut();
        while let Some(job) = held.queued.pop_front() {
            let output = job.run();
            held.done.push(output);
        }
    }
}

pub fn local_service(backend: Arc<ScriptedBackend>) -> ProviderService {
    ProviderService::new(ProviderPolicy::OfflineOnly).with_local(backend)
}

/// Engine over `backend` running jobs inline.
pub fn inline_engine(backend: Arc<ScriptedBackend>, options: EngineOptions) -> Engine {
    init_tracing();
    Engine::new(
        options,
        local_service(backend),
        Dictionary::in_memory(),
        InlineExecutor::new(),
    )
}

/// Engine over `backend` whose jobs wait for [`ManualHandle::run_all`].
pub fn manual_engine(
    backend: Arc<ScriptedBackend>,
    options: EngineOptions,
) -> (Engine, ManualHandle) {
    init_tracing();
    let (executor, handle) = ManualExecutor::new();
    let engine = Engine::new(
        options,
        local_service(backend),
        Dictionary::in_memory(),
        executor,
    );
    (engine, handle)
}

/// Type `text` at the cursor, reporting every keystroke at `now`.
pub fn type_text(engine: &mut Engine, doc: &mut DocumentBuffer, text: &str, now: Instant) {
    for edit in doc.type_text(text) {
        engine.on_edit_at(doc, &edit, now);
    }
}

/// True if every annotation lies inside the document, matches its text and
/// none overlap.
pub fn annotations_consistent(engine: &Engine, doc: &DocumentBuffer) -> bool {
    use livecheck::TextHost;
    let entries = engine.list_annotations();
    let len = doc.len_chars();
    entries
        .iter()
        .all(|e| e.from < e.to && e.to <= len && doc.text(e.from, e.to) == e.current_value)
        && entries.windows(2).all(|pair| pair[0].to <= pair[1].from)
}
