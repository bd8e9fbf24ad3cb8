//! The engine the host drives.
//!
//! ```text
//! host edit ──▶ on_edit ──▶ AnnotationStore::remap
//!                   │
//!                   └──▶ BoundaryDetector ──▶ RequestCoordinator (timers)
//!
//! poll(now) ──▶ due timers ──▶ Executor::submit(Job)
//!           ──▶ Executor::drain ──▶ accept(ticket)? ──▶ store / applier
//! ```
//!
//! The host reports every edit the user makes through [`Engine::on_edit`].
//! Edits the engine makes itself (auto-corrections, [`Engine::apply_annotation`],
//! [`Engine::revert_annotation`], [`Engine::accept_prediction`]) are already
//! accounted for and must not be reported back.

use std::sync::Arc;
use std::time::Instant;

use crate::annotation::{
    Action, AnnotationId, AnnotationStore, CorrectionEntry, CorrectionKind, CorrectionSource,
    EditOrigin, NewCorrection, PredictionChange, PredictionEntry, Reduced,
};
use crate::applier;
use crate::boundary::{BoundaryDetector, Trigger};
use crate::config::EngineOptions;
use crate::coordinator::{
    Domains, Executor, Job, JobOutput, JobResult, PendingCheck, RequestCoordinator,
};
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::provider::{
    CheckReason, CheckRequest, Completion, Correction, Domain, ProviderError, ProviderService,
    Suggestion,
};
use crate::text::{Edit, ReplaceOptions, Selection, TextHost};
use crate::unicode::{find_last_word, word_before};

/// Counters for observability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Provider calls submitted.
    pub dispatched: u64,
    /// Results discarded because the document or cursor moved on.
    pub stale_dropped: u64,
    /// Results that passed validation.
    pub applied: u64,
    /// Corrections written into the document automatically.
    pub auto_applied: u64,
    /// Provider errors, including unavailability.
    pub errors: u64,
}

/// Live spelling, grammar and prediction annotations over one document.
pub struct Engine {
    options: EngineOptions,
    providers: Arc<ProviderService>,
    dictionary: Dictionary,
    executor: Box<dyn Executor>,
    coordinator: RequestCoordinator,
    detector: BoundaryDetector,
    store: AnnotationStore,
    stats: EngineStats,
    destroyed: bool,
}

impl Engine {
    /// Start an engine: initialises the providers and tells the local
    /// engine about every dictionary word.
    pub fn new(
        options: EngineOptions,
        providers: ProviderService,
        dictionary: Dictionary,
        executor: impl Executor + 'static,
    ) -> Self {
        providers.initialize();
        for word in dictionary.words() {
            providers.exclude_word(word);
        }
        tracing::debug!(
            policy = ?providers.policy(),
            dictionary = dictionary.len(),
            "engine started"
        );
        Self {
            detector: BoundaryDetector::new(&options),
            options,
            providers: Arc::new(providers),
            dictionary,
            executor: Box::new(executor),
            coordinator: RequestCoordinator::new(),
            store: AnnotationStore::new(),
            stats: EngineStats::default(),
            destroyed: false,
        }
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Current corrections in document order.
    #[must_use]
    pub fn list_annotations(&self) -> &[CorrectionEntry] {
        self.store.list()
    }

    #[must_use]
    pub fn annotation(&self, id: AnnotationId) -> Option<&CorrectionEntry> {
        self.store.get(id)
    }

    #[must_use]
    pub fn prediction(&self) -> Option<&PredictionEntry> {
        self.store.prediction()
    }

    /// When the host should call [`Engine::poll`] next, if a timer is set.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.coordinator.next_deadline()
    }

    /// A user edit, already applied to `host`.
    pub fn on_edit<H: TextHost + ?Sized>(&mut self, host: &H, edit: &Edit) {
        self.on_edit_at(host, edit, Instant::now());
    }

    /// [`Engine::on_edit`] with an explicit clock.
    pub fn on_edit_at<H: TextHost + ?Sized>(&mut self, host: &H, edit: &Edit, now: Instant) {
        if self.destroyed || edit.is_noop() {
            return;
        }
        self.coordinator.begin_cycle();
        self.coordinator.user_edit(edit);
        let report = self.store.remap(edit, host, EditOrigin::User);
        if !report.dropped.is_empty() {
            tracing::trace!(dropped = ?report.dropped, "annotations invalidated by edit");
        }
        self.coordinator.reset_idle(now + self.options.idle_delay());

        let mut predicting = false;
        for trigger in self.detector.on_edit(host, edit) {
            if trigger.domain == Domain::Prediction {
                if report.prediction == PredictionChange::Continued {
                    continue;
                }
                predicting = true;
            }
            self.schedule(trigger, now);
        }
        if !predicting {
            self.coordinator.cancel(Domains::PREDICTION);
        }
    }

    /// The selection moved without an edit.
    pub fn on_selection_change<H: TextHost + ?Sized>(
        &mut self,
        host: &H,
        old: Selection,
        new: Selection,
    ) {
        self.on_selection_change_at(host, old, new, Instant::now());
    }

    /// [`Engine::on_selection_change`] with an explicit clock.
    pub fn on_selection_change_at<H: TextHost + ?Sized>(
        &mut self,
        host: &H,
        old: Selection,
        new: Selection,
        now: Instant,
    ) {
        if self.destroyed || old == new {
            return;
        }
        if self
            .store
            .prediction()
            .is_some_and(|p| !new.is_empty() || p.anchor_pos != new.head)
        {
            self.clear_prediction();
        }
        self.coordinator.begin_cycle();
        self.coordinator.reset_idle(now + self.options.idle_delay());
        if let Some(trigger) = self.detector.on_cursor_move(host, old, new) {
            self.schedule(trigger, now);
        }
    }

    /// The editor lost focus: the prediction goes away.
    pub fn on_focus_lost<H: TextHost + ?Sized>(&mut self, _host: &H) {
        if !self.destroyed {
            self.clear_prediction();
        }
    }

    /// Check at the cursor right away, skipping debounce.
    pub fn trigger_check_now<H: TextHost + ?Sized>(&mut self, host: &H, reason: CheckReason) {
        if self.destroyed {
            return;
        }
        let now = Instant::now();
        self.coordinator.begin_cycle();
        for trigger in self.detector.on_explicit(host, reason) {
            self.schedule(trigger, now);
            if let Some(pending) = self.coordinator.take_now(trigger.domain) {
                self.dispatch(host, trigger.domain, pending);
            }
        }
    }

    /// Fire due timers, then apply every finished result.
    ///
    /// Returns the number of results that passed validation.
    pub fn poll<H: TextHost + ?Sized>(&mut self, host: &mut H, now: Instant) -> usize {
        if self.destroyed {
            return 0;
        }
        // The idle timer stays armed while a word check is pending.
        if self.coordinator.pending(Domain::Word).is_none() && self.coordinator.take_idle(now) {
            if let Some(trigger) = self.detector.on_idle(&*host) {
                self.schedule(trigger, now);
            }
        }
        for (domain, pending) in self.coordinator.take_due(now) {
            self.dispatch(&*host, domain, pending);
        }

        let mut applied = 0;
        for output in self.executor.drain() {
            if self.handle_output(host, output) {
                applied += 1;
            }
        }
        applied
    }

    /// Replace an annotated range with `text` chosen by the user.
    ///
    /// The change is recorded in the host's undo history.
    pub fn apply_annotation<H: TextHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: AnnotationId,
        text: &str,
    ) -> Result<Edit> {
        let entry = self.live_entry(&*host, id)?;
        self.store.remove(id);
        let edit = applier::replace_preserving_selection(
            host,
            entry.from,
            entry.to,
            text,
            ReplaceOptions::default(),
        );
        self.engine_edit(&*host, &edit);
        tracing::debug!(%id, original = %entry.original_value, replacement = text, "annotation applied");
        Ok(edit)
    }

    /// Drop an annotation and stop flagging its text this session.
    pub fn dismiss_annotation(&mut self, id: AnnotationId) -> Result<()> {
        if self.destroyed {
            return Err(Error::EngineDestroyed);
        }
        self.store
            .dismiss(id)
            .map(|entry| tracing::debug!(%id, text = %entry.original_value, "annotation dismissed"))
            .ok_or(Error::UnknownAnnotation(id))
    }

    /// Undo an automatic correction: the original text comes back, the
    /// cursor stays put, and the word is not corrected again this session.
    pub fn revert_annotation<H: TextHost + ?Sized>(
        &mut self,
        host: &mut H,
        id: AnnotationId,
    ) -> Result<Edit> {
        let entry = self.live_entry(&*host, id)?;
        if entry.kind != CorrectionKind::Auto {
            return Err(Error::NotApplied(id));
        }
        self.store.dismiss(id);
        let edit = applier::revert(host, &entry);
        self.engine_edit(&*host, &edit);
        tracing::debug!(%id, restored = %entry.original_value, "automatic correction reverted");
        Ok(edit)
    }

    /// Insert the prediction's ghost text at its anchor as a user edit.
    pub fn accept_prediction<H: TextHost + ?Sized>(&mut self, host: &mut H) -> Result<Edit> {
        if self.destroyed {
            return Err(Error::EngineDestroyed);
        }
        let Some(prediction) = self.store.prediction().cloned() else {
            return Err(Error::NoPrediction);
        };
        self.clear_prediction();
        if prediction.anchor_pos != host.cursor() || prediction.anchor_pos > host.len_chars() {
            return Err(Error::NoPrediction);
        }

        let edit = host.replace(
            prediction.anchor_pos,
            prediction.anchor_pos,
            &prediction.ghost_text,
            ReplaceOptions::default(),
        );
        host.set_cursor(edit.touched_range().1);
        self.on_edit(&*host, &edit);
        Ok(edit)
    }

    /// Drop the prediction, if any.
    pub fn dismiss_prediction(&mut self) {
        self.clear_prediction();
    }

    /// Never flag `word` again. Returns `false` if it was already known.
    ///
    /// Live corrections of the word are removed. The word stays in the
    /// dictionary for this session even if persisting it fails.
    pub fn add_to_dictionary(&mut self, word: &str) -> Result<bool> {
        if self.destroyed {
            return Err(Error::EngineDestroyed);
        }
        self.providers.exclude_word(word);
        for id in self.store.ids_matching(word) {
            self.store.remove(id);
        }
        self.dictionary.add(word)
    }

    #[must_use]
    pub fn is_in_dictionary(&self, word: &str) -> bool {
        self.dictionary.contains(word)
    }

    /// Tear down: timers stop, in-flight results are discarded on arrival,
    /// worker threads are released and the providers destroyed.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.coordinator.teardown();
        self.executor.shutdown();
        self.providers.destroy();
        self.clear_prediction();
        tracing::debug!(stats = ?self.stats, "engine destroyed");
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn schedule(&mut self, trigger: Trigger, now: Instant) {
        self.coordinator
            .schedule(trigger.domain, trigger.reason, trigger.window, now + trigger.delay);
    }

    fn dispatch<H: TextHost + ?Sized>(&mut self, host: &H, domain: Domain, pending: PendingCheck) {
        let (from, to) = pending.window;
        if from >= to || to > host.len_chars() {
            return;
        }
        let text = host.text(from, to);
        let (ticket, abort) = self.coordinator.issue(domain, host.cursor());
        let request = CheckRequest {
            anchor: ticket.anchor,
            languages: self.options.languages.clone(),
            abort,
            ..CheckRequest::new(domain, pending.reason, from, &text)
        };
        tracing::trace!(?domain, reason = ?pending.reason, window = ?pending.window, "dispatching check");
        self.stats.dispatched += 1;
        self.executor
            .submit(Job::new(ticket, request, Arc::clone(&self.providers)));
    }

    fn handle_output<H: TextHost + ?Sized>(&mut self, host: &mut H, output: JobOutput) -> bool {
        let JobOutput {
            ticket,
            request,
            result,
        } = output;
        self.coordinator.finish(&ticket);
        let Some(mut edits) = self.coordinator.accept(&ticket, host.cursor()) else {
            self.stats.stale_dropped += 1;
            tracing::trace!(domain = ?ticket.domain, "stale result dropped");
            return false;
        };

        match result {
            JobResult::Corrections(Ok(corrections)) => {
                for correction in corrections {
                    if let Some(edit) = self.place_correction(host, &request, &edits, correction) {
                        edits.push(edit);
                    }
                }
            }
            JobResult::Completion(Ok(completion)) => {
                if let Some(completion) = completion {
                    self.show_prediction(&*host, &request, completion);
                }
            }
            JobResult::Corrections(Err(e)) | JobResult::Completion(Err(e)) => {
                self.record_error(ticket.domain, &e);
                return false;
            }
        }
        self.stats.applied += 1;
        true
    }

    fn record_error(&mut self, domain: Domain, error: &ProviderError) {
        self.stats.errors += 1;
        match error {
            ProviderError::Unavailable(why) => {
                tracing::debug!(?domain, why = why.as_str(), "provider unavailable; check skipped");
            }
            ProviderError::Failed(_) => {
                tracing::warn!(?domain, error = %error, "check failed");
            }
        }
    }

    /// Validate one correction against the live document and store it,
    /// applying it right away when confident enough.
    ///
    /// `edits` carries window offsets to live ones. Returns the edit made if
    /// the correction was applied, so later corrections of the same result
    /// can be carried across it.
    fn place_correction<H: TextHost + ?Sized>(
        &mut self,
        host: &mut H,
        request: &CheckRequest,
        edits: &[Edit],
        correction: Correction,
    ) -> Option<Edit> {
        let Some(offset) = correction
            .offset
            .or_else(|| find_last_word(&request.text, &correction.original))
        else {
            tracing::trace!(original = %correction.original, "correction not found in window");
            return None;
        };
        let from = request.window_start + offset;
        let to = from + correction.original.chars().count();
        let Some((from, to)) = edits
            .iter()
            .try_fold((from, to), |(from, to), edit| edit.map_range(from, to))
        else {
            return None;
        };
        if to > host.len_chars() || host.text(from, to) != correction.original {
            return None;
        }
        if self.dictionary.contains(&correction.original)
            || self.store.is_dismissed(&correction.original)
        {
            return None;
        }

        let suggestions = self.filter_suggestions(correction.suggestions);
        let Some(best) = suggestions.first().cloned() else {
            return None;
        };
        if best.text == correction.original {
            return None;
        }
        if let Some(existing) = self.store.overlapping(from, to) {
            tracing::trace!(existing = %existing.id, "correction overlaps a live one");
            return None;
        }

        let source = match request.domain {
            Domain::Grammar => CorrectionSource::Grammar,
            Domain::Word | Domain::Prediction => CorrectionSource::Word,
        };
        let new = NewCorrection {
            from,
            to,
            kind: CorrectionKind::Manual,
            source,
            original_value: correction.original.clone(),
            current_value: correction.original,
            suggestions,
            message: correction.message,
        };

        let automatic = self.options.autocorrect_enabled
            && source == CorrectionSource::Word
            && best.score >= self.options.auto_apply_threshold;
        if automatic {
            return Some(self.auto_apply(host, new, &best));
        }
        if let Reduced::Added(id) = self.store.reduce(Action::AddCorrection(new), &*host) {
            tracing::debug!(%id, from, to, ?source, "correction offered");
        }
        None
    }

    fn auto_apply<H: TextHost + ?Sized>(
        &mut self,
        host: &mut H,
        correction: NewCorrection,
        best: &Suggestion,
    ) -> Edit {
        let (edit, applied) = applier::auto_apply(host, correction, &best.text);
        self.engine_edit(&*host, &edit);
        let original = applied.original_value.clone();
        if let Reduced::Added(id) = self.store.reduce(Action::AddCorrection(applied), &*host) {
            self.stats.auto_applied += 1;
            tracing::debug!(
                %id,
                original = %original,
                replacement = %best.text,
                "correction applied automatically"
            );
        }
        edit
    }

    fn show_prediction<H: TextHost + ?Sized>(
        &mut self,
        host: &H,
        request: &CheckRequest,
        completion: Completion,
    ) {
        let cursor = host.cursor();
        if completion.text.is_empty() || !host.selection().is_empty() {
            return;
        }
        let typed = word_before(&request.text, request.text.chars().count())
            .filter(|&(_, to)| request.window_start + to == request.anchor)
            .map(|(from, to)| host.text(request.window_start + from, request.window_start + to))
            .unwrap_or_default();
        let prediction = PredictionEntry {
            full_text: format!("{typed}{}", completion.text),
            ghost_text: completion.text,
            anchor_pos: cursor,
        };
        if self.store.reduce(Action::SetPrediction(prediction), host) == Reduced::PredictionSet {
            tracing::debug!(anchor = cursor, "prediction shown");
        }
    }

    /// Bring the store and timers up to date with an edit made here.
    fn engine_edit<H: TextHost + ?Sized>(&mut self, host: &H, edit: &Edit) {
        self.coordinator.engine_edit(edit);
        let report = self.store.remap(edit, host, EditOrigin::Engine);
        if !report.dropped.is_empty() {
            tracing::trace!(dropped = ?report.dropped, "annotations invalidated by engine edit");
        }
    }

    fn filter_suggestions(&self, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        suggestions
            .into_iter()
            .filter(|s| s.score > self.options.suggestion_threshold)
            .take(self.options.max_suggestions)
            .collect()
    }

    fn live_entry<H: TextHost + ?Sized>(
        &self,
        host: &H,
        id: AnnotationId,
    ) -> Result<CorrectionEntry> {
        if self.destroyed {
            return Err(Error::EngineDestroyed);
        }
        let entry = self.store.get(id).cloned().ok_or(Error::UnknownAnnotation(id))?;
        let len = host.len_chars();
        if entry.to > len {
            return Err(Error::InvalidRange {
                from: entry.from,
                to: entry.to,
                len,
            });
        }
        if host.text(entry.from, entry.to) != entry.current_value {
            return Err(Error::TextChanged(id));
        }
        Ok(entry)
    }

    fn clear_prediction(&mut self) {
        self.coordinator.cancel(Domains::PREDICTION);
        if self.store.clear_prediction() {
            tracing::trace!("prediction cleared");
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("providers", &self.providers)
            .field("annotations", &self.store.len())
            .field("stats", &self.stats)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.destroy();
    }
}
