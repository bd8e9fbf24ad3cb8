//! Debouncing, sequencing and invalidation of provider requests.
//!
//! Each [`Domain`] has one pending (debounced) check and a generation
//! counter. A user edit advances every generation, so any result issued
//! before it is stale on arrival. Edits the engine makes itself do not
//! advance generations; they are logged instead, and results issued before
//! them have their positions carried through the log on arrival.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use livecheck::coordinator::{Domains, RequestCoordinator};
//! use livecheck::provider::{CheckReason, Domain};
//!
//! let mut coordinator = RequestCoordinator::new();
//! let now = Instant::now();
//! coordinator.schedule(Domain::Word, CheckReason::WordBoundary, (0, 3), now);
//! let (ticket, _abort) = coordinator.issue(Domain::Word, 4);
//!
//! // The user types again before the result arrives.
//! coordinator.advance(Domains::all());
//! assert!(coordinator.accept(&ticket, 5).is_none());
//! ```

mod executor;

use std::time::Instant;

use bitflags::bitflags;

use crate::provider::{AbortFlag, CheckReason, Domain};
use crate::text::{Bias, Edit};

pub use executor::{Executor, InlineExecutor, Job, JobOutput, JobResult, ThreadedExecutor};

bitflags! {
    /// Set of check domains.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Domains: u8 {
        const WORD = 1 << 0;
        const GRAMMAR = 1 << 1;
        const PREDICTION = 1 << 2;
    }
}

impl From<Domain> for Domains {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Word => Self::WORD,
            Domain::Grammar => Self::GRAMMAR,
            Domain::Prediction => Self::PREDICTION,
        }
    }
}

/// Identity of an issued request, checked again when its result arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub domain: Domain,
    pub generation: u64,
    /// Cursor position the request was computed for.
    pub anchor: usize,
    /// Number of engine-made edits seen when the request was issued.
    pub edit_seq: u64,
}

/// A debounced check waiting for its timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingCheck {
    pub reason: CheckReason,
    /// Window to check, in current document offsets.
    pub window: (usize, usize),
    pub due_at: Instant,
    cycle: u64,
}

#[derive(Debug, Default)]
struct DomainState {
    generation: u64,
    pending: Option<PendingCheck>,
    in_flight: Option<AbortFlag>,
}

/// Per-domain timers, generations and soft cancellation.
#[derive(Debug, Default)]
pub struct RequestCoordinator {
    domains: [DomainState; 3],
    idle_due: Option<Instant>,
    cycle: u64,
    edit_seq: u64,
    engine_edits: Vec<(u64, Edit)>,
    torn_down: bool,
}

impl RequestCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, domain: Domain) -> &DomainState {
        &self.domains[domain.index()]
    }

    fn state_mut(&mut self, domain: Domain) -> &mut DomainState {
        &mut self.domains[domain.index()]
    }

    /// Current generation of a domain.
    #[must_use]
    pub fn generation(&self, domain: Domain) -> u64 {
        self.state(domain).generation
    }

    /// Pending check of a domain, if any.
    #[must_use]
    pub fn pending(&self, domain: Domain) -> Option<&PendingCheck> {
        self.state(domain).pending.as_ref()
    }

    /// Start a new edit cycle. Schedules within one cycle keep the
    /// earliest deadline.
    pub fn begin_cycle(&mut self) {
        self.cycle += 1;
    }

    /// Schedule a check, replacing any pending one of the same domain.
    ///
    /// A grammar schedule also aborts the grammar request in flight. Within
    /// one cycle a later, slower schedule does not push back an earlier,
    /// faster deadline.
    pub fn schedule(
        &mut self,
        domain: Domain,
        reason: CheckReason,
        window: (usize, usize),
        due_at: Instant,
    ) {
        let cycle = self.cycle;
        let state = self.state_mut(domain);
        let (reason, due_at) = match state.pending {
            Some(existing) if existing.cycle == cycle && existing.due_at < due_at => {
                (existing.reason, existing.due_at)
            }
            _ => (reason, due_at),
        };
        state.pending = Some(PendingCheck {
            reason,
            window,
            due_at,
            cycle,
        });
        if domain == Domain::Grammar {
            if let Some(flag) = state.in_flight.take() {
                flag.abort();
            }
        }
    }

    /// Drop pending checks and abort in-flight requests of `domains`.
    pub fn cancel(&mut self, domains: Domains) {
        for domain in Domain::ALL {
            if domains.contains(domain.into()) {
                let state = self.state_mut(domain);
                state.pending = None;
                if let Some(flag) = state.in_flight.take() {
                    flag.abort();
                }
            }
        }
    }

    /// Advance the generations of `domains`, making their in-flight
    /// results stale.
    pub fn advance(&mut self, domains: Domains) {
        for domain in Domain::ALL {
            if domains.contains(domain.into()) {
                let state = self.state_mut(domain);
                state.generation = state.generation.wrapping_add(1);
            }
        }
    }

    /// Record a user edit: every in-flight result becomes stale and the
    /// engine-edit log is no longer needed.
    pub fn user_edit(&mut self, edit: &Edit) {
        self.advance(Domains::all());
        self.remap_pending(edit);
        self.engine_edits.clear();
    }

    /// Record an edit made by the engine itself.
    pub fn engine_edit(&mut self, edit: &Edit) {
        self.remap_pending(edit);
        self.edit_seq += 1;
        self.engine_edits.push((self.edit_seq, edit.clone()));
    }

    fn remap_pending(&mut self, edit: &Edit) {
        for state in &mut self.domains {
            if let Some(pending) = state.pending.as_mut() {
                match edit.map_window(pending.window.0, pending.window.1) {
                    Some(window) => pending.window = window,
                    None => state.pending = None,
                }
            }
        }
    }

    /// Reset the idle timer.
    pub fn reset_idle(&mut self, due_at: Instant) {
        self.idle_due = Some(due_at);
    }

    /// True once if the idle timer has expired.
    pub fn take_idle(&mut self, now: Instant) -> bool {
        match self.idle_due {
            Some(due) if due <= now => {
                self.idle_due = None;
                true
            }
            _ => false,
        }
    }

    /// Remove and return every pending check whose timer has expired.
    pub fn take_due(&mut self, now: Instant) -> Vec<(Domain, PendingCheck)> {
        let mut due = Vec::new();
        for domain in Domain::ALL {
            let state = self.state_mut(domain);
            if state.pending.is_some_and(|p| p.due_at <= now) {
                if let Some(pending) = state.pending.take() {
                    due.push((domain, pending));
                }
            }
        }
        due
    }

    /// Remove and return a pending check regardless of its timer.
    pub fn take_now(&mut self, domain: Domain) -> Option<PendingCheck> {
        self.state_mut(domain).pending.take()
    }

    /// Earliest instant at which `poll` has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.domains
            .iter()
            .filter_map(|s| s.pending.map(|p| p.due_at))
            .chain(self.idle_due)
            .min()
    }

    /// Issue a ticket for a request about to be dispatched.
    pub fn issue(&mut self, domain: Domain, anchor: usize) -> (Ticket, AbortFlag) {
        let ticket = Ticket {
            domain,
            generation: self.generation(domain),
            anchor,
            edit_seq: self.edit_seq,
        };
        let abort = AbortFlag::new();
        let state = self.state_mut(domain);
        if let Some(previous) = state.in_flight.replace(abort.clone()) {
            if domain == Domain::Grammar {
                previous.abort();
            }
        }
        (ticket, abort)
    }

    /// Check a ticket against the current state.
    ///
    /// Returns the engine edits made since the ticket was issued (oldest
    /// first) if the result may still be applied, or `None` if it is stale:
    /// the engine was torn down, the domain generation moved on, or the
    /// cursor is no longer where the request was computed for.
    #[must_use]
    pub fn accept(&self, ticket: &Ticket, cursor: usize) -> Option<Vec<Edit>> {
        if self.torn_down || ticket.generation != self.generation(ticket.domain) {
            return None;
        }
        let edits: Vec<Edit> = self
            .engine_edits
            .iter()
            .filter(|(seq, _)| *seq > ticket.edit_seq)
            .map(|(_, edit)| edit.clone())
            .collect();
        let anchor = edits
            .iter()
            .fold(ticket.anchor, |pos, edit| edit.map(pos, Bias::After));
        (anchor == cursor).then_some(edits)
    }

    /// Forget the in-flight flag of a finished request.
    pub fn finish(&mut self, ticket: &Ticket) {
        if ticket.generation == self.generation(ticket.domain) {
            self.state_mut(ticket.domain).in_flight = None;
        }
    }

    /// Stop everything; every later result is stale.
    pub fn teardown(&mut self) {
        self.cancel(Domains::all());
        self.idle_due = None;
        self.engine_edits.clear();
        self.torn_down = true;
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
