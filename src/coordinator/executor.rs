//! Running provider calls off the edit path.
//!
//! ```text
//! Engine (host thread)                   Worker thread(s)
//! --------------------                   ----------------
//! submit(Job)          ─────────────▶
//!                                          job.run()
//!                                          (ProviderService call)
//! drain()              ◀─────────────    JobOutput
//! validate + apply
//! ```
//!
//! Results always come back through [`Executor::drain`], which the engine
//! calls from `poll`, so the host's edits between submit and drain are
//! seen before any result is applied.

use std::collections::VecDeque;
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::coordinator::Ticket;
use crate::provider::{
    CheckRequest, Completion, Correction, Domain, ProviderError, ProviderService,
};

/// A provider call waiting to run.
pub struct Job {
    pub ticket: Ticket,
    pub request: CheckRequest,
    providers: Arc<ProviderService>,
}

impl Job {
    #[must_use]
    pub fn new(ticket: Ticket, request: CheckRequest, providers: Arc<ProviderService>) -> Self {
        Self {
            ticket,
            request,
            providers,
        }
    }

    /// Run the provider call on the current thread.
    #[must_use]
    pub fn run(self) -> JobOutput {
        let result = match self.request.domain {
            Domain::Word | Domain::Grammar => {
                JobResult::Corrections(self.providers.correct(&self.request))
            }
            Domain::Prediction => JobResult::Completion(self.providers.complete(&self.request)),
        };
        JobOutput {
            ticket: self.ticket,
            request: self.request,
            result,
        }
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("ticket", &self.ticket)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// What a provider call produced.
#[derive(Clone, Debug)]
pub enum JobResult {
    Corrections(Result<Vec<Correction>, ProviderError>),
    Completion(Result<Option<Completion>, ProviderError>),
}

/// A finished job.
#[derive(Clone, Debug)]
pub struct JobOutput {
    pub ticket: Ticket,
    pub request: CheckRequest,
    pub result: JobResult,
}

/// Somewhere to run jobs.
pub trait Executor {
    /// Start a job. Must not block on the provider call for longer than
    /// the host is willing to stall.
    fn submit(&mut self, job: Job);

    /// Outputs of jobs finished since the last drain, in completion order.
    fn drain(&mut self) -> Vec<JobOutput>;

    /// Stop accepting work and release threads. Must return without
    /// waiting for a provider call in progress.
    fn shutdown(&mut self) {}
}

/// Runs each job at submit time and hands its output over on the next drain.
///
/// Suitable for fast local engines and for deterministic tests.
#[derive(Debug, Default)]
pub struct InlineExecutor {
    done: VecDeque<JobOutput>,
}

impl InlineExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Executor for InlineExecutor {
    fn submit(&mut self, job: Job) {
        self.done.push_back(job.run());
    }

    fn drain(&mut self) -> Vec<JobOutput> {
        self.done.drain(..).collect()
    }
}

/// Commands sent to worker threads.
enum WorkerCommand {
    Run(Job),
    Shutdown,
}

/// Runs jobs on dedicated worker threads.
///
/// Jobs are moved to the workers over a channel and outputs come back over
/// another; nothing is shared but the provider service itself.
pub struct ThreadedExecutor {
    tx: Sender<WorkerCommand>,
    rx: Receiver<JobOutput>,
    handles: Vec<JoinHandle<()>>,
}

impl ThreadedExecutor {
    /// Spawn one worker thread.
    pub fn new() -> io::Result<Self> {
        Self::with_workers(1)
    }

    /// Spawn `workers` threads (at least one) sharing one job queue.
    pub fn with_workers(workers: usize) -> io::Result<Self> {
        let (tx, worker_rx) = mpsc::channel::<WorkerCommand>();
        let (worker_tx, rx) = mpsc::channel::<JobOutput>();
        let worker_rx = Arc::new(Mutex::new(worker_rx));

        let mut handles = Vec::new();
        for index in 0..workers.max(1) {
            let jobs = Arc::clone(&worker_rx);
            let outputs = worker_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("livecheck-provider-{index}"))
                .spawn(move || worker_main(&jobs, &outputs))?;
            handles.push(handle);
        }

        Ok(Self { tx, rx, handles })
    }
}

fn worker_main(jobs: &Mutex<Receiver<WorkerCommand>>, outputs: &Sender<JobOutput>) {
    loop {
        let command = match jobs.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => return,
        };
        match command {
            Ok(WorkerCommand::Run(job)) => {
                let ticket = job.ticket;
                match std::panic::catch_unwind(AssertUnwindSafe(|| job.run())) {
                    Ok(output) => {
                        if outputs.send(output).is_err() {
                            return;
                        }
                    }
                    Err(_) => {
                        tracing::error!(?ticket, "provider call panicked; result dropped");
                    }
                }
            }
            Ok(WorkerCommand::Shutdown) | Err(_) => return,
        }
    }
}

impl Executor for ThreadedExecutor {
    fn submit(&mut self, job: Job) {
        if self.tx.send(WorkerCommand::Run(job)).is_err() {
            tracing::warn!("provider workers are gone; job dropped");
        }
    }

    fn drain(&mut self) -> Vec<JobOutput> {
        self.rx.try_iter().collect()
    }

    /// Tell every worker to stop, then detach them. A worker busy with a
    /// provider call exits once the call returns; its output is never
    /// drained.
    fn shutdown(&mut self) {
        let workers = self.handles.len();
        for _ in self.handles.drain(..) {
            let _ = self.tx.send(WorkerCommand::Shutdown);
        }
        if workers > 0 {
            tracing::debug!(workers, "provider workers released");
        }
    }
}

impl Drop for ThreadedExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
