//! Shared-blackboard scan strategy.
//!
//! Symmetric workers pull chunks from a single mutex-guarded board and post
//! their matches back to it. One lock guards the work queue, the result set,
//! the completion flag, and the completed-chunk counter together.
//!
//! Each worker iteration is one critical section (claim) followed by
//! unguarded evaluation, then a second critical section (post):
//!
//! ```text
//!   lock ─▶ done? ──yes──▶ Done
//!            │ no
//!            ▼
//!         queue empty? ──yes──▶ set done ─▶ Done
//!            │ no
//!            ▼
//!         pop chunk ─▶ unlock ─▶ evaluate ─▶ lock ─▶ append + count ─▶ unlock ─┐
//!            ▲                                                                 │
//!            └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use quarry_core::{partition, CancellationToken, IsPrime};
//! use quarry_scan::blackboard::Blackboard;
//!
//! let board = Blackboard::new(partition(1, 20, 5).unwrap());
//! let outcome = board.run(3, &IsPrime, &CancellationToken::new()).unwrap();
//! assert_eq!(outcome.completed_chunks, 4);
//! ```

use std::sync::{Mutex, MutexGuard};
use std::thread;

use quarry_core::{evaluate_chunk, CancellationToken, Chunk, Predicate, QuarryError, Result};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Lifecycle of a blackboard worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Holding a claimed chunk, or about to claim one.
    Running,
    /// Posted its last result and has not yet claimed again.
    Idle,
    /// Observed completion (or cancellation) and exited.
    Done,
}

/// Outcome of a single claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// A chunk now owned by the caller.
    Work(Chunk),
    /// No more work will be handed out.
    Finished,
}

/// Per-worker statistics from a blackboard run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerSummary {
    /// Worker index.
    pub id: usize,
    /// Chunks this worker evaluated and posted.
    pub chunks_processed: usize,
    /// State the worker exited in.
    pub state: WorkerState,
}

/// Result of a completed blackboard run.
#[derive(Debug, Clone)]
pub struct BlackboardOutcome {
    /// All posted matches, unordered across workers.
    pub results: Vec<i64>,
    /// Completed-chunk counter at the end of the run.
    pub completed_chunks: usize,
    /// Chunks placed on the board.
    pub total_chunks: usize,
    /// One entry per worker, in worker-id order.
    pub workers: Vec<WorkerSummary>,
}

/// State guarded by the board's single lock.
#[derive(Debug)]
struct BoardState {
    queue: Vec<Chunk>,
    results: Vec<i64>,
    done: bool,
    completed: usize,
    failure: Option<QuarryError>,
}

/// Mutex-guarded blackboard shared by all workers of a run.
#[derive(Debug)]
pub struct Blackboard {
    state: Mutex<BoardState>,
    total_chunks: usize,
}

impl Blackboard {
    /// Place `chunks` on a fresh board.
    #[must_use]
    pub fn new(chunks: Vec<Chunk>) -> Self {
        let total_chunks = chunks.len();
        Self {
            state: Mutex::new(BoardState {
                queue: chunks,
                results: Vec::new(),
                done: false,
                completed: 0,
                failure: None,
            }),
            total_chunks,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BoardState>> {
        self.state.lock().map_err(|_| QuarryError::LockPoisoned)
    }

    /// Claim the next chunk, or learn that the board is finished.
    ///
    /// The first caller to find the queue empty sets the completion flag.
    /// Checking and setting the flag happen under one lock acquisition, so
    /// concurrent callers racing on an empty queue are harmless.
    pub fn claim(&self) -> Result<Claim> {
        let mut state = self.lock()?;
        if state.done {
            return Ok(Claim::Finished);
        }
        match state.queue.pop() {
            Some(chunk) => Ok(Claim::Work(chunk)),
            None => {
                state.done = true;
                Ok(Claim::Finished)
            }
        }
    }

    /// Append a chunk's matches and count the chunk as completed.
    pub fn post(&self, matches: Vec<i64>) -> Result<()> {
        let mut state = self.lock()?;
        state.results.extend(matches);
        state.completed += 1;
        Ok(())
    }

    /// Record a failure and stop further claims. Only the first failure is kept.
    pub fn fail(&self, error: QuarryError) -> Result<()> {
        let mut state = self.lock()?;
        state.done = true;
        state.failure.get_or_insert(error);
        Ok(())
    }

    /// Completed-chunk counter.
    pub fn completed(&self) -> Result<usize> {
        Ok(self.lock()?.completed)
    }

    /// Chunks still waiting to be claimed.
    pub fn remaining(&self) -> Result<usize> {
        Ok(self.lock()?.queue.len())
    }

    /// Whether the completion flag is set.
    pub fn is_done(&self) -> Result<bool> {
        Ok(self.lock()?.done)
    }

    /// Chunks originally placed on the board.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Run `workers` symmetric workers against the board until no work remains.
    ///
    /// Blocks until every worker has exited. The token is consulted at the
    /// top of every worker iteration.
    ///
    /// # Errors
    ///
    /// - [`QuarryError::InvalidArgument`] if `workers` is zero
    /// - the first [`QuarryError::WorkerFailure`] raised by any worker
    /// - [`QuarryError::Cancelled`] if the token stopped the run with chunks outstanding
    pub fn run<P>(
        self,
        workers: usize,
        predicate: &P,
        token: &CancellationToken,
    ) -> Result<BlackboardOutcome>
    where
        P: Predicate + ?Sized,
    {
        if workers == 0 {
            return Err(QuarryError::invalid("workers must be >= 1"));
        }
        debug!(workers, chunks = self.total_chunks, "starting blackboard workers");

        // Spawn failures stop this run's workers without touching the caller's token.
        let run_token = token.child_token();
        let token = &run_token;
        let board = &self;
        let summaries = thread::scope(|s| -> Result<Vec<WorkerSummary>> {
            let mut handles = Vec::with_capacity(workers);
            for id in 0..workers {
                let handle = thread::Builder::new()
                    .name(format!("quarry-board-{id}"))
                    .spawn_scoped(s, move || board.work(id, predicate, token));
                match handle {
                    Ok(h) => handles.push(h),
                    Err(e) => {
                        // Stop the workers already running before bailing out.
                        token.cancel();
                        return Err(e.into());
                    }
                }
            }

            let mut summaries = Vec::with_capacity(workers);
            let mut panicked = 0;
            for handle in handles {
                match handle.join() {
                    Ok(summary) => summaries.push(summary),
                    Err(_) => panicked += 1,
                }
            }
            if panicked > 0 {
                return Err(QuarryError::Thread(format!(
                    "{panicked} blackboard worker(s) panicked outside chunk evaluation"
                )));
            }
            Ok(summaries)
        })?;

        let state = self.state.into_inner().map_err(|_| QuarryError::LockPoisoned)?;
        if let Some(error) = state.failure {
            warn!(%error, "blackboard run failed");
            return Err(error);
        }
        if state.completed < self.total_chunks {
            warn!(
                completed = state.completed,
                total = self.total_chunks,
                "blackboard run cancelled"
            );
            return Err(QuarryError::Cancelled);
        }

        debug!(
            completed = state.completed,
            matches = state.results.len(),
            "blackboard workers joined"
        );
        Ok(BlackboardOutcome {
            results: state.results,
            completed_chunks: state.completed,
            total_chunks: self.total_chunks,
            workers: summaries,
        })
    }

    /// Worker loop. Never panics; board errors end the worker.
    fn work<P>(&self, id: usize, predicate: &P, token: &CancellationToken) -> WorkerSummary
    where
        P: Predicate + ?Sized,
    {
        let mut summary = WorkerSummary {
            id,
            chunks_processed: 0,
            state: WorkerState::Running,
        };

        loop {
            if token.is_cancelled() {
                debug!(worker = id, "cancellation observed");
                break;
            }

            let chunk = match self.claim() {
                Ok(Claim::Work(chunk)) => chunk,
                Ok(Claim::Finished) => break,
                Err(e) => {
                    warn!(worker = id, error = %e, "claim failed");
                    break;
                }
            };
            summary.state = WorkerState::Running;
            trace!(worker = id, %chunk, "claimed chunk");

            let posted = match evaluate_chunk(chunk, predicate) {
                Ok(matches) => self.post(matches),
                Err(error) => {
                    warn!(worker = id, %chunk, %error, "chunk evaluation failed");
                    if let Err(e) = self.fail(error) {
                        warn!(worker = id, error = %e, "failure could not be recorded");
                    }
                    break;
                }
            };
            if let Err(e) = posted {
                warn!(worker = id, error = %e, "post failed");
                break;
            }

            summary.chunks_processed += 1;
            summary.state = WorkerState::Idle;
            trace!(worker = id, %chunk, "posted chunk");
        }

        summary.state = WorkerState::Done;
        debug!(worker = id, chunks = summary.chunks_processed, "worker done");
        summary
    }
}
