//! Scan entry points.
//!
//! [`Scanner`] validates a [`ScanConfig`], partitions the range, runs one of
//! the two coordinators under the deadline watchdog, and aggregates the
//! output into a [`ScanReport`]. [`run_blackboard`] and [`run_pool`] are the
//! plain-function forms that return only the sorted matches.

use std::fmt;
use std::time::Instant;

use quarry_core::{partition, CancellationToken, Predicate, Result, ScanConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{merge_ordered, merge_unordered};
use crate::blackboard::Blackboard;
use crate::deadline::run_with_deadline;
use crate::pool::PoolCoordinator;

/// Task-distribution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Workers pull chunks from a shared, mutex-guarded board.
    Blackboard,
    /// A coordinator dispatches pre-partitioned chunks to a fixed pool.
    Pool,
}

impl Strategy {
    /// All strategies, in a stable order.
    pub const ALL: [Strategy; 2] = [Strategy::Blackboard, Strategy::Pool];

    /// Lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Blackboard => "blackboard",
            Self::Pool => "pool",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Strategy that produced the report.
    pub strategy: Strategy,
    /// Lower bound of the scanned interval.
    pub start: i64,
    /// Upper bound of the scanned interval.
    pub end: i64,
    /// Maximum integers per chunk.
    pub chunk_size: u64,
    /// Worker threads used.
    pub workers: usize,
    /// Chunks produced by the partitioner.
    pub chunks: usize,
    /// Chunks whose results were collected.
    pub completed_chunks: usize,
    /// Matching integers in ascending order.
    pub matches: Vec<i64>,
    /// Wall-clock time of the run in seconds.
    pub elapsed_secs: f64,
}

impl ScanReport {
    /// Number of matches.
    #[must_use]
    pub fn count(&self) -> usize {
        self.matches.len()
    }

    /// The first `n` matches.
    #[must_use]
    pub fn head(&self, n: usize) -> &[i64] {
        &self.matches[..n.min(self.matches.len())]
    }

    /// The last `n` matches.
    #[must_use]
    pub fn tail(&self, n: usize) -> &[i64] {
        &self.matches[self.matches.len().saturating_sub(n)..]
    }

    /// Integers scanned per second.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let scanned = if self.start > self.end {
            0.0
        } else {
            (i128::from(self.end) - i128::from(self.start) + 1) as f64
        };
        if self.elapsed_secs > 0.0 {
            scanned / self.elapsed_secs
        } else {
            0.0
        }
    }
}

/// Runs scans over a configured range with a fixed predicate.
///
/// # Example
///
/// ```
/// use quarry_core::{IsPrime, ScanConfig};
/// use quarry_scan::{Scanner, Strategy};
///
/// let config = ScanConfig::new(1, 20).with_chunk_size(5).with_workers(2);
/// let scanner = Scanner::new(config, IsPrime).unwrap();
/// let report = scanner.run(Strategy::Blackboard).unwrap();
/// assert_eq!(report.matches, vec![2, 3, 5, 7, 11, 13, 17, 19]);
/// assert_eq!(report.completed_chunks, 4);
/// ```
#[derive(Debug)]
pub struct Scanner<P> {
    config: ScanConfig,
    predicate: P,
    token: CancellationToken,
}

impl<P: Predicate> Scanner<P> {
    /// Create a scanner after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`quarry_core::QuarryError::InvalidArgument`] for a zero chunk
    /// size, zero workers, or a zero timeout.
    pub fn new(config: ScanConfig, predicate: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            predicate,
            token: CancellationToken::new(),
        })
    }

    /// Use `token` to cancel runs from outside.
    ///
    /// Each run watches `token` through its own child token, so a run's
    /// deadline never trips `token` itself.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Token consulted by this scanner's workers.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run one scan with `strategy`.
    ///
    /// # Errors
    ///
    /// Returns the first worker failure, [`quarry_core::QuarryError::Cancelled`]
    /// or [`quarry_core::QuarryError::Timeout`].
    pub fn run(&self, strategy: Strategy) -> Result<ScanReport> {
        match strategy {
            Strategy::Blackboard => self.run_blackboard(),
            Strategy::Pool => self.run_pool(),
        }
    }

    /// Run the shared-blackboard strategy.
    ///
    /// # Errors
    ///
    /// See [`Scanner::run`].
    pub fn run_blackboard(&self) -> Result<ScanReport> {
        let started = Instant::now();
        let chunks = partition(self.config.start, self.config.end, self.config.chunk_size)?;
        let total = chunks.len();
        if chunks.is_empty() {
            return Ok(self.report(Strategy::Blackboard, 0, 0, Vec::new(), started));
        }

        let workers = self.config.workers;
        let token = self.token.child_token();
        let outcome = run_with_deadline(self.config.timeout, &token, || {
            Blackboard::new(chunks).run(workers, &self.predicate, &token)
        })?;
        debug_assert_eq!(outcome.completed_chunks, outcome.total_chunks);

        let matches = merge_unordered(outcome.results);
        Ok(self.report(
            Strategy::Blackboard,
            total,
            outcome.completed_chunks,
            matches,
            started,
        ))
    }

    /// Run the master/worker pool strategy.
    ///
    /// # Errors
    ///
    /// See [`Scanner::run`].
    pub fn run_pool(&self) -> Result<ScanReport> {
        let started = Instant::now();
        let chunks = partition(self.config.start, self.config.end, self.config.chunk_size)?;
        if chunks.is_empty() {
            return Ok(self.report(Strategy::Pool, 0, 0, Vec::new(), started));
        }

        let pool = PoolCoordinator::new(self.config.workers)?;
        let token = self.token.child_token();
        let batches = run_with_deadline(self.config.timeout, &token, || {
            pool.run(&chunks, &self.predicate, &token)
        })?;

        let completed = batches.len();
        let matches = merge_ordered(batches);
        Ok(self.report(Strategy::Pool, chunks.len(), completed, matches, started))
    }

    fn report(
        &self,
        strategy: Strategy,
        chunks: usize,
        completed_chunks: usize,
        matches: Vec<i64>,
        started: Instant,
    ) -> ScanReport {
        let elapsed = started.elapsed();
        info!(
            %strategy,
            start = self.config.start,
            end = self.config.end,
            chunks,
            matches = matches.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan finished"
        );
        ScanReport {
            strategy,
            start: self.config.start,
            end: self.config.end,
            chunk_size: self.config.chunk_size,
            workers: self.config.workers,
            chunks,
            completed_chunks,
            matches,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }
}

/// Scan `[start, end]` with the shared-blackboard strategy.
///
/// # Errors
///
/// Returns [`quarry_core::QuarryError::InvalidArgument`] for a zero
/// `chunk_size` or `workers`, or the first worker failure.
pub fn run_blackboard<P>(
    start: i64,
    end: i64,
    chunk_size: u64,
    workers: usize,
    predicate: P,
) -> Result<Vec<i64>>
where
    P: Predicate,
{
    let config = config_for(start, end, chunk_size, workers);
    debug!(?config, "run_blackboard");
    Ok(Scanner::new(config, predicate)?.run_blackboard()?.matches)
}

/// Scan `[start, end]` with the master/worker pool strategy.
///
/// # Errors
///
/// Returns [`quarry_core::QuarryError::InvalidArgument`] for a zero
/// `chunk_size` or `workers`, or the first worker failure.
pub fn run_pool<P>(
    start: i64,
    end: i64,
    chunk_size: u64,
    workers: usize,
    predicate: P,
) -> Result<Vec<i64>>
where
    P: Predicate,
{
    let config = config_for(start, end, chunk_size, workers);
    debug!(?config, "run_pool");
    Ok(Scanner::new(config, predicate)?.run_pool()?.matches)
}

fn config_for(start: i64, end: i64, chunk_size: u64, workers: usize) -> ScanConfig {
    ScanConfig {
        start,
        end,
        chunk_size,
        workers,
        timeout: None,
    }
}
