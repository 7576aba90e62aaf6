//! Master/worker pool scan strategy.
//!
//! The coordinator partitions the range up front and hands every chunk to a
//! fixed-size rayon pool. Results come back as one batch per chunk, in the
//! order the chunks were submitted, whatever order the workers finish in.
//! No state is shared between workers; the pool's indexed collect does the
//! buffering and reordering.

use quarry_core::{evaluate_chunk, CancellationToken, Chunk, Predicate, QuarryError, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

/// Fixed-size pool of interchangeable chunk evaluators.
///
/// # Example
///
/// ```
/// use quarry_core::{partition, CancellationToken, IsPrime};
/// use quarry_scan::pool::PoolCoordinator;
///
/// let pool = PoolCoordinator::new(2).unwrap();
/// let chunks = partition(1, 20, 5).unwrap();
/// let batches = pool.run(&chunks, &IsPrime, &CancellationToken::new()).unwrap();
/// assert_eq!(batches, vec![vec![2, 3, 5], vec![7], vec![11, 13], vec![17, 19]]);
/// ```
pub struct PoolCoordinator {
    pool: ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for PoolCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolCoordinator")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl PoolCoordinator {
    /// Build a pool with `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::InvalidArgument`] if `workers` is zero, or
    /// [`QuarryError::Thread`] if the threads cannot be started.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(QuarryError::invalid("workers must be >= 1"));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("quarry-pool-{i}"))
            .build()
            .map_err(|e| QuarryError::Thread(e.to_string()))?;
        Ok(Self { pool, workers })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Evaluate every chunk exactly once and return the batches in input order.
    ///
    /// The token is checked before each chunk is dispatched. Evaluation stops
    /// early at the first failing chunk.
    ///
    /// # Errors
    ///
    /// - [`QuarryError::WorkerFailure`] if a chunk evaluation faulted
    /// - [`QuarryError::Cancelled`] if the token was tripped before every chunk was dispatched
    pub fn run<P>(
        &self,
        chunks: &[Chunk],
        predicate: &P,
        token: &CancellationToken,
    ) -> Result<Vec<Vec<i64>>>
    where
        P: Predicate + ?Sized,
    {
        debug!(workers = self.workers, chunks = chunks.len(), "dispatching chunks to pool");

        let batches: Result<Vec<Vec<i64>>> = self.pool.install(|| {
            chunks
                .par_iter()
                .map(|&chunk| {
                    if token.is_cancelled() {
                        return Err(QuarryError::Cancelled);
                    }
                    evaluate_chunk(chunk, predicate)
                })
                .collect()
        });

        match batches {
            Ok(batches) => {
                debug!(batches = batches.len(), "pool collected all batches");
                Ok(batches)
            }
            Err(error) => {
                warn!(%error, "pool run failed");
                Err(error)
            }
        }
    }
}
