//! # quarry-scan
//!
//! Parallel range scanning with two task-distribution strategies.
//!
//! Both strategies split an integer interval into chunks, evaluate a
//! predicate over every chunk on a set of worker threads, and merge the
//! per-chunk matches into one ascending sequence.
//!
//! ## Strategies
//!
//! - **Blackboard**: symmetric workers pull chunks from a shared,
//!   mutex-guarded board and post results back into it. The first worker
//!   to find the queue empty declares the run complete.
//! - **Pool**: a coordinator partitions the range up front and dispatches
//!   the chunks to a fixed-size pool, collecting one batch per chunk in
//!   submission order.
//!
//! ```text
//!               ┌─────────────┐
//!  [start,end] ─▶ partition() ─┬──▶ Blackboard ──┐
//!               └─────────────┘ │   (shared lock) │
//!                               │                 ├──▶ aggregate ─▶ sorted matches
//!                               └──▶ Pool ────────┘
//!                                   (ordered collect)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry_core::IsPrime;
//! use quarry_scan::{run_blackboard, run_pool};
//!
//! let a = run_blackboard(1, 100, 10, 4, IsPrime).unwrap();
//! let b = run_pool(1, 100, 10, 4, IsPrime).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.len(), 25);
//! ```
//!
//! ## Modules
//!
//! - [`blackboard`]: shared-board coordinator
//! - [`pool`]: fixed-pool coordinator
//! - [`aggregate`]: result merging
//! - [`deadline`]: join-barrier watchdog
//! - [`scanner`]: configured entry points and reports

pub mod aggregate;
pub mod blackboard;
pub mod deadline;
pub mod pool;
pub mod scanner;

// Re-export commonly used types
pub use aggregate::{duplicates, merge_ordered, merge_unordered};
pub use blackboard::{Blackboard, BlackboardOutcome, Claim, WorkerState, WorkerSummary};
pub use pool::PoolCoordinator;
pub use quarry_core::{
    CancellationToken, Chunk, IsPrime, Predicate, QuarryError, Result, ScanConfig,
};
pub use scanner::{run_blackboard, run_pool, ScanReport, Scanner, Strategy};
