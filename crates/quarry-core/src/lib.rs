//! # quarry-core
//!
//! Core building blocks for quarry, a parallel range scanner.
//!
//! Provides the pieces both scan strategies share:
//! - Chunks and the partitioner that produces them
//! - The predicate seam and the chunk evaluator
//! - Cooperative cancellation
//! - Scan configuration and the error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::{evaluate_chunk, partition, IsPrime};
//!
//! let chunks = partition(1, 20, 5).unwrap();
//! assert_eq!(chunks.len(), 4);
//!
//! let hits: Vec<i64> = chunks
//!     .into_iter()
//!     .flat_map(|chunk| evaluate_chunk(chunk, &IsPrime).unwrap())
//!     .collect();
//! assert_eq!(hits, vec![2, 3, 5, 7, 11, 13, 17, 19]);
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod partition;
pub mod predicate;
pub mod types;

pub use cancel::CancellationToken;
pub use config::ScanConfig;
pub use error::{QuarryError, Result};
pub use evaluator::evaluate_chunk;
pub use partition::partition;
pub use predicate::{IsPrime, Predicate};
pub use types::Chunk;
