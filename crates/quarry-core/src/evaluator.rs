//! Chunk evaluation.
//!
//! Applies a [`Predicate`] to every integer of a chunk. The evaluator reads
//! only its arguments, so it may run concurrently on any number of chunks.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{QuarryError, Result};
use crate::predicate::Predicate;
use crate::types::Chunk;

/// Return, in ascending order, every integer in `chunk` that satisfies `predicate`.
///
/// A panic raised by the predicate is caught and reported as
/// [`QuarryError::WorkerFailure`] tagged with the chunk.
///
/// # Example
///
/// ```
/// use quarry_core::{evaluate_chunk, Chunk, IsPrime};
///
/// let hits = evaluate_chunk(Chunk::new(11, 15), &IsPrime).unwrap();
/// assert_eq!(hits, vec![11, 13]);
/// ```
pub fn evaluate_chunk<P>(chunk: Chunk, predicate: &P) -> Result<Vec<i64>>
where
    P: Predicate + ?Sized,
{
    panic::catch_unwind(AssertUnwindSafe(|| {
        chunk.iter().filter(|&x| predicate.evaluate(x)).collect()
    }))
    .map_err(|payload| QuarryError::WorkerFailure {
        chunk,
        message: panic_message(&*payload),
    })
}

/// Render a panic payload as text.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "predicate panicked".to_string()
    }
}
