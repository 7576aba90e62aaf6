//! Range partitioning.
//!
//! Splits a closed interval into contiguous, non-overlapping chunks of at
//! most `chunk_size` integers, ordered by lower bound.

use tracing::trace;

use crate::error::{QuarryError, Result};
use crate::types::Chunk;

/// Upper bound on the up-front allocation for the chunk list.
const MAX_PREALLOC: usize = 1 << 16;

/// Split `[start, end]` into chunks of at most `chunk_size` integers.
///
/// Returns an empty sequence when `start > end`. The last chunk is clipped
/// to `end`. Arithmetic is widened so ranges touching `i64::MAX` terminate.
///
/// # Errors
///
/// Returns [`QuarryError::InvalidArgument`] if `chunk_size` is zero.
///
/// # Example
///
/// ```
/// use quarry_core::{partition, Chunk};
///
/// let chunks = partition(1, 12, 5).unwrap();
/// assert_eq!(chunks, vec![Chunk::new(1, 5), Chunk::new(6, 10), Chunk::new(11, 12)]);
/// ```
pub fn partition(start: i64, end: i64, chunk_size: u64) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(QuarryError::invalid("chunk_size must be >= 1"));
    }
    if start > end {
        return Ok(Vec::new());
    }

    let end_wide = i128::from(end);
    let step = i128::from(chunk_size);
    let count = (end_wide - i128::from(start)) / step + 1;

    let mut chunks =
        Vec::with_capacity(usize::try_from(count).map_or(MAX_PREALLOC, |n| n.min(MAX_PREALLOC)));
    let mut cur = i128::from(start);
    while cur <= end_wide {
        let hi = (cur + step - 1).min(end_wide);
        // Both bounds lie within [start, end], so the narrowing is lossless.
        chunks.push(Chunk {
            lo: cur as i64,
            hi: hi as i64,
        });
        cur += step;
    }

    trace!(start, end, chunk_size, chunks = chunks.len(), "partitioned range");
    Ok(chunks)
}
