//! Result aggregation.
//!
//! Turns per-worker or per-chunk outputs into one ascending sequence.
//! Duplicates are never removed: a repeated value means two chunks
//! overlapped, and [`duplicates`] exists so callers can detect that.

/// Sort the blackboard's result set, which is unordered across workers.
#[must_use]
pub fn merge_unordered(mut results: Vec<i64>) -> Vec<i64> {
    results.sort_unstable();
    results
}

/// Concatenate per-chunk batches in chunk order.
///
/// Batches from sorted, disjoint chunks are already globally ascending, so
/// the sort only runs when that does not hold.
#[must_use]
pub fn merge_ordered(batches: Vec<Vec<i64>>) -> Vec<i64> {
    let mut merged = batches.concat();
    if !is_ascending(&merged) {
        merged.sort_unstable();
    }
    merged
}

/// Whether `values` is in non-decreasing order.
#[must_use]
pub fn is_ascending(values: &[i64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Values occurring more than once in a sorted sequence, each reported once.
#[must_use]
pub fn duplicates(sorted: &[i64]) -> Vec<i64> {
    let mut repeated: Vec<i64> = sorted
        .windows(2)
        .filter(|w| w[0] == w[1])
        .map(|w| w[0])
        .collect();
    repeated.dedup();
    repeated
}
