//! Common types for quarry.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// A closed sub-interval `[lo, hi]` of the scanned range.
///
/// Chunks are created by [`crate::partition`] and never mutated afterwards.
/// Every chunk satisfies `lo <= hi`; [`Chunk::new`] and deserialization both
/// reject reversed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawChunk")]
pub struct Chunk {
    /// Lower bound (inclusive)
    pub lo: i64,
    /// Upper bound (inclusive)
    pub hi: i64,
}

impl Chunk {
    /// Create a chunk.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi`.
    #[must_use]
    pub fn new(lo: i64, hi: i64) -> Self {
        assert!(lo <= hi, "chunk bounds out of order: lo={lo}, hi={hi}");
        Self { lo, hi }
    }

    /// Number of integers covered by the chunk, saturating at `u64::MAX`.
    ///
    /// A hand-built chunk with `lo > hi` has length zero.
    #[must_use]
    pub fn len(&self) -> u64 {
        let len = i128::from(self.hi) - i128::from(self.lo) + 1;
        len.clamp(0, i128::from(u64::MAX)) as u64
    }

    /// Only a hand-built chunk with reversed bounds is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    /// Whether `x` lies inside the chunk.
    #[must_use]
    pub fn contains(&self, x: i64) -> bool {
        self.lo <= x && x <= self.hi
    }

    /// Iterate the chunk's integers in ascending order.
    #[must_use]
    pub fn iter(&self) -> RangeInclusive<i64> {
        self.lo..=self.hi
    }
}

/// Wire form of [`Chunk`], checked before it becomes one.
#[derive(Deserialize)]
struct RawChunk {
    lo: i64,
    hi: i64,
}

impl TryFrom<RawChunk> for Chunk {
    type Error = String;

    fn try_from(raw: RawChunk) -> std::result::Result<Self, Self::Error> {
        if raw.lo > raw.hi {
            return Err(format!(
                "chunk bounds out of order: lo={}, hi={}",
                raw.lo, raw.hi
            ));
        }
        Ok(Self {
            lo: raw.lo,
            hi: raw.hi,
        })
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

impl IntoIterator for Chunk {
    type Item = i64;
    type IntoIter = RangeInclusive<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_len() {
        assert_eq!(Chunk::new(1, 5).len(), 5);
        assert_eq!(Chunk::new(7, 7).len(), 1);
        assert_eq!(Chunk::new(-3, 2).len(), 6);
        assert_eq!(Chunk::new(i64::MIN, i64::MAX).len(), u64::MAX);
    }

    #[test]
    fn test_chunk_iter_is_ascending() {
        let values: Vec<i64> = Chunk::new(6, 10).into_iter().collect();
        assert_eq!(values, vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_chunk_contains() {
        let chunk = Chunk::new(11, 15);
        assert!(chunk.contains(11));
        assert!(chunk.contains(15));
        assert!(!chunk.contains(10));
        assert!(!chunk.contains(16));
    }

    #[test]
    #[should_panic(expected = "out of order")]
    fn test_chunk_rejects_reversed_bounds() {
        let _ = Chunk::new(5, 4);
    }

    #[test]
    fn test_chunk_serde() {
        let chunk = Chunk::new(16, 20);
        let json = serde_json::to_string(&chunk).unwrap();
        assert_eq!(json, r#"{"lo":16,"hi":20}"#);
        let back: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunk);
    }

    #[test]
    fn test_chunk_deserialize_rejects_reversed_bounds() {
        let err = serde_json::from_str::<Chunk>(r#"{"lo":9,"hi":3}"#).unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn test_reversed_literal_has_zero_len() {
        let chunk = Chunk { lo: 9, hi: 3 };
        assert_eq!(chunk.len(), 0);
        assert!(chunk.is_empty());
        assert!(!Chunk::new(3, 3).is_empty());
        assert_eq!(chunk.iter().count(), 0);
    }
}
