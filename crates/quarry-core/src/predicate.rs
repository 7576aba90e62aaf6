//! Per-element predicates.
//!
//! A predicate is a pure, stateless test applied to every integer of a
//! scanned range. Scan strategies call it concurrently from many threads,
//! so implementations must be `Send + Sync` and free of side effects.
//!
//! Any `Fn(i64) -> bool + Send + Sync` closure is a predicate:
//!
//! ```rust
//! use quarry_core::Predicate;
//!
//! let even = |x: i64| x % 2 == 0;
//! assert!(even.evaluate(4));
//! assert!(!even.evaluate(5));
//! ```

/// A pure test over a single integer.
pub trait Predicate: Send + Sync {
    /// Whether `x` satisfies the predicate.
    fn evaluate(&self, x: i64) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(i64) -> bool + Send + Sync,
{
    #[inline]
    fn evaluate(&self, x: i64) -> bool {
        self(x)
    }
}

/// Primality by trial division over the 6k +/- 1 candidates.
///
/// Values below 2, including all negatives, are not prime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsPrime;

impl Predicate for IsPrime {
    fn evaluate(&self, x: i64) -> bool {
        if x < 2 {
            return false;
        }
        let n = x as u64;
        if n <= 3 {
            return true;
        }
        if n % 2 == 0 || n % 3 == 0 {
            return false;
        }
        let mut i: u64 = 5;
        // i <= n / i avoids overflowing i * i near u64::MAX.
        while i <= n / i {
            if n % i == 0 || n % (i + 2) == 0 {
                return false;
            }
            i += 6;
        }
        true
    }
}
