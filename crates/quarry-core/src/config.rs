//! Scan configuration.
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::ScanConfig;
//!
//! let config = ScanConfig::default()
//!     .with_range(1, 20)
//!     .with_chunk_size(5)
//!     .with_workers(4);
//! config.validate().unwrap();
//! assert_eq!(config.num_chunks(), 4);
//! ```

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};

/// Environment variable overriding [`ScanConfig::start`].
pub const ENV_START: &str = "QUARRY_START";
/// Environment variable overriding [`ScanConfig::end`].
pub const ENV_END: &str = "QUARRY_END";
/// Environment variable overriding [`ScanConfig::chunk_size`].
pub const ENV_CHUNK_SIZE: &str = "QUARRY_CHUNK_SIZE";
/// Environment variable overriding [`ScanConfig::workers`].
pub const ENV_WORKERS: &str = "QUARRY_WORKERS";
/// Environment variable setting [`ScanConfig::timeout`] in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "QUARRY_TIMEOUT_MS";

/// Configuration for a single scan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Lower bound of the scanned interval (inclusive).
    pub start: i64,
    /// Upper bound of the scanned interval (inclusive). `start > end` scans nothing.
    pub end: i64,
    /// Maximum integers per chunk. Must be at least 1.
    pub chunk_size: u64,
    /// Number of worker threads. Must be at least 1.
    pub workers: usize,
    /// Deadline for the join barrier, if any.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start: 1,
            end: 200_000,
            chunk_size: 2_000,
            workers: available_workers(),
            timeout: None,
        }
    }
}

impl ScanConfig {
    /// Create a config for `[start, end]` with default chunking and workers.
    #[must_use]
    pub fn new(start: i64, end: i64) -> Self {
        Self::default().with_range(start, end)
    }

    /// Set the scanned interval.
    #[must_use]
    pub fn with_range(mut self, start: i64, end: i64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the join deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the config before any work starts.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::InvalidArgument`] for a zero chunk size, a zero
    /// worker count, or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(QuarryError::invalid("chunk_size must be >= 1"));
        }
        if self.workers == 0 {
            return Err(QuarryError::invalid("workers must be >= 1"));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(QuarryError::invalid("timeout must be > 0"));
        }
        Ok(())
    }

    /// Whether the interval contains no integers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of integers in the interval.
    #[must_use]
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (i128::from(self.end) - i128::from(self.start) + 1).min(i128::from(u64::MAX)) as u64
        }
    }

    /// Number of chunks the interval splits into. Zero if `chunk_size` is zero.
    ///
    /// Saturates at `u64::MAX`, like [`ScanConfig::len`].
    #[must_use]
    pub fn num_chunks(&self) -> u64 {
        if self.chunk_size == 0 || self.is_empty() {
            return 0;
        }
        let len = i128::from(self.end) - i128::from(self.start) + 1;
        let size = i128::from(self.chunk_size);
        ((len + size - 1) / size).min(i128::from(u64::MAX)) as u64
    }

    /// Load configuration from environment variables.
    ///
    /// Supported variables:
    /// - `QUARRY_START`, `QUARRY_END`: interval bounds
    /// - `QUARRY_CHUNK_SIZE`: integers per chunk
    /// - `QUARRY_WORKERS`: worker threads
    /// - `QUARRY_TIMEOUT_MS`: join deadline in milliseconds
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Config`] if a variable is set but unparsable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, starting from defaults.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Config`] if a present value is unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(start) = parse_var(&lookup, ENV_START)? {
            config.start = start;
        }
        if let Some(end) = parse_var(&lookup, ENV_END)? {
            config.end = end;
        }
        if let Some(chunk_size) = parse_var(&lookup, ENV_CHUNK_SIZE)? {
            config.chunk_size = chunk_size;
        }
        if let Some(workers) = parse_var(&lookup, ENV_WORKERS)? {
            config.workers = workers;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_TIMEOUT_MS)? {
            config.timeout = Some(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

/// Worker count matching the machine's available parallelism.
#[must_use]
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| QuarryError::Config(format!("{key}={raw:?}: {e}"))),
    }
}
