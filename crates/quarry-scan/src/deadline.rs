//! Deadline watchdog for the join barrier.
//!
//! Individual critical sections are never timed. The whole coordinator runs
//! on a scoped thread and the caller waits for its result; when the deadline
//! passes first, the run's token is tripped so workers stop claiming, the
//! in-flight chunks drain, and the caller gets [`QuarryError::Timeout`].

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use quarry_core::{CancellationToken, QuarryError, Result};
use tracing::warn;

/// Run `job`, giving up after `timeout` if one is set.
///
/// Without a timeout `job` runs on the calling thread. On timeout `token` is
/// cancelled, so pass a token that belongs to this run alone
/// (see [`CancellationToken::child_token`]).
///
/// # Errors
///
/// Returns `job`'s own error, [`QuarryError::Timeout`] if the deadline
/// passed, or [`QuarryError::Thread`] if the coordinator thread died.
pub fn run_with_deadline<T, F>(
    timeout: Option<Duration>,
    token: &CancellationToken,
    job: F,
) -> Result<T>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    let Some(limit) = timeout else {
        return job();
    };

    let (tx, rx) = mpsc::channel();
    thread::scope(|s| {
        let handle = thread::Builder::new()
            .name("quarry-coordinator".into())
            .spawn_scoped(s, move || {
                // The receiver is gone only after a timeout; the result is moot then.
                let _ = tx.send(job());
            })?;

        let outcome = match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(?limit, "deadline passed, cancelling scan");
                token.cancel();
                Err(QuarryError::Timeout(limit))
            }
            Err(RecvTimeoutError::Disconnected) => Err(QuarryError::Thread(
                "coordinator exited without a result".into(),
            )),
        };

        if handle.join().is_err() {
            return Err(QuarryError::Thread("coordinator panicked".into()));
        }
        outcome
    })
}
