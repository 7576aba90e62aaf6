//! Integration tests for quarry-scan.
//!
//! Exercises both strategies end to end through the public API.

use proptest::prelude::*;
use quarry_core::partition;
use quarry_scan::{
    duplicates, run_blackboard, run_pool, Blackboard, CancellationToken, IsPrime, Predicate,
    QuarryError, ScanConfig, Scanner, Strategy,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Reference answer computed on one thread.
fn sequential<P: Predicate>(start: i64, end: i64, predicate: &P) -> Vec<i64> {
    if start > end {
        return Vec::new();
    }
    (start..=end).filter(|&x| predicate.evaluate(x)).collect()
}

#[test]
fn test_primes_to_twenty_both_strategies() {
    let chunks = partition(1, 20, 5).unwrap();
    assert_eq!(chunks.len(), 4);

    let expected = vec![2, 3, 5, 7, 11, 13, 17, 19];
    assert_eq!(run_blackboard(1, 20, 5, 4, IsPrime).unwrap(), expected);
    assert_eq!(run_pool(1, 20, 5, 4, IsPrime).unwrap(), expected);

    let config = ScanConfig::new(1, 20).with_chunk_size(5).with_workers(4);
    let report = Scanner::new(config, IsPrime)
        .unwrap()
        .run(Strategy::Blackboard)
        .unwrap();
    assert_eq!(report.completed_chunks, 4);
}

#[test]
fn test_empty_interval_invokes_no_worker() {
    let calls = AtomicUsize::new(0);
    let counting = |x: i64| {
        calls.fetch_add(1, Ordering::Relaxed);
        IsPrime.evaluate(x)
    };

    assert!(partition(10, 9, 5).unwrap().is_empty());
    assert!(run_blackboard(10, 9, 5, 4, &counting).unwrap().is_empty());
    assert!(run_pool(10, 9, 5, 4, &counting).unwrap().is_empty());
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn test_zero_chunk_size_is_invalid() {
    assert!(matches!(
        run_blackboard(1, 20, 0, 4, IsPrime),
        Err(QuarryError::InvalidArgument(_))
    ));
    assert!(matches!(
        run_pool(1, 20, 0, 4, IsPrime),
        Err(QuarryError::InvalidArgument(_))
    ));
}

#[test]
fn test_zero_workers_is_invalid() {
    assert!(matches!(
        run_blackboard(1, 20, 5, 0, IsPrime),
        Err(QuarryError::InvalidArgument(_))
    ));
    assert!(matches!(
        run_pool(1, 20, 5, 0, IsPrime),
        Err(QuarryError::InvalidArgument(_))
    ));
}

#[test]
fn test_primes_to_two_hundred_thousand() {
    // Same range the reference programs scan.
    let expected = sequential(1, 200_000, &IsPrime);
    assert_eq!(expected.len(), 17_984);

    let board = run_blackboard(1, 200_000, 2_000, 8, IsPrime).unwrap();
    let pool = run_pool(1, 200_000, 10_000, 8, IsPrime).unwrap();
    assert_eq!(board, expected);
    assert_eq!(pool, expected);
}

#[test]
fn test_model_equivalence_across_worker_counts() {
    let expected = sequential(-500, 5_000, &IsPrime);
    for workers in [1, 2, 3, 8, 32] {
        for chunk_size in [1, 7, 64, 10_000] {
            let board = run_blackboard(-500, 5_000, chunk_size, workers, IsPrime).unwrap();
            let pool = run_pool(-500, 5_000, chunk_size, workers, IsPrime).unwrap();
            assert_eq!(board, expected, "blackboard workers={workers} chunk={chunk_size}");
            assert_eq!(pool, expected, "pool workers={workers} chunk={chunk_size}");
        }
    }
}

#[test]
fn test_exactly_once_evaluation() {
    for strategy in Strategy::ALL {
        let seen: Mutex<HashMap<i64, usize>> = Mutex::new(HashMap::new());
        let recording = |x: i64| {
            *seen.lock().unwrap().entry(x).or_insert(0) += 1;
            x % 10 == 3
        };
        let config = ScanConfig::new(0, 2_999).with_chunk_size(13).with_workers(6);
        let report = Scanner::new(config, recording).unwrap().run(strategy).unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 3_000, "{strategy}");
        assert!(seen.values().all(|&n| n == 1), "{strategy} evaluated an element twice");
        assert_eq!(report.count(), 300);
        assert!(duplicates(&report.matches).is_empty());
    }
}

#[test]
fn test_completed_counter_matches_chunk_count() {
    let chunks = partition(1, 10_000, 37).unwrap();
    let total = chunks.len();
    let outcome = Blackboard::new(chunks)
        .run(5, &IsPrime, &CancellationToken::new())
        .unwrap();
    assert_eq!(outcome.completed_chunks, total);
    assert_eq!(outcome.total_chunks, total);
    assert_eq!(
        outcome.workers.iter().map(|w| w.chunks_processed).sum::<usize>(),
        total
    );
}

#[test]
fn test_overlapping_chunks_are_detectable() {
    // Hand-built overlap: [1, 10] and [5, 15] share 5 and 7.
    let chunks = vec![
        quarry_scan::Chunk::new(1, 10),
        quarry_scan::Chunk::new(5, 15),
    ];
    let outcome = Blackboard::new(chunks)
        .run(2, &IsPrime, &CancellationToken::new())
        .unwrap();
    let merged = quarry_scan::merge_unordered(outcome.results);
    assert_eq!(duplicates(&merged), vec![5, 7]);
}

#[test]
fn test_worker_failure_propagates() {
    let faulty = |x: i64| {
        assert!(x != 1_234, "predicate fault");
        IsPrime.evaluate(x)
    };
    for strategy in Strategy::ALL {
        let config = ScanConfig::new(1, 5_000).with_chunk_size(100).with_workers(4);
        let err = Scanner::new(config, faulty).unwrap().run(strategy).unwrap_err();
        match err {
            QuarryError::WorkerFailure { chunk, message } => {
                assert!(chunk.contains(1_234), "{strategy}: wrong chunk {chunk}");
                assert_eq!(message, "predicate fault");
            }
            other => panic!("{strategy}: unexpected error {other}"),
        }
    }
}

#[test]
fn test_external_cancellation() {
    for strategy in Strategy::ALL {
        let token = CancellationToken::new();
        let trip = token.clone();
        let calls = AtomicUsize::new(0);
        let cancelling = |x: i64| {
            if calls.fetch_add(1, Ordering::Relaxed) == 50 {
                trip.cancel();
            }
            IsPrime.evaluate(x)
        };

        let config = ScanConfig::new(1, 100_000).with_chunk_size(10).with_workers(2);
        let scanner = Scanner::new(config, cancelling)
            .unwrap()
            .with_cancellation(token.clone());
        let err = scanner.run(strategy).unwrap_err();

        assert!(matches!(err, QuarryError::Cancelled), "{strategy}: {err}");
        assert!(calls.load(Ordering::Relaxed) < 100_000);
    }
}

#[test]
fn test_timeout_around_join_barrier() {
    let slow = |x: i64| {
        thread::sleep(Duration::from_millis(2));
        x % 2 == 0
    };
    for strategy in Strategy::ALL {
        let config = ScanConfig::new(1, 2_000)
            .with_chunk_size(10)
            .with_workers(2)
            .with_timeout(Duration::from_millis(50));
        let started = Instant::now();
        let err = Scanner::new(config, slow).unwrap().run(strategy).unwrap_err();

        assert!(
            matches!(err, QuarryError::Timeout(d) if d == Duration::from_millis(50)),
            "{strategy}: {err}"
        );
        // Workers drain their in-flight chunk and stop claiming.
        assert!(started.elapsed() < Duration::from_secs(2), "{strategy} did not stop");
    }
}

#[test]
fn test_scanner_reusable_after_timeout() {
    let slow = AtomicBool::new(true);
    let predicate = |x: i64| {
        if slow.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(2));
        }
        IsPrime.evaluate(x)
    };
    let external = CancellationToken::new();
    let config = ScanConfig::new(1, 2_000)
        .with_chunk_size(10)
        .with_workers(2)
        .with_timeout(Duration::from_millis(50));
    let scanner = Scanner::new(config, predicate)
        .unwrap()
        .with_cancellation(external.clone());

    for strategy in Strategy::ALL {
        slow.store(true, Ordering::Relaxed);
        let err = scanner.run(strategy).unwrap_err();
        assert!(matches!(err, QuarryError::Timeout(_)), "{strategy}: {err}");
        assert!(!external.is_cancelled(), "{strategy} tripped the caller's token");

        slow.store(false, Ordering::Relaxed);
        for next in Strategy::ALL {
            let report = scanner.run(next).unwrap();
            assert_eq!(report.count(), 303, "{next} after {strategy} timeout");
        }
    }
}

#[test]
fn test_external_cancel_still_reaches_runs() {
    let token = CancellationToken::new();
    let config = ScanConfig::new(1, 1_000).with_chunk_size(10).with_workers(2);
    let scanner = Scanner::new(config, IsPrime)
        .unwrap()
        .with_cancellation(token.clone());
    assert_eq!(scanner.run(Strategy::Pool).unwrap().count(), 168);

    token.cancel();
    for strategy in Strategy::ALL {
        let err = scanner.run(strategy).unwrap_err();
        assert!(matches!(err, QuarryError::Cancelled), "{strategy}: {err}");
    }
}

#[test]
fn test_blackboard_leaves_caller_token_alone() {
    let token = CancellationToken::new();
    let outcome = Blackboard::new(partition(1, 100, 10).unwrap())
        .run(3, &IsPrime, &token)
        .unwrap();
    assert_eq!(outcome.completed_chunks, 10);
    assert!(!token.is_cancelled());
}

#[test]
fn test_generous_timeout_completes() {
    let config = ScanConfig::new(1, 1_000)
        .with_chunk_size(50)
        .with_workers(2)
        .with_timeout(Duration::from_secs(30));
    let scanner = Scanner::new(config, IsPrime).unwrap();
    for strategy in Strategy::ALL {
        assert_eq!(scanner.run(strategy).unwrap().count(), 168);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn strategies_agree_with_sequential(
        start in -300i64..300,
        len in 0i64..600,
        chunk_size in 1u64..80,
        workers in 1usize..6,
    ) {
        let end = start + len - 1;
        let expected = sequential(start, end, &IsPrime);
        let board = run_blackboard(start, end, chunk_size, workers, IsPrime).unwrap();
        let pool = run_pool(start, end, chunk_size, workers, IsPrime).unwrap();
        prop_assert_eq!(board, expected.clone());
        prop_assert_eq!(pool, expected);
    }
}
