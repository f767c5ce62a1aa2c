use mutjudge::catalog;
use mutjudge::error::{IncompleteReason, JudgeError};
use mutjudge::mutants::{Implementation, Outcome};
use mutjudge::runner::{CancelToken, OracleRunner};
use mutjudge::suite::{TestVector, VectorSuite};
use std::thread;
use std::time::{Duration, Instant};

fn suite() -> VectorSuite {
    VectorSuite::new(vec![
        TestVector::new([1, 2, 3], 3),
        TestVector::new(Vec::new(), 0),
        TestVector::new([1, 1, 1, 1], 1),
    ])
}

// --- evaluation ---

#[test]
fn run_returns_one_result_per_vector_in_order() {
    let runner = OracleRunner::new(Some(4)).unwrap();
    let results = runner.run(&catalog::max_seq_reference(), &suite()).unwrap();

    assert_eq!(results.len(), 3);
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.vector_index, i);
        assert_eq!(r.implementation_id, "reference");
        assert!(r.passed);
    }
    assert_eq!(results[0].actual, Outcome::Returned(3));
}

#[test]
fn wrong_output_is_recorded_as_failed_vector() {
    let runner = OracleRunner::new(Some(2)).unwrap();
    let always_one = Implementation::submission(|_| 1);
    let results = runner.run(&always_one, &suite()).unwrap();

    let passed: Vec<_> = results.iter().map(|r| r.passed).collect();
    assert_eq!(passed, vec![false, false, true]);
    assert_eq!(results[1].actual, Outcome::Returned(1));
}

#[test]
fn panic_is_captured_and_later_vectors_still_run() {
    let runner = OracleRunner::new(Some(1)).unwrap();
    let first = Implementation::submission(|a| a[0] as u64);
    let results = runner.run(&first, &suite()).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].actual, Outcome::Returned(1));
    match &results[1].actual {
        Outcome::Failed { message } => assert!(message.contains("index out of bounds"), "{message}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!results[1].passed);
    assert_eq!(results[2].actual, Outcome::Returned(1));
    assert!(results[2].passed);
}

#[test]
fn explicit_panic_message_is_kept() {
    let runner = OracleRunner::new(Some(1)).unwrap();
    let boom = Implementation::submission(|_| panic!("boom {}", 7));
    let results = runner.run(&boom, &suite()).unwrap();
    assert!(results.iter().all(|r| r.actual == Outcome::Failed { message: "boom 7".into() }));
}

#[test]
fn each_call_gets_a_fresh_copy() {
    let runner = OracleRunner::new(Some(3)).unwrap();
    let vandal = Implementation::submission(|a| {
        let r = catalog::max_seq(a);
        a.iter_mut().for_each(|x| *x = 0);
        r
    });
    let suite = suite();
    let impls = [&vandal, &vandal];
    let rows = runner.run_many(&impls, &suite).unwrap();

    assert_eq!(rows[0], rows[1]);
    assert!(rows[0].iter().all(|r| r.passed));
    assert_eq!(suite.vector_at(0).unwrap().input, vec![1, 2, 3]);
}

#[test]
fn run_many_rows_follow_implementation_order() {
    let runner = OracleRunner::new(Some(4)).unwrap();
    let reference = catalog::max_seq_reference();
    let corpus = catalog::max_seq_corpus().unwrap();
    let mut impls = vec![&reference];
    impls.extend(corpus.iter());

    let rows = runner.run_many(&impls, &catalog::max_seq_hidden_suite()).unwrap();
    assert_eq!(rows.len(), 5);
    for (row, imp) in rows.iter().zip(&impls) {
        assert_eq!(row.len(), 9);
        assert!(row.iter().all(|r| r.implementation_id == imp.id()));
        let indices: Vec<_> = row.iter().map(|r| r.vector_index).collect();
        assert_eq!(indices, (0..9).collect::<Vec<_>>());
    }
}

#[test]
fn empty_suite_yields_empty_rows() {
    let runner = OracleRunner::new(None).unwrap();
    let rows = runner
        .run_many(&[&catalog::max_seq_reference()], &VectorSuite::empty())
        .unwrap();
    assert_eq!(rows, vec![vec![]]);
}

#[test]
fn worker_count_is_honoured() {
    let runner = OracleRunner::new(Some(3)).unwrap();
    assert_eq!(runner.workers(), 3);
}

// --- cancellation ---

#[test]
fn cancelled_before_start_is_incomplete() {
    let token = CancelToken::new();
    token.cancel();
    let runner = OracleRunner::new(Some(2)).unwrap().with_cancel(token);

    let err = runner.run(&catalog::max_seq_reference(), &suite()).unwrap_err();
    assert!(matches!(err, JudgeError::Incomplete { reason: IncompleteReason::Cancelled }));
}

#[test]
fn cancel_during_run_discards_results() {
    let token = CancelToken::new();
    let inner = token.clone();
    let canceller = Implementation::submission(move |a| {
        inner.cancel();
        catalog::max_seq(a)
    });
    let runner = OracleRunner::new(Some(1)).unwrap().with_cancel(token.clone());

    let err = runner.run(&canceller, &suite()).unwrap_err();
    assert!(matches!(err, JudgeError::Incomplete { reason: IncompleteReason::Cancelled }));
    assert!(token.is_cancelled());
}

#[test]
fn zero_timeout_is_deadline_exceeded() {
    let runner = OracleRunner::new(Some(2)).unwrap().with_timeout(Duration::ZERO);
    let err = runner.run(&catalog::max_seq_reference(), &suite()).unwrap_err();
    assert!(matches!(
        err,
        JudgeError::Incomplete { reason: IncompleteReason::DeadlineExceeded }
    ));
}

#[test]
fn generous_timeout_completes() {
    let runner = OracleRunner::new(Some(2)).unwrap().with_timeout(Duration::from_secs(60));
    assert_eq!(runner.run(&catalog::max_seq_reference(), &suite()).unwrap().len(), 3);
}

fn sleeper(delay: Duration) -> Implementation {
    Implementation::submission(move |a| {
        thread::sleep(delay);
        catalog::max_seq(a)
    })
}

#[test]
fn deadline_abandons_evaluation_in_flight() {
    let runner = OracleRunner::new(Some(2))
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let slow = sleeper(Duration::from_secs(3));
    let single = VectorSuite::new(vec![TestVector::new([1, 2, 3], 3)]);

    let start = Instant::now();
    let err = runner.run(&slow, &single).unwrap_err();
    let elapsed = start.elapsed();

    assert!(matches!(
        err,
        JudgeError::Incomplete { reason: IncompleteReason::DeadlineExceeded }
    ));
    assert!(elapsed < Duration::from_secs(2), "returned after {elapsed:?}");
}

#[test]
fn cancel_abandons_evaluation_in_flight() {
    let token = CancelToken::new();
    let runner = OracleRunner::new(Some(2)).unwrap().with_cancel(token.clone());
    let slow = sleeper(Duration::from_secs(3));

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        token.cancel();
    });
    let start = Instant::now();
    let err = runner.run(&slow, &suite()).unwrap_err();
    let elapsed = start.elapsed();
    canceller.join().unwrap();

    assert!(matches!(err, JudgeError::Incomplete { reason: IncompleteReason::Cancelled }));
    assert!(elapsed < Duration::from_secs(2), "returned after {elapsed:?}");
}

#[test]
fn run_finishing_after_deadline_is_incomplete() {
    // One worker, so the last evaluation starts before the deadline and ends after it.
    let runner = OracleRunner::new(Some(1))
        .unwrap()
        .with_timeout(Duration::from_millis(150));
    let slowish = sleeper(Duration::from_millis(100));
    let two = VectorSuite::new(vec![TestVector::new([1], 1), TestVector::new([2, 1], 1)]);

    let err = runner.run(&slowish, &two).unwrap_err();
    assert!(matches!(
        err,
        JudgeError::Incomplete { reason: IncompleteReason::DeadlineExceeded }
    ));
}

#[test]
fn slow_run_within_deadline_completes() {
    let runner = OracleRunner::new(Some(3))
        .unwrap()
        .with_timeout(Duration::from_secs(30));
    let results = runner.run(&sleeper(Duration::from_millis(30)), &suite()).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.passed));
}
