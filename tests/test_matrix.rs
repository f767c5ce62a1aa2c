use mutjudge::catalog;
use mutjudge::matrix::{self, KillMatrix};
use mutjudge::mutants::{MutantCorpus, Outcome, RunResult};
use mutjudge::runner::OracleRunner;
use mutjudge::suite::{TestVector, VectorSuite};

fn result(index: usize, actual: Outcome) -> RunResult {
    RunResult {
        implementation_id: "x".into(),
        vector_index: index,
        passed: false,
        actual,
    }
}

fn returned(values: &[u64]) -> Vec<RunResult> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| result(i, Outcome::Returned(*v)))
        .collect()
}

// --- first_divergence ---

#[test]
fn identical_rows_do_not_diverge() {
    assert_eq!(matrix::first_divergence(&returned(&[1, 2, 3]), &returned(&[1, 2, 3])), None);
}

#[test]
fn divergence_at_zero_and_two_reports_zero() {
    assert_eq!(matrix::first_divergence(&returned(&[1, 2, 3]), &returned(&[9, 2, 9])), Some(0));
}

#[test]
fn divergence_reports_lowest_index() {
    assert_eq!(matrix::first_divergence(&returned(&[1, 2, 3, 4]), &returned(&[1, 2, 0, 0])), Some(2));
}

#[test]
fn failure_against_value_diverges() {
    let reference = returned(&[1, 0]);
    let mutant = vec![
        result(0, Outcome::Returned(1)),
        result(1, Outcome::Failed { message: "boom".into() }),
    ];
    assert_eq!(matrix::first_divergence(&reference, &mutant), Some(1));
}

#[test]
fn failure_against_failure_does_not_diverge() {
    let reference = vec![result(0, Outcome::Failed { message: "a".into() })];
    let mutant = vec![result(0, Outcome::Failed { message: "b".into() })];
    assert_eq!(matrix::first_divergence(&reference, &mutant), None);
}

#[test]
fn empty_rows_never_diverge() {
    assert_eq!(matrix::first_divergence(&[], &[]), None);
}

// --- build ---

#[test]
fn hidden_suite_kills_every_known_mutant() {
    let runner = OracleRunner::new(Some(4)).unwrap();
    let corpus = catalog::max_seq_corpus().unwrap();
    let m = KillMatrix::build(
        &runner,
        &catalog::max_seq_reference(),
        &corpus,
        &catalog::max_seq_hidden_suite(),
    )
    .unwrap();

    assert_eq!(m.reference.len(), 9);
    assert_eq!(m.killed(), 4);
    let ids: Vec<_> = m.records.iter().map(|r| r.mutant_id.as_str()).collect();
    assert_eq!(ids, vec!["mutant1", "mutant2", "mutant3", "mutant4"]);
    let killers: Vec<_> = m.records.iter().map(|r| r.killing_vector_index).collect();
    assert_eq!(killers, vec![Some(6), Some(2), Some(3), Some(0)]);
}

#[test]
fn compares_against_actual_reference_output_not_expected() {
    // Expected values are all wrong; the matrix must not care.
    let suite = VectorSuite::new(vec![
        TestVector::new([3, 2, 1], 7),
        TestVector::new([1, 2, 3], 7),
    ]);
    let runner = OracleRunner::new(Some(2)).unwrap();
    let corpus = catalog::max_seq_corpus().unwrap();
    let m = KillMatrix::build(&runner, &catalog::max_seq_reference(), &corpus, &suite).unwrap();

    assert!(m.reference.iter().all(|r| !r.passed));
    let short_loop = &m.records[3];
    assert!(short_loop.killed);
    assert_eq!(short_loop.killing_vector_index, Some(1));
    assert!(!m.records[0].killed);
}

#[test]
fn records_carry_descriptions() {
    let mut corpus = MutantCorpus::new();
    corpus.register("constant", "always returns zero", |_| 0).unwrap();
    let runner = OracleRunner::new(Some(1)).unwrap();
    let suite = VectorSuite::new(vec![TestVector::new([5], 1)]);
    let m = KillMatrix::build(&runner, &catalog::max_seq_reference(), &corpus, &suite).unwrap();

    assert_eq!(m.records[0].mutant_id, "constant");
    assert_eq!(m.records[0].description, "always returns zero");
    assert_eq!(m.records[0].killing_vector_index, Some(0));
}

#[test]
fn empty_corpus_gives_no_records() {
    let runner = OracleRunner::new(Some(1)).unwrap();
    let m = KillMatrix::build(
        &runner,
        &catalog::max_seq_reference(),
        &MutantCorpus::new(),
        &catalog::max_seq_hidden_suite(),
    )
    .unwrap();
    assert!(m.records.is_empty());
    assert_eq!(m.reference.len(), 9);
}
