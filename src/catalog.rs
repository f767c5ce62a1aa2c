//! Built-in fixtures for the `max-seq` exercise: length of the longest
//! strictly increasing contiguous run.

use crate::error::ConfigError;
use crate::mutants::{Implementation, MutantCorpus};
use crate::suite::{TestVector, VectorSuite};

pub struct KnownMutant {
    pub operator_name: &'static str,
    pub description: &'static str,
    pub func: fn(&mut [i32]) -> u64,
}

pub fn max_seq(array: &mut [i32]) -> u64 {
    if array.is_empty() {
        return 0;
    }
    let mut best = 1;
    let mut current = 1;
    for i in 1..array.len() {
        if array[i] > array[i - 1] {
            current += 1;
        } else {
            current = 1;
        }
        if current > best {
            best = current;
        }
    }
    best
}

/// Equal neighbours extend the run.
fn max_seq_boundary(array: &mut [i32]) -> u64 {
    if array.is_empty() {
        return 0;
    }
    let mut best = 1;
    let mut current = 1;
    for i in 1..array.len() {
        if array[i] >= array[i - 1] {
            current += 1;
        } else {
            current = 1;
        }
        if current > best {
            best = current;
        }
    }
    best
}

/// Best-so-far tracks the latest run, so this returns the final run's length.
fn max_seq_overwrite(array: &mut [i32]) -> u64 {
    if array.is_empty() {
        return 0;
    }
    let mut best = 1;
    let mut current = 1;
    for i in 1..array.len() {
        if array[i] > array[i - 1] {
            current += 1;
        } else {
            current = 1;
        }
        best = current;
    }
    best
}

fn max_seq_zero_start(array: &mut [i32]) -> u64 {
    if array.is_empty() {
        return 0;
    }
    let mut best = 0;
    let mut current = 1;
    for i in 1..array.len() {
        if array[i] > array[i - 1] {
            current += 1;
        } else {
            current = 1;
        }
        if current > best {
            best = current;
        }
    }
    best
}

/// Stops one element early; the last element never joins a run.
fn max_seq_short_loop(array: &mut [i32]) -> u64 {
    if array.is_empty() {
        return 0;
    }
    let n = array.len();
    let mut best = 1;
    let mut current = 1;
    for i in 1..n - 1 {
        if array[i] > array[i - 1] {
            current += 1;
        } else {
            current = 1;
        }
        if current > best {
            best = current;
        }
    }
    best
}

pub const MAX_SEQ_MUTANTS: [KnownMutant; 4] = [
    KnownMutant {
        operator_name: "boundary",
        description: ">= instead of > (equal elements extend the run)",
        func: max_seq_boundary,
    },
    KnownMutant {
        operator_name: "max_overwrite",
        description: "best length overwritten every step instead of only when larger",
        func: max_seq_overwrite,
    },
    KnownMutant {
        operator_name: "zero_start",
        description: "best length starts at 0 (single element yields 0)",
        func: max_seq_zero_start,
    },
    KnownMutant {
        operator_name: "short_loop",
        description: "loop bound n-1 instead of n (last element ignored)",
        func: max_seq_short_loop,
    },
];

pub fn max_seq_reference() -> Implementation {
    Implementation::reference(max_seq)
}

/// Known mutants registered as `mutant1..mutant4`, in catalog order.
pub fn max_seq_corpus() -> Result<MutantCorpus, ConfigError> {
    let mut corpus = MutantCorpus::new();
    for known in &MAX_SEQ_MUTANTS {
        corpus.push(known.description, known.func)?;
    }
    Ok(corpus)
}

pub fn max_seq_hidden_suite() -> VectorSuite {
    VectorSuite::new(vec![
        TestVector::new([1, 2, 3, 4, 5], 5),
        TestVector::new([5, 4, 3, 2, 1], 1),
        TestVector::new([1, 2, 1, 2, 1], 2),
        TestVector::new([1], 1),
        TestVector::new(Vec::new(), 0),
        TestVector::new([1, 2, 3, 1, 2, 3, 4, 5], 5),
        TestVector::new([1, 1, 1, 1], 1),
        TestVector::new([-5, -4, -3, -2, -1], 5),
        TestVector::new([1, 3, 5, 4, 7], 3),
    ])
}
