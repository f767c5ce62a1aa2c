pub mod catalog;
pub mod error;
pub mod judge;
pub mod matrix;
pub mod mutants;
pub mod output;
pub mod probe;
pub mod runner;
pub mod state;
pub mod suite;

use crate::error::ConfigError;
use crate::mutants::{Implementation, MutantCorpus};
use crate::suite::VectorSuite;

/// Exercises with a built-in reference, mutant corpus and hidden suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    MaxSeq,
}

pub const PROBLEMS: [Problem; 1] = [Problem::MaxSeq];

pub fn lookup_problem(id: &str) -> Result<Problem, ConfigError> {
    match id {
        "max-seq" | "maxSeq" | "subseq" => Ok(Problem::MaxSeq),
        _ => Err(ConfigError::UnknownProblem(id.to_string())),
    }
}

impl Problem {
    pub fn id(self) -> &'static str {
        match self {
            Problem::MaxSeq => "max-seq",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Problem::MaxSeq => "length of the longest strictly increasing contiguous run",
        }
    }

    pub fn reference(self) -> Implementation {
        match self {
            Problem::MaxSeq => catalog::max_seq_reference(),
        }
    }

    pub fn corpus(self) -> Result<MutantCorpus, ConfigError> {
        match self {
            Problem::MaxSeq => catalog::max_seq_corpus(),
        }
    }

    pub fn hidden_suite(self) -> VectorSuite {
        match self {
            Problem::MaxSeq => catalog::max_seq_hidden_suite(),
        }
    }
}
