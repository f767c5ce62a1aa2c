use std::path::PathBuf;

/// Errors raised by suite access and loading.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error("vector index {index} out of bounds for suite of size {len}")]
    VectorIndex { index: usize, len: usize },

    #[error("failed to read suite {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse suite {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration problems. Always raised before any implementation runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("threshold must be a number in [0, 1], got {0}")]
    Threshold(f64),

    #[error("worker count must be at least 1")]
    Workers,

    #[error("mutant id registered twice: {0}")]
    DuplicateMutant(String),

    #[error("unknown problem: {0}")]
    UnknownProblem(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteReason {
    Cancelled,
    DeadlineExceeded,
    /// The pool dropped the batch without reporting every evaluation.
    WorkerLost,
}

impl std::fmt::Display for IncompleteReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncompleteReason::Cancelled => f.write_str("cancelled"),
            IncompleteReason::DeadlineExceeded => f.write_str("deadline exceeded"),
            IncompleteReason::WorkerLost => f.write_str("worker lost"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// The run stopped before every evaluation finished. No verdict exists.
    #[error("judging run incomplete: {reason}")]
    Incomplete { reason: IncompleteReason },
}
