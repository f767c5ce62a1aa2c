use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{IncompleteReason, JudgeError};
use crate::mutants::{Implementation, Outcome, RunResult};
use crate::suite::{TestVector, VectorSuite};

/// Upper bound on how long the collector waits before rechecking the token.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Cancellation token plus optional deadline, shared by the collector and
/// every worker task of a run.
#[derive(Debug, Clone, Default)]
struct Budget {
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl Budget {
    fn check(&self) -> Result<(), IncompleteReason> {
        if self.cancel.is_cancelled() {
            return Err(IncompleteReason::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(IncompleteReason::DeadlineExceeded);
            }
        }
        Ok(())
    }

    fn wait(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()).min(POLL_INTERVAL),
            None => POLL_INTERVAL,
        }
    }
}

/// Executes implementations against a suite on a bounded worker pool.
/// One pool per judging run.
pub struct OracleRunner {
    pool: rayon::ThreadPool,
    budget: Budget,
}

impl OracleRunner {
    /// `workers = None` sizes the pool to the available parallelism.
    pub fn new(workers: Option<usize>) -> Result<Self, JudgeError> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("mutjudge-worker-{i}"));
        if let Some(n) = workers {
            builder = builder.num_threads(n);
        }
        Ok(OracleRunner {
            pool: builder.build()?,
            budget: Budget::default(),
        })
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.budget.cancel = token;
        self
    }

    /// The deadline starts counting now, not at the first `run`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.budget.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// One RunResult per vector, in suite order.
    pub fn run(&self, imp: &Implementation, suite: &VectorSuite) -> Result<Vec<RunResult>, JudgeError> {
        let mut rows = self.run_many(&[imp], suite)?;
        Ok(rows.pop().unwrap_or_default())
    }

    /// Evaluate every (implementation, vector) pair as one parallel batch.
    /// Row `i` of the result belongs to `impls[i]` and is in suite order,
    /// whatever order the workers finished in.
    ///
    /// The batch runs detached on the pool. Once the deadline passes or the
    /// token is cancelled the caller gets `Incomplete` straight away; workers
    /// still inside an evaluation finish it and their results are dropped.
    pub fn run_many(
        &self,
        impls: &[&Implementation],
        suite: &VectorSuite,
    ) -> Result<Vec<Vec<RunResult>>, JudgeError> {
        self.budget.check().map_err(|reason| JudgeError::Incomplete { reason })?;

        let owned: Arc<Vec<Implementation>> = Arc::new(impls.iter().map(|imp| (*imp).clone()).collect());
        let vectors: Arc<Vec<TestVector>> = Arc::new(suite.as_slice().to_vec());
        let tasks: Vec<(usize, usize)> = (0..owned.len())
            .flat_map(|i| (0..vectors.len()).map(move |v| (i, v)))
            .collect();
        let total = tasks.len();

        let (tx, rx) = mpsc::channel::<Result<(usize, usize, RunResult), IncompleteReason>>();
        if total > 0 {
            let budget = self.budget.clone();
            let vectors = Arc::clone(&vectors);
            self.pool.spawn(move || {
                tasks.into_par_iter().for_each_with(tx, |tx, (i, v)| {
                    let message = match budget.check() {
                        Ok(()) => Ok((i, v, evaluate_one(&owned[i], v, &vectors[v]))),
                        Err(reason) => Err(reason),
                    };
                    // Fails only when the collector has already given up.
                    let _ = tx.send(message);
                });
            });
        } else {
            drop(tx);
        }

        let mut collected: Vec<(usize, usize, RunResult)> = Vec::with_capacity(total);
        while collected.len() < total {
            let reason = match rx.recv_timeout(self.budget.wait()) {
                Ok(Ok(item)) => {
                    collected.push(item);
                    continue;
                }
                Ok(Err(reason)) => reason,
                Err(RecvTimeoutError::Timeout) => match self.budget.check() {
                    Ok(()) => continue,
                    Err(reason) => reason,
                },
                Err(RecvTimeoutError::Disconnected) => self.budget.check().err().unwrap_or(IncompleteReason::WorkerLost),
            };
            debug!(%reason, done = collected.len(), total, "run abandoned, discarding partial results");
            return Err(JudgeError::Incomplete { reason });
        }
        // A run whose last evaluation returned after the deadline is still late.
        self.budget.check().map_err(|reason| JudgeError::Incomplete { reason })?;

        collected.sort_by_key(|(i, v, _)| (*i, *v));

        let mut rows: Vec<Vec<RunResult>> = impls.iter().map(|_| Vec::with_capacity(vectors.len())).collect();
        for (i, _, result) in collected {
            rows[i].push(result);
        }
        for (imp, row) in impls.iter().zip(&rows) {
            debug!(
                implementation = imp.id(),
                passed = row.iter().filter(|r| r.passed).count(),
                total = row.len(),
                "evaluated"
            );
        }
        Ok(rows)
    }
}

fn evaluate_one(imp: &Implementation, index: usize, vector: &TestVector) -> RunResult {
    let actual = imp.evaluate(&vector.input);
    if let Outcome::Failed { message } = &actual {
        warn!(implementation = imp.id(), vector = index, %message, "execution failed");
    }
    let passed = actual.value() == Some(vector.expected);
    RunResult {
        implementation_id: imp.id().to_string(),
        vector_index: index,
        actual,
        passed,
    }
}
