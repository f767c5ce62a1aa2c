use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ConfigError, JudgeError};
use crate::matrix::KillMatrix;
use crate::mutants::{Implementation, KillRecord, MutantCorpus, RunResult};
use crate::runner::{CancelToken, OracleRunner};
use crate::suite::VectorSuite;

pub const DEFAULT_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgeConfig {
    /// Minimum adequacy for an acceptable run.
    pub threshold: f64,
    /// Worker pool size; `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Whole-run budget. Exceeding it yields an incomplete run.
    pub timeout: Option<Duration>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        JudgeConfig {
            threshold: DEFAULT_THRESHOLD,
            workers: None,
            timeout: None,
        }
    }
}

impl JudgeConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Workers);
        }
        Ok(())
    }
}

/// Why a completed run is or is not acceptable. An incomplete run has no
/// status at all; it surfaces as `JudgeError::Incomplete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Acceptable,
    /// The reference disagrees with the suite's expected outputs.
    ReferenceBroken,
    /// The reference passes but too few mutants were killed.
    Inadequate,
}

impl VerdictStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            VerdictStatus::Acceptable => 0,
            VerdictStatus::Inadequate => 1,
            VerdictStatus::ReferenceBroken => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub reference_all_pass: bool,
    pub reference_results: Vec<RunResult>,
    pub total_mutants: usize,
    pub killed_mutants: usize,
    pub adequacy: f64,
    /// Set when the corpus was empty and `adequacy` is 1.0 by convention only.
    pub empty_corpus: bool,
    pub per_mutant: Vec<KillRecord>,
    pub threshold: f64,
    pub acceptable: bool,
    pub status: VerdictStatus,
}

impl Verdict {
    fn assemble(matrix: KillMatrix, threshold: f64) -> Verdict {
        let reference_all_pass = matrix.reference.iter().all(|r| r.passed);
        let total_mutants = matrix.records.len();
        let killed_mutants = matrix.killed();
        let empty_corpus = total_mutants == 0;
        let adequacy = if empty_corpus {
            1.0
        } else {
            killed_mutants as f64 / total_mutants as f64
        };
        let status = if !reference_all_pass {
            VerdictStatus::ReferenceBroken
        } else if adequacy >= threshold {
            VerdictStatus::Acceptable
        } else {
            VerdictStatus::Inadequate
        };

        Verdict {
            reference_all_pass,
            reference_results: matrix.reference,
            total_mutants,
            killed_mutants,
            adequacy,
            empty_corpus,
            per_mutant: matrix.records,
            threshold,
            acceptable: status == VerdictStatus::Acceptable,
            status,
        }
    }

    /// floor(100 * killed / total); 100 for an empty corpus.
    pub fn score_percent(&self) -> u32 {
        if self.total_mutants == 0 {
            100
        } else {
            (self.killed_mutants * 100 / self.total_mutants) as u32
        }
    }

    pub fn survivors(&self) -> impl Iterator<Item = &KillRecord> {
        self.per_mutant.iter().filter(|r| !r.killed)
    }

    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionGrade {
    pub results: Vec<RunResult>,
    pub passed: usize,
    pub total: usize,
    pub score_percent: u32,
    pub accepted: bool,
}

pub struct Judge {
    config: JudgeConfig,
    cancel: CancelToken,
}

impl Judge {
    /// Rejects a malformed configuration before anything runs.
    pub fn new(config: JudgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Judge {
            config,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    fn runner(&self) -> Result<OracleRunner, JudgeError> {
        let mut runner = OracleRunner::new(self.config.workers)?.with_cancel(self.cancel.clone());
        if let Some(timeout) = self.config.timeout {
            runner = runner.with_timeout(timeout);
        }
        Ok(runner)
    }

    pub fn judge(
        &self,
        reference: &Implementation,
        corpus: &MutantCorpus,
        suite: &VectorSuite,
    ) -> Result<Verdict, JudgeError> {
        for (first, dup) in suite.duplicates() {
            warn!(first, duplicate = dup, "suite contains a duplicate vector");
        }
        if corpus.is_empty() {
            warn!("mutant corpus is empty; adequacy is vacuous");
        }

        let runner = self.runner()?;
        let matrix = KillMatrix::build(&runner, reference, corpus, suite)?;
        let verdict = Verdict::assemble(matrix, self.config.threshold);

        info!(
            vectors = suite.size(),
            killed = verdict.killed_mutants,
            total = verdict.total_mutants,
            adequacy = verdict.adequacy,
            status = ?verdict.status,
            workers = runner.workers(),
            "judged"
        );
        Ok(verdict)
    }

    /// Grade a submission against a suite by pass count.
    pub fn grade_submission(
        &self,
        submission: &Implementation,
        suite: &VectorSuite,
    ) -> Result<SubmissionGrade, JudgeError> {
        let runner = self.runner()?;
        let results = runner.run(submission, suite)?;
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let score_percent = if total == 0 { 0 } else { (passed * 100 / total) as u32 };

        info!(passed, total, score_percent, "graded submission");
        Ok(SubmissionGrade {
            results,
            passed,
            total,
            score_percent,
            accepted: total > 0 && passed == total,
        })
    }
}

/// Judge with the default configuration.
pub fn judge(
    reference: &Implementation,
    corpus: &MutantCorpus,
    suite: &VectorSuite,
) -> Result<Verdict, JudgeError> {
    Judge::new(JudgeConfig::default())?.judge(reference, corpus, suite)
}
