use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::JudgeError;
use crate::mutants::{Implementation, KillRecord, MutantCorpus, RunResult};
use crate::runner::OracleRunner;
use crate::suite::VectorSuite;

/// Reference results plus one kill record per mutant, in corpus order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillMatrix {
    pub reference: Vec<RunResult>,
    pub records: Vec<KillRecord>,
}

impl KillMatrix {
    /// Runs the reference and every mutant as a single batch, then scans.
    /// Mutants are compared with what the reference actually returned, not
    /// with the expected values.
    pub fn build(
        runner: &OracleRunner,
        reference: &Implementation,
        corpus: &MutantCorpus,
        suite: &VectorSuite,
    ) -> Result<KillMatrix, JudgeError> {
        let mut impls: Vec<&Implementation> = Vec::with_capacity(corpus.len() + 1);
        impls.push(reference);
        impls.extend(corpus.iter());

        let mut rows = runner.run_many(&impls, suite)?.into_iter();
        let reference_results = rows.next().unwrap_or_default();
        let records = corpus
            .iter()
            .zip(rows)
            .map(|(mutant, row)| kill_record(mutant, &reference_results, &row))
            .collect();

        Ok(KillMatrix {
            reference: reference_results,
            records,
        })
    }

    pub fn killed(&self) -> usize {
        self.records.iter().filter(|r| r.killed).count()
    }
}

/// First ordinal at which the two result rows disagree. Rows must already be
/// in suite order.
pub fn first_divergence(reference: &[RunResult], mutant: &[RunResult]) -> Option<usize> {
    reference
        .iter()
        .zip(mutant)
        .find(|(r, m)| !r.actual.same_as(&m.actual))
        .map(|(r, _)| r.vector_index)
}

pub fn kill_record(mutant: &Implementation, reference: &[RunResult], row: &[RunResult]) -> KillRecord {
    let killing_vector_index = first_divergence(reference, row);
    debug!(mutant = mutant.id(), killed = killing_vector_index.is_some(), ?killing_vector_index, "kill scan");
    KillRecord {
        mutant_id: mutant.id().to_string(),
        description: mutant.description().to_string(),
        killed: killing_vector_index.is_some(),
        killing_vector_index,
    }
}
