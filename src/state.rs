use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::judge::Verdict;
use crate::mutants::KillRecord;
use crate::probe::SurvivorHint;

/// What the CLI remembers between invocations. The judge itself never persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastRun {
    pub problem: String,
    /// `None` when the hidden suite was judged.
    pub suite_file: Option<String>,
    pub verdict: Verdict,
    pub hints: Vec<SurvivorHint>,
    pub duration_ms: u64,
}

impl LastRun {
    /// Look up a mutant by `@mutant2`, `mutant2`, `@m2` or `m2`.
    pub fn find_mutant(&self, mutant_ref: &str) -> Option<&KillRecord> {
        let id = mutant_ref.trim_start_matches('@');
        let id = match id.strip_prefix('m') {
            Some(rest) if rest.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty() => {
                format!("mutant{rest}")
            }
            _ => id.to_string(),
        };
        self.verdict.per_mutant.iter().find(|r| r.mutant_id == id)
    }

    pub fn hint_for(&self, mutant_id: &str) -> Option<&SurvivorHint> {
        self.hints.iter().find(|h| h.mutant_id == mutant_id)
    }
}

fn state_path() -> PathBuf {
    let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    dir.join(".mutjudge-state.json")
}

pub fn save_last_run(run: &LastRun) {
    save_to_path(run, &state_path());
}

pub fn load_last_run() -> Option<LastRun> {
    load_from_path(&state_path())
}

pub fn save_to_path(run: &LastRun, path: &std::path::Path) {
    match serde_json::to_string(run) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                tracing::warn!(path = %path.display(), error = %e, "could not save last run");
            }
        }
        Err(e) => tracing::warn!(error = %e, "could not serialize last run"),
    }
}

pub fn load_from_path(path: &std::path::Path) -> Option<LastRun> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}
