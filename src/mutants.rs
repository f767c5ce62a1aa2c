use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use tracing::debug;

use crate::error::ConfigError;

/// The contract every implementation under test satisfies. The slice is a
/// private copy of the vector's input and carries its length.
pub type ContractFn = Arc<dyn Fn(&mut [i32]) -> u64 + Send + Sync>;

/// An implementation under test. Closed set: the oracle, a known-buggy
/// mutant, or a student submission.
#[derive(Clone)]
pub enum Implementation {
    Reference(ContractFn),
    Mutant {
        id: String,
        description: String,
        func: ContractFn,
    },
    Submission(ContractFn),
}

impl Implementation {
    pub fn reference(f: impl Fn(&mut [i32]) -> u64 + Send + Sync + 'static) -> Self {
        Implementation::Reference(Arc::new(f))
    }

    pub fn mutant(
        id: impl Into<String>,
        description: impl Into<String>,
        f: impl Fn(&mut [i32]) -> u64 + Send + Sync + 'static,
    ) -> Self {
        Implementation::Mutant {
            id: id.into(),
            description: description.into(),
            func: Arc::new(f),
        }
    }

    pub fn submission(f: impl Fn(&mut [i32]) -> u64 + Send + Sync + 'static) -> Self {
        Implementation::Submission(Arc::new(f))
    }

    pub fn id(&self) -> &str {
        match self {
            Implementation::Reference(_) => "reference",
            Implementation::Mutant { id, .. } => id,
            Implementation::Submission(_) => "submission",
        }
    }

    /// Defect description; empty for anything but a mutant.
    pub fn description(&self) -> &str {
        match self {
            Implementation::Mutant { description, .. } => description,
            _ => "",
        }
    }

    fn func(&self) -> &ContractFn {
        match self {
            Implementation::Reference(f) | Implementation::Submission(f) => f,
            Implementation::Mutant { func, .. } => func,
        }
    }

    /// Evaluate on a fresh copy of `input`. A panic is captured as
    /// `Outcome::Failed` instead of unwinding into the caller.
    pub fn evaluate(&self, input: &[i32]) -> Outcome {
        let mut scratch = input.to_vec();
        let func = self.func();
        let was_capturing = CAPTURING.replace(true);
        let caught = panic::catch_unwind(AssertUnwindSafe(|| func(scratch.as_mut_slice())));
        CAPTURING.set(was_capturing);
        match caught {
            Ok(value) => Outcome::Returned(value),
            Err(payload) => Outcome::Failed {
                message: panic_message(payload.as_ref()),
            },
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("id", &self.id())
            .field("description", &self.description())
            .finish_non_exhaustive()
    }
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
}

static PANIC_HOOK: Once = Once::new();

/// Install a panic hook that logs panics raised inside `evaluate` at debug
/// level instead of printing the default report. Any other panic goes to the
/// previously installed hook. Safe to call more than once.
pub fn silence_captured_panics() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.get() {
                debug!(panic = %info, "implementation panicked");
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "implementation panicked".to_string()
    }
}

/// Mutants in registration order. Ids are unique within a corpus.
#[derive(Debug, Clone, Default)]
pub struct MutantCorpus {
    mutants: Vec<Implementation>,
}

impl MutantCorpus {
    pub fn new() -> Self {
        MutantCorpus::default()
    }

    pub fn register(
        &mut self,
        id: impl Into<String>,
        description: impl Into<String>,
        f: impl Fn(&mut [i32]) -> u64 + Send + Sync + 'static,
    ) -> Result<&mut Self, ConfigError> {
        let id = id.into();
        if self.mutants.iter().any(|m| m.id() == id) {
            return Err(ConfigError::DuplicateMutant(id));
        }
        self.mutants.push(Implementation::mutant(id, description, f));
        Ok(self)
    }

    /// Register under the next free `mutantN` id (1-based).
    pub fn push(
        &mut self,
        description: impl Into<String>,
        f: impl Fn(&mut [i32]) -> u64 + Send + Sync + 'static,
    ) -> Result<&mut Self, ConfigError> {
        let id = format!("mutant{}", self.mutants.len() + 1);
        self.register(id, description, f)
    }

    pub fn len(&self) -> usize {
        self.mutants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Implementation> {
        self.mutants.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Implementation> {
        self.mutants.iter().find(|m| m.id() == id)
    }
}

/// What an implementation produced for one vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Returned(u64),
    /// Sentinel for "execution failed"; never equal to any expected value.
    Failed { message: String },
}

impl Outcome {
    pub fn value(&self) -> Option<u64> {
        match self {
            Outcome::Returned(v) => Some(*v),
            Outcome::Failed { .. } => None,
        }
    }

    /// Two failures are indistinguishable from the outside; a failure never
    /// matches a returned value.
    pub fn same_as(&self, other: &Outcome) -> bool {
        match (self, other) {
            (Outcome::Returned(a), Outcome::Returned(b)) => a == b,
            (Outcome::Failed { .. }, Outcome::Failed { .. }) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Returned(v) => write!(f, "{v}"),
            Outcome::Failed { message } => write!(f, "execution failed ({message})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub implementation_id: String,
    pub vector_index: usize,
    pub actual: Outcome,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillRecord {
    pub mutant_id: String,
    pub description: String,
    pub killed: bool,
    /// Lowest vector ordinal where the mutant diverged from the reference.
    pub killing_vector_index: Option<usize>,
}
