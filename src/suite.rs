use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SuiteError;

/// One (input, expected-output) pair of a function's contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestVector {
    pub input: Vec<i32>,
    pub expected: u64,
}

impl TestVector {
    pub fn new(input: impl Into<Vec<i32>>, expected: u64) -> Self {
        TestVector {
            input: input.into(),
            expected,
        }
    }
}

/// Ordered, immutable list of test vectors. Vectors are identified by
/// their ordinal. On disk this is a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorSuite {
    vectors: Vec<TestVector>,
}

impl VectorSuite {
    pub fn new(vectors: Vec<TestVector>) -> Self {
        VectorSuite { vectors }
    }

    pub fn empty() -> Self {
        VectorSuite::default()
    }

    pub fn size(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vector_at(&self, index: usize) -> Result<&TestVector, SuiteError> {
        self.vectors.get(index).ok_or(SuiteError::VectorIndex {
            index,
            len: self.vectors.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestVector> {
        self.vectors.iter()
    }

    pub fn as_slice(&self) -> &[TestVector] {
        &self.vectors
    }

    /// Keep only the first `len` vectors.
    pub fn truncated(&self, len: usize) -> VectorSuite {
        VectorSuite::new(self.vectors.iter().take(len).cloned().collect())
    }

    /// Pairs `(first, later)` of ordinals holding identical vectors.
    /// Duplicates never discriminate anything new; they are reported, not rejected.
    pub fn duplicates(&self) -> Vec<(usize, usize)> {
        let mut seen: std::collections::HashMap<&TestVector, usize> = std::collections::HashMap::new();
        let mut dups = Vec::new();
        for (i, v) in self.vectors.iter().enumerate() {
            match seen.get(v) {
                Some(&first) => dups.push((first, i)),
                None => {
                    seen.insert(v, i);
                }
            }
        }
        dups
    }

    pub fn from_json(data: &str, path: &Path) -> Result<VectorSuite, SuiteError> {
        serde_json::from_str(data).map_err(|source| SuiteError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<VectorSuite, SuiteError> {
        let data = std::fs::read_to_string(path).map_err(|source| SuiteError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        VectorSuite::from_json(&data, path)
    }
}

impl From<Vec<TestVector>> for VectorSuite {
    fn from(vectors: Vec<TestVector>) -> Self {
        VectorSuite::new(vectors)
    }
}
