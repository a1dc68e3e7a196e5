//! Query and bulk-operation results

use serde::{Deserialize, Serialize};

use super::hash_functions::HashAlgorithm;

/// What a single hash function observed for an element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashProbe {
    pub algorithm: HashAlgorithm,
    /// Cell index selected by the salted digest
    pub index: usize,
    /// Area label stored in that cell (0 = empty)
    pub area: u16,
}

/// Per-hash probes of a membership check, in hash-family order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    probes: Vec<HashProbe>,
}

impl CheckResult {
    pub(crate) fn new(probes: Vec<HashProbe>) -> Self {
        Self { probes }
    }

    pub fn probes(&self) -> &[HashProbe] {
        &self.probes
    }

    /// The area the element belongs to, or 0 when it is not a member
    ///
    /// This is the minimum label across all probes: any empty cell rules
    /// membership out, and overwrites by broader areas only ever raise the
    /// labels of a member's cells.
    pub fn area(&self) -> u16 {
        self.probes.iter().map(|p| p.area).min().unwrap_or(0)
    }

    pub fn is_member(&self) -> bool {
        self.area() != 0
    }

    /// Cell indices touched by the query
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.probes.iter().map(|p| p.index)
    }
}

/// Outcome of a bulk insert
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InsertSummary {
    /// Records inserted
    pub inserted: usize,
    /// Records whose area was lower than the previous record's
    pub out_of_order: usize,
}

/// A paired check whose result differed from the expected area
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub line: usize,
    pub element: String,
    pub expected: u16,
    pub found: u16,
}

/// Outcome of a bulk check
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckSummary {
    /// Element-only source: `histogram[a]` counts elements reported in area `a`
    Membership { histogram: Vec<u64> },
    /// Paired source: counts indexed by expected area
    Verification {
        correct: Vec<u64>,
        incorrect: Vec<u64>,
        mismatches: Vec<Mismatch>,
    },
}

impl CheckSummary {
    /// Total number of records checked
    pub fn total(&self) -> u64 {
        match self {
            CheckSummary::Membership { histogram } => histogram.iter().sum(),
            CheckSummary::Verification {
                correct, incorrect, ..
            } => correct.iter().chain(incorrect).sum(),
        }
    }
}
