//! Batch report shape shared by the importer and the dispatcher

use serde::Serialize;

use super::record::ValidatedRecord;

/// Outcome report for one batch operation
///
/// Every input position appears exactly once across `succeeded`, `failed`
/// and `not_attempted`. Entries keep input order within each list.
/// `not_attempted` is only non-empty when the batch was cancelled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<S, F> {
    pub total: usize,
    pub succeeded: Vec<S>,
    pub failed: Vec<F>,
    pub not_attempted: Vec<usize>,
}

impl<S, F> BatchReport<S, F> {
    /// True if every item was attempted
    pub fn is_complete(&self) -> bool {
        self.not_attempted.is_empty()
    }

    /// Number of items that produced an outcome
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Why an item ended up in `failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Uniqueness constraint violated in the record store
    Conflict,
    /// Network, timeout or server error from the store or gateway
    Upstream,
    /// Lead identifier could not be resolved to a phone number
    Unresolved,
}

/// Record the store accepted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedRecord {
    /// Position in the submitted batch
    pub index: usize,
    /// Stored representation returned by the store (server-assigned fields included)
    pub record: serde_json::Value,
}

/// Record the store rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    pub index: usize,
    pub kind: FailureKind,
    pub reason: String,
    pub record: ValidatedRecord,
}

pub type ImportReport = BatchReport<ImportedRecord, ImportFailure>;
