//! Batch import of spreadsheet rows into the record store
//!
//! Two phases with different failure semantics:
//! 1. **Validate everything.** One invalid row rejects the whole batch before
//!    any write happens.
//! 2. **Write each record once.** Conflicts and store errors are recorded
//!    against that record only; the remaining records are still written and
//!    nothing already created is rolled back.

use cdl_common::config::PipelineSettings;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::record_store::{CreateOutcome, RecordStore};
use super::result_aggregator::{run_indexed, AggregateError, ItemOutcome};
use super::row_validator::validate_rows;
use crate::models::{
    FailureKind, FieldSchema, ImportFailure, ImportReport, ImportedRecord, RawRow, RowOutcome,
    ValidatedRecord,
};

/// Row rejected during validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidRow {
    /// 0-based position in the batch
    pub index: usize,
    pub reasons: Vec<String>,
}

impl InvalidRow {
    /// 1-based data row number, as operators count spreadsheet rows
    pub fn row_number(&self) -> usize {
        self.index + 1
    }
}

/// Every invalid row of a rejected batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub invalid_rows: Vec<InvalidRow>,
    /// Rows that would have been imported
    pub valid_rows: usize,
    pub total_rows: usize,
}

impl ValidationFailure {
    /// One "Row N: reason" line per reason, in row order
    pub fn messages(&self) -> Vec<String> {
        self.invalid_rows
            .iter()
            .flat_map(|row| {
                row.reasons
                    .iter()
                    .map(move |reason| format!("Row {}: {}", row.row_number(), reason))
            })
            .collect()
    }
}

/// Batch import failure
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Validation errors found in {} of {} rows", .0.invalid_rows.len(), .0.total_rows)]
    Validation(ValidationFailure),

    #[error("No rows to import")]
    EmptyBatch,

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Imports validated rows through a [`RecordStore`]
#[derive(Debug, Clone)]
pub struct BatchImporter {
    settings: PipelineSettings,
}

impl BatchImporter {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    /// Validate all rows, returning the records only if every row passed
    pub fn validate_batch(rows: &[RawRow], schema: &FieldSchema) -> Result<Vec<ValidatedRecord>, ImportError> {
        let mut records = Vec::with_capacity(rows.len());
        let mut invalid_rows = Vec::new();

        for outcome in validate_rows(rows, schema) {
            match outcome {
                RowOutcome::Valid(record) => records.push(record),
                RowOutcome::Invalid { index, reasons } => invalid_rows.push(InvalidRow { index, reasons }),
            }
        }

        if !invalid_rows.is_empty() {
            return Err(ImportError::Validation(ValidationFailure {
                invalid_rows,
                valid_rows: records.len(),
                total_rows: rows.len(),
            }));
        }

        if records.is_empty() {
            return Err(ImportError::EmptyBatch);
        }

        Ok(records)
    }

    /// Validate `rows` against `schema`, then create each record in `store`
    pub async fn import_batch(
        &self,
        rows: &[RawRow],
        schema: &FieldSchema,
        store: &dyn RecordStore,
        cancel: &CancellationToken,
    ) -> Result<ImportReport, ImportError> {
        let records = Self::validate_batch(rows, schema)?;
        let timeout = self.settings.call_timeout();

        let report = run_indexed(records, self.settings.concurrency(), cancel, |index, record| async move {
            let outcome = match tokio::time::timeout(timeout, store.create(&record)).await {
                Ok(outcome) => outcome,
                Err(_) => CreateOutcome::StoreError(format!(
                    "Request timed out after {}s",
                    timeout.as_secs()
                )),
            };
            classify(index, record, outcome)
        })
        .await?;

        Ok(report)
    }
}

fn classify(
    index: usize,
    record: ValidatedRecord,
    outcome: CreateOutcome,
) -> ItemOutcome<ImportedRecord, ImportFailure> {
    match outcome {
        CreateOutcome::Created(stored) => ItemOutcome::Succeeded(ImportedRecord { index, record: stored }),
        CreateOutcome::Conflict(reason) => ItemOutcome::Failed(ImportFailure {
            index,
            kind: FailureKind::Conflict,
            reason,
            record,
        }),
        CreateOutcome::StoreError(reason) => ItemOutcome::Failed(ImportFailure {
            index,
            kind: FailureKind::Upstream,
            reason,
            record,
        }),
    }
}
