//! Positional outcome collection and the bounded worker pool
//!
//! Both batch operations run their per-item external call through
//! [`run_indexed`]: a stream of `(index, item)` drained with
//! `buffer_unordered(n)`, whose outcomes land in a [`ResultAggregator`] slot
//! addressed by the original index. Completion order never affects report
//! order.

use futures::stream::{self, StreamExt};
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::models::BatchReport;

/// Outcome of one batch item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome<S, F> {
    Succeeded(S),
    Failed(F),
}

/// Bookkeeping violation while recording outcomes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("Outcome index {index} out of range for batch of {total}")]
    OutOfRange { index: usize, total: usize },

    #[error("Outcome for index {index} recorded twice")]
    AlreadyRecorded { index: usize },
}

/// Pre-sized positional slots, one per batch item
#[derive(Debug)]
pub struct ResultAggregator<S, F> {
    slots: Vec<Option<ItemOutcome<S, F>>>,
    recorded: usize,
}

impl<S, F> ResultAggregator<S, F> {
    pub fn new(total: usize) -> Self {
        let mut slots = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        Self { slots, recorded: 0 }
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Write the outcome for `index` (each slot accepts exactly one write)
    pub fn record(&mut self, index: usize, outcome: ItemOutcome<S, F>) -> Result<(), AggregateError> {
        let total = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(AggregateError::OutOfRange { index, total })?;

        if slot.is_some() {
            return Err(AggregateError::AlreadyRecorded { index });
        }

        *slot = Some(outcome);
        self.recorded += 1;
        Ok(())
    }

    /// Distribute slots into the report, in input order
    ///
    /// Empty slots are items that were never attempted.
    pub fn finish(self) -> BatchReport<S, F> {
        let total = self.slots.len();
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut not_attempted = Vec::new();

        for (index, slot) in self.slots.into_iter().enumerate() {
            match slot {
                Some(ItemOutcome::Succeeded(s)) => succeeded.push(s),
                Some(ItemOutcome::Failed(f)) => failed.push(f),
                None => not_attempted.push(index),
            }
        }

        BatchReport {
            total,
            succeeded,
            failed,
            not_attempted,
        }
    }
}

/// Run `work` once per item with at most `concurrency` in flight
///
/// Items not yet started when `cancel` fires are left unrecorded and end up
/// in `not_attempted`. Work already in flight runs to completion.
pub async fn run_indexed<I, S, F, W, Fut>(
    items: Vec<I>,
    concurrency: usize,
    cancel: &CancellationToken,
    work: W,
) -> Result<BatchReport<S, F>, AggregateError>
where
    W: Fn(usize, I) -> Fut,
    Fut: Future<Output = ItemOutcome<S, F>>,
{
    let mut aggregator = ResultAggregator::new(items.len());

    let mut outcomes = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let cancel = cancel.clone();
            let pending = work(index, item);
            async move {
                if cancel.is_cancelled() {
                    return (index, None);
                }
                (index, Some(pending.await))
            }
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((index, outcome)) = outcomes.next().await {
        if let Some(outcome) = outcome {
            aggregator.record(index, outcome)?;
        }
    }

    Ok(aggregator.finish())
}
