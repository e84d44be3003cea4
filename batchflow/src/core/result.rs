//! Whole-batch results.

use super::{ExecutionStrategy, OutcomeRecord, WorkItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// The result of one batch invocation.
///
/// Records are index-aligned with the input items: `records()[i]` always
/// belongs to the `i`-th input item, whichever strategy produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    run_id: Uuid,
    strategy: ExecutionStrategy,
    started_at: DateTime<Utc>,
    elapsed: Duration,
    records: Vec<OutcomeRecord>,
}

impl BatchResult {
    /// Creates a batch result.
    #[must_use]
    pub fn new(
        run_id: Uuid,
        strategy: ExecutionStrategy,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        records: Vec<OutcomeRecord>,
    ) -> Self {
        Self {
            run_id,
            strategy,
            started_at,
            elapsed,
            records,
        }
    }

    /// Returns the run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the strategy that produced this result.
    #[must_use]
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Returns when the batch started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the wall-clock duration of the whole batch.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Returns the records in input order.
    #[must_use]
    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    /// Returns the record for the `index`-th input item.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&OutcomeRecord> {
        self.records.get(index)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of successful items.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    /// Returns the number of failed items.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failure()).count()
    }

    /// Returns true if every item succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.records.iter().all(OutcomeRecord::is_success)
    }

    /// Returns the success flag of every record, in input order.
    #[must_use]
    pub fn success_flags(&self) -> Vec<bool> {
        self.records.iter().map(OutcomeRecord::is_success).collect()
    }

    /// Returns the items in input order.
    #[must_use]
    pub fn items(&self) -> Vec<&WorkItem> {
        self.records.iter().map(OutcomeRecord::item).collect()
    }

    /// Returns the failed items in input order.
    ///
    /// The runner never retries; callers that want to can re-run this subset.
    #[must_use]
    pub fn failed_items(&self) -> Vec<WorkItem> {
        self.records
            .iter()
            .filter(|r| r.is_failure())
            .map(|r| r.item().clone())
            .collect()
    }

    /// Returns the failed records in input order.
    pub fn failures(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter().filter(|r| r.is_failure())
    }
}
