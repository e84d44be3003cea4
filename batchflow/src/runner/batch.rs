//! The batch runner.
//!
//! Drives a [`StageChain`] once per work item under the sequential or the
//! parallel strategy and gathers one [`OutcomeRecord`] per item, in input
//! order, into a [`BatchResult`].

use super::report::{RunReport, StrategyComparison};
use crate::config::BatchConfig;
use crate::core::{BatchResult, ExecutionStrategy, OutcomeRecord, WorkItem};
use crate::errors::{BatchError, StageFailure};
use crate::events::{EventSink, NoOpEventSink, BATCH_COMPLETED, BATCH_STARTED, ITEM_COMPLETED, ITEM_FAILED};
use crate::observability::SpanTimer;
use crate::stages::StageChain;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Runs a fixed list of work items through a shared stage chain.
///
/// The chain is held behind an `Arc` and never mutated, so one runner can
/// execute any number of batches under either strategy.
pub struct BatchRunner<V: Send + 'static> {
    chain: Arc<StageChain<V>>,
    config: BatchConfig,
    sink: Arc<dyn EventSink>,
}

impl<V> BatchRunner<V>
where
    V: From<WorkItem> + Send + 'static,
{
    /// Creates a runner with default configuration and no event sink.
    #[must_use]
    pub fn new(chain: StageChain<V>) -> Self {
        Self::from_shared(Arc::new(chain))
    }

    /// Creates a runner over a chain that is shared with other runners.
    #[must_use]
    pub fn from_shared(chain: Arc<StageChain<V>>) -> Self {
        Self {
            chain,
            config: BatchConfig::default(),
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the runner configuration.
    #[must_use]
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the stage chain.
    #[must_use]
    pub fn chain(&self) -> &StageChain<V> {
        &self.chain
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Checks batch preconditions without running anything.
    ///
    /// Both strategies call this before the first stage runs.
    pub fn validate(&self, items: &[WorkItem]) -> Result<(), BatchError> {
        if items.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        self.config.validate()?;
        Ok(())
    }

    /// Runs the batch under the given strategy.
    pub async fn run(
        &self,
        strategy: ExecutionStrategy,
        items: &[WorkItem],
    ) -> Result<BatchResult, BatchError> {
        match strategy {
            ExecutionStrategy::Sequential => self.run_sequential(items).await,
            ExecutionStrategy::Parallel => self.run_parallel(items).await,
        }
    }

    /// Runs every item one at a time, in input order.
    ///
    /// A panicking stage is caught in place and recorded as a
    /// `Panicked` failure for that item only.
    pub async fn run_sequential(&self, items: &[WorkItem]) -> Result<BatchResult, BatchError> {
        self.validate(items)?;

        let reporter = self.reporter(ExecutionStrategy::Sequential);
        let timer = SpanTimer::start("batch.sequential");
        reporter.started(items.len(), None);

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let record = AssertUnwindSafe(run_item(&self.chain, item))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| panicked_record(item, &panic_message(payload.as_ref())));
            reporter.item_finished(index, &record);
            records.push(record);
        }

        Ok(reporter.finish(timer, records))
    }

    /// Runs every item in its own task and waits for all of them.
    ///
    /// Each task returns its record through its own `JoinHandle`; handles are
    /// held in input order, so the joined vector is already index-aligned.
    /// With `max_concurrency` set, tasks wait on a semaphore permit before
    /// starting their chain.
    pub async fn run_parallel(&self, items: &[WorkItem]) -> Result<BatchResult, BatchError> {
        self.validate(items)?;

        let reporter = self.reporter(ExecutionStrategy::Parallel);
        let timer = SpanTimer::start("batch.parallel");
        reporter.started(items.len(), self.config.max_concurrency);

        let limiter = self
            .config
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit)));

        let handles: Vec<JoinHandle<OutcomeRecord>> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                self.spawn_item(index, item.clone(), reporter.clone(), limiter.clone())
            })
            .collect();

        // Barrier: every task has finished before any record is read.
        let joined = join_all(handles).await;

        let records = joined
            .into_iter()
            .zip(items)
            .enumerate()
            .map(|(index, (joined, item))| match joined {
                Ok(record) => record,
                Err(err) => {
                    let message = if err.is_panic() {
                        panic_message(err.into_panic().as_ref())
                    } else {
                        err.to_string()
                    };
                    let record = panicked_record(item, &message);
                    reporter.item_finished(index, &record);
                    record
                }
            })
            .collect();

        Ok(reporter.finish(timer, records))
    }

    /// Runs the sequential strategy, then the parallel one, and compares them.
    pub async fn compare(&self, items: &[WorkItem]) -> Result<StrategyComparison, BatchError> {
        let sequential = self.run_sequential(items).await?;
        let parallel = self.run_parallel(items).await?;
        StrategyComparison::new(&sequential, &parallel)
    }

    /// Runs every strategy of the configured mode, in order.
    ///
    /// A comparison is attached when the mode ran both strategies.
    pub async fn run_mode(&self, items: &[WorkItem]) -> Result<RunReport, BatchError> {
        self.validate(items)?;

        let mut results = Vec::new();
        for strategy in self.config.mode.strategies() {
            results.push(self.run(*strategy, items).await?);
        }

        RunReport::new(results)
    }

    fn spawn_item(
        &self,
        index: usize,
        item: WorkItem,
        reporter: ItemReporter,
        limiter: Option<Arc<Semaphore>>,
    ) -> JoinHandle<OutcomeRecord> {
        let chain = Arc::clone(&self.chain);

        tokio::spawn(async move {
            // Acquisition only fails on a closed semaphore; this one is never closed.
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let record = run_item(&chain, &item).await;
            reporter.item_finished(index, &record);
            record
        })
    }

    fn reporter(&self, strategy: ExecutionStrategy) -> ItemReporter {
        ItemReporter {
            sink: Arc::clone(&self.sink),
            run_id: Uuid::new_v4(),
            strategy,
            item_events: self.config.item_events,
        }
    }
}

impl<V: Send + 'static> std::fmt::Debug for BatchRunner<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("chain", &self.chain)
            .field("config", &self.config)
            .field("sink", &self.sink)
            .finish()
    }
}

/// Runs one item through the chain and turns the outcome into a record.
async fn run_item<V>(chain: &StageChain<V>, item: &WorkItem) -> OutcomeRecord
where
    V: From<WorkItem> + Send + 'static,
{
    let start = Instant::now();
    match chain.run(item).await {
        Ok(_) => OutcomeRecord::succeeded(item.clone(), start.elapsed()),
        Err(failure) => OutcomeRecord::failed(item.clone(), failure, start.elapsed()),
    }
}

fn panicked_record(item: &WorkItem, message: &str) -> OutcomeRecord {
    warn!(item = %item, panic = message, "Stage panicked, recording item as failed");
    OutcomeRecord::failed(
        item.clone(),
        StageFailure::panicked(item.clone(), message),
        std::time::Duration::ZERO,
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Per-run logging and event emission, cloned into every parallel task.
#[derive(Clone)]
struct ItemReporter {
    sink: Arc<dyn EventSink>,
    run_id: Uuid,
    strategy: ExecutionStrategy,
    item_events: bool,
}

impl ItemReporter {
    fn started(&self, item_count: usize, max_concurrency: Option<usize>) {
        info!(
            run_id = %self.run_id,
            strategy = %self.strategy,
            items = item_count,
            max_concurrency = ?max_concurrency,
            "Batch started"
        );
        self.sink.emit(
            BATCH_STARTED,
            serde_json::json!({
                "run_id": self.run_id,
                "strategy": self.strategy,
                "items": item_count,
                "max_concurrency": max_concurrency,
            }),
        );
    }

    fn item_finished(&self, index: usize, record: &OutcomeRecord) {
        match record.failure() {
            None => {
                debug!(
                    run_id = %self.run_id,
                    index,
                    item = %record.item(),
                    duration_ms = record.duration_ms(),
                    "Item completed"
                );
                if self.item_events {
                    self.sink.emit(
                        ITEM_COMPLETED,
                        serde_json::json!({
                            "run_id": self.run_id,
                            "strategy": self.strategy,
                            "index": index,
                            "item": record.item(),
                            "duration_ms": record.duration_ms(),
                        }),
                    );
                }
            }
            Some(failure) => {
                debug!(
                    run_id = %self.run_id,
                    index,
                    item = %record.item(),
                    kind = %failure.kind(),
                    cause = failure.cause(),
                    "Item failed"
                );
                if self.item_events {
                    self.sink.emit(
                        ITEM_FAILED,
                        serde_json::json!({
                            "run_id": self.run_id,
                            "strategy": self.strategy,
                            "index": index,
                            "item": record.item(),
                            "kind": failure.kind(),
                            "cause": failure.cause(),
                            "duration_ms": record.duration_ms(),
                        }),
                    );
                }
            }
        }
    }

    fn finish(&self, timer: SpanTimer, records: Vec<OutcomeRecord>) -> BatchResult {
        let started_at = timer.started_at();
        let span = timer.name().to_string();
        let elapsed = timer.finish();
        let result = BatchResult::new(self.run_id, self.strategy, started_at, elapsed, records);

        info!(
            span = %span,
            run_id = %self.run_id,
            strategy = %self.strategy,
            succeeded = result.success_count(),
            failed = result.failure_count(),
            elapsed_ms = result.elapsed_ms(),
            "Batch completed"
        );
        self.sink.emit(
            BATCH_COMPLETED,
            serde_json::json!({
                "run_id": self.run_id,
                "strategy": self.strategy,
                "items": result.len(),
                "succeeded": result.success_count(),
                "failed": result.failure_count(),
                "elapsed_ms": result.elapsed_ms(),
            }),
        );

        result
    }
}
