//! Mock stages for testing.
//!
//! Every mock is generic over the chain value, so the same fake can sit in a
//! `StageChain<PathBuf>` in a unit test or next to the image stages.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::WorkItem;
use crate::errors::{FailureKind, StageFailure};
use crate::stages::Stage;

/// A stage that counts its calls and passes the value through.
///
/// Clones share the counter, so a clone can be handed to a chain while the
/// test reads the count from another.
#[derive(Debug, Clone)]
pub struct CountingStage {
    name: String,
    calls: Arc<AtomicUsize>,
}

impl CountingStage {
    /// Creates a new counting stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resets the counter.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl<V: Send + 'static> Stage<V> for CountingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, _item: &WorkItem, value: V) -> Result<V, StageFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }
}

/// A stage that fails with a chosen kind.
#[derive(Debug)]
pub struct FailingStage {
    name: String,
    kind: FailureKind,
    targets: Option<HashSet<WorkItem>>,
}

impl FailingStage {
    /// Creates a stage that fails for every item.
    #[must_use]
    pub fn always(name: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            name: name.into(),
            kind,
            targets: None,
        }
    }

    /// Creates a stage that fails only for the given items.
    #[must_use]
    pub fn for_items<I, T>(name: impl Into<String>, kind: FailureKind, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<WorkItem>,
    {
        Self {
            name: name.into(),
            kind,
            targets: Some(items.into_iter().map(Into::into).collect()),
        }
    }

    fn fails_for(&self, item: &WorkItem) -> bool {
        self.targets.as_ref().map_or(true, |targets| targets.contains(item))
    }
}

#[async_trait]
impl<V: Send + 'static> Stage<V> for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, item: &WorkItem, value: V) -> Result<V, StageFailure> {
        if self.fails_for(item) {
            Err(StageFailure::new(self.kind, item.clone(), "injected failure"))
        } else {
            Ok(value)
        }
    }
}

/// A stage that sleeps before passing the value through.
#[derive(Debug)]
pub struct DelayStage {
    name: String,
    delay: Duration,
    per_item: HashMap<WorkItem, Duration>,
}

impl DelayStage {
    /// Creates a new delay stage.
    #[must_use]
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            per_item: HashMap::new(),
        }
    }

    /// Creates a delay stage with delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(name: impl Into<String>, ms: u64) -> Self {
        Self::new(name, Duration::from_millis(ms))
    }

    /// Overrides the delay for one item.
    #[must_use]
    pub fn with_item_delay(mut self, item: impl Into<WorkItem>, delay: Duration) -> Self {
        self.per_item.insert(item.into(), delay);
        self
    }

    fn delay_for(&self, item: &WorkItem) -> Duration {
        self.per_item.get(item).copied().unwrap_or(self.delay)
    }
}

#[async_trait]
impl<V: Send + 'static> Stage<V> for DelayStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, item: &WorkItem, value: V) -> Result<V, StageFailure> {
        tokio::time::sleep(self.delay_for(item)).await;
        Ok(value)
    }
}

/// A stage that records the items it sees, in call order.
#[derive(Debug, Clone)]
pub struct RecordingStage {
    name: String,
    seen: Arc<Mutex<Vec<WorkItem>>>,
}

impl RecordingStage {
    /// Creates a new recording stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the recorded items.
    #[must_use]
    pub fn items(&self) -> Vec<WorkItem> {
        self.seen.lock().clone()
    }

    /// Clears recorded items.
    pub fn clear(&self) {
        self.seen.lock().clear();
    }
}

#[async_trait]
impl<V: Send + 'static> Stage<V> for RecordingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, item: &WorkItem, value: V) -> Result<V, StageFailure> {
        self.seen.lock().push(item.clone());
        Ok(value)
    }
}

/// A stage that panics.
#[derive(Debug)]
pub struct PanickingStage {
    name: String,
    targets: Option<HashSet<WorkItem>>,
}

impl PanickingStage {
    /// Creates a stage that panics for every item.
    #[must_use]
    pub fn always(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: None,
        }
    }

    /// Creates a stage that panics only for the given items.
    #[must_use]
    pub fn for_items<I, T>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<WorkItem>,
    {
        Self {
            name: name.into(),
            targets: Some(items.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl<V: Send + 'static> Stage<V> for PanickingStage {
    fn name(&self) -> &str {
        &self.name
    }

    #[allow(clippy::panic)]
    async fn apply(&self, item: &WorkItem, value: V) -> Result<V, StageFailure> {
        let panics = self.targets.as_ref().map_or(true, |targets| targets.contains(item));
        if panics {
            panic!("injected panic for {item}");
        }
        Ok(value)
    }
}

/// A stage that tracks how many calls are in flight at once.
#[derive(Debug, Clone)]
pub struct PeakConcurrencyStage {
    name: String,
    delay: Duration,
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl PeakConcurrencyStage {
    /// Creates a new stage that holds each call for `delay`.
    #[must_use]
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            current: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the highest number of overlapping calls observed.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<V: Send + 'static> Stage<V> for PeakConcurrencyStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, _item: &WorkItem, value: V) -> Result<V, StageFailure> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(value)
    }
}
