//! Ordered chains of stages.

use super::Stage;
use crate::core::WorkItem;
use crate::errors::{ConfigError, StageFailure};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An ordered sequence of stages applied to one item at a time.
///
/// A chain is assembled once and then shared read-only across every item
/// and both execution strategies. It owns no concurrency and no per-run state.
pub struct StageChain<V: Send + 'static> {
    name: String,
    stages: Vec<Arc<dyn Stage<V>>>,
}

impl<V: Send + 'static> StageChain<V> {
    /// Starts building a chain.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> StageChainBuilder<V> {
        StageChainBuilder::new(name)
    }

    /// Returns the chain name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs one item through every stage in order.
    ///
    /// The first stage receives the value built from the item itself. The
    /// first failing stage short-circuits the rest and its failure is returned.
    pub async fn run(&self, item: &WorkItem) -> Result<V, StageFailure>
    where
        V: From<WorkItem>,
    {
        let mut value = V::from(item.clone());

        for stage in &self.stages {
            value = match stage.apply(item, value).await {
                Ok(next) => next,
                Err(failure) => {
                    debug!(
                        chain = %self.name,
                        stage = stage.name(),
                        item = %item,
                        kind = %failure.kind(),
                        "Stage failed, skipping remaining stages"
                    );
                    return Err(failure);
                }
            };
        }

        Ok(value)
    }
}

impl<V: Send + 'static> fmt::Debug for StageChain<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageChain")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for [`StageChain`].
pub struct StageChainBuilder<V: Send + 'static> {
    name: String,
    stages: Vec<Arc<dyn Stage<V>>>,
}

impl<V: Send + 'static> StageChainBuilder<V> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage<S>(mut self, stage: S) -> Self
    where
        S: Stage<V> + 'static,
    {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends a stage that is shared with other chains or with the caller.
    #[must_use]
    pub fn shared_stage(mut self, stage: Arc<dyn Stage<V>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Returns the number of stages added so far.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds the chain.
    ///
    /// Fails if no stages were added.
    pub fn build(self) -> Result<StageChain<V>, ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::EmptyChain { name: self.name });
        }

        Ok(StageChain {
            name: self.name,
            stages: self.stages,
        })
    }
}

impl<V: Send + 'static> fmt::Debug for StageChainBuilder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageChainBuilder")
            .field("name", &self.name)
            .field("stage_count", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{FnStage, NoOpStage};
    use crate::testing::{CountingStage, FailingStage};
    use crate::errors::FailureKind;

    fn append(suffix: &'static str) -> FnStage<impl Fn(&WorkItem, String) -> Result<String, StageFailure>> {
        FnStage::new(suffix, move |_item: &WorkItem, value: String| -> Result<String, StageFailure> {
            Ok(format!("{value}{suffix}"))
        })
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Trace(String);

    impl From<WorkItem> for Trace {
        fn from(item: WorkItem) -> Self {
            Self(item.to_string())
        }
    }

    #[test]
    fn test_build_requires_stages() {
        let result = StageChain::<String>::builder("empty").build();
        assert!(matches!(result, Err(ConfigError::EmptyChain { name }) if name == "empty"));
    }

    #[test]
    fn test_stage_names_in_order() {
        let chain = StageChain::<String>::builder("names")
            .stage(NoOpStage::new("load"))
            .stage(NoOpStage::new("resize"))
            .stage(NoOpStage::new("save"))
            .build()
            .unwrap();

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.stage_names(), vec!["load", "resize", "save"]);
    }

    #[tokio::test]
    async fn test_run_threads_value_in_order() {
        let chain = StageChain::<String>::builder("order")
            .stage(append("-a"))
            .stage(append("-b"))
            .stage(append("-c"))
            .build()
            .unwrap();

        let output = chain.run(&WorkItem::from("img")).await.unwrap();
        assert_eq!(output, "img-a-b-c");
    }

    #[tokio::test]
    async fn test_first_stage_receives_item() {
        let chain = StageChain::<Trace>::builder("seed")
            .stage(NoOpStage::new("noop"))
            .build()
            .unwrap();

        let output = chain.run(&WorkItem::from("photos/cat.png")).await.unwrap();
        assert_eq!(output, Trace("photos/cat.png".to_string()));
    }

    #[tokio::test]
    async fn test_failure_short_circuits() {
        let after = CountingStage::new("after");
        let chain = StageChain::<String>::builder("short")
            .stage(NoOpStage::new("before"))
            .stage(FailingStage::always("boom", FailureKind::TransformFailure))
            .shared_stage(Arc::new(after.clone()))
            .build()
            .unwrap();

        let err = chain.run(&WorkItem::from("x.jpg")).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::TransformFailure);
        assert_eq!(err.item(), &WorkItem::from("x.jpg"));
        assert_eq!(after.call_count(), 0);
    }
}
