//! Stage trait and implementations.
//!
//! Stages are the single-item transformation steps a [`StageChain`] threads
//! each work item through.

mod chain;
#[cfg(feature = "images")]
pub mod image;

pub use chain::{StageChain, StageChainBuilder};

use crate::core::WorkItem;
use crate::errors::StageFailure;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline stages.
///
/// A stage accepts the upstream value for one item and returns either the
/// transformed value or a typed failure. Stages may do private I/O but must
/// not mutate state shared with other items.
#[async_trait]
pub trait Stage<V: Send + 'static>: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Applies the stage to one item's current value.
    ///
    /// # Arguments
    ///
    /// * `item` - The work item being processed
    /// * `value` - The output of the previous stage
    async fn apply(&self, item: &WorkItem, value: V) -> Result<V, StageFailure>;
}

/// A simple function-based stage.
pub struct FnStage<F> {
    name: String,
    func: F,
}

impl<F> FnStage<F> {
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<V, F> Stage<V> for FnStage<F>
where
    V: Send + 'static,
    F: Fn(&WorkItem, V) -> Result<V, StageFailure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, item: &WorkItem, value: V) -> Result<V, StageFailure> {
        (self.func)(item, value)
    }
}

/// A stage that passes its input through unchanged.
#[derive(Debug, Clone)]
pub struct NoOpStage {
    name: String,
}

impl NoOpStage {
    /// Creates a new no-op stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl<V: Send + 'static> Stage<V> for NoOpStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, _item: &WorkItem, value: V) -> Result<V, StageFailure> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_stage() {
        let stage = FnStage::new("upper", |_item: &WorkItem, value: String| -> Result<String, StageFailure> {
            Ok(value.to_uppercase())
        });

        assert_eq!(Stage::<String>::name(&stage), "upper");

        let item = WorkItem::from("a.jpg");
        let output = stage.apply(&item, "a.jpg".to_string()).await;
        assert_eq!(output, Ok("A.JPG".to_string()));
    }

    #[tokio::test]
    async fn test_fn_stage_failure() {
        let stage = FnStage::new("reject", |item: &WorkItem, _value: String| -> Result<String, StageFailure> {
            Err(StageFailure::transform(item.clone(), "rejected"))
        });

        let item = WorkItem::from("a.jpg");
        let err = stage.apply(&item, String::new()).await.unwrap_err();
        assert_eq!(err.cause(), "rejected");
    }

    #[test]
    fn test_noop_stage() {
        let stage = NoOpStage::new("noop");
        let item = WorkItem::from("x");

        assert_eq!(Stage::<u32>::name(&stage), "noop");
        assert_eq!(tokio_test::block_on(stage.apply(&item, 7_u32)), Ok(7));
    }
}
