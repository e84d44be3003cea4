//! # Batchflow
//!
//! Concurrent batch processing of a fixed list of independent work items.
//!
//! Each item is threaded through a [`StageChain`](stages::StageChain) of
//! fallible stages. A [`BatchRunner`](runner::BatchRunner) drives the chain
//! across the whole list, either sequentially or with one task per item, and
//! returns a [`BatchResult`](core::BatchResult) holding one outcome record per
//! item in input order. A failing item never aborts the batch.
//!
//! With the `images` feature (on by default) the crate also ships the
//! load, resize, grayscale and save stages used by the `batchflow` binary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use batchflow::prelude::*;
//!
//! let chain = image_chain(&ImagePipelineConfig::default())?;
//! let runner = BatchRunner::new(chain);
//!
//! let items = WorkItem::from_paths(["images/cat1.jpg", "images/cat2.jpg"]);
//! let comparison = runner.compare(&items).await?;
//! println!("{comparison}");
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod runner;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{AppConfig, BatchConfig, ImagePipelineConfig, LoggingConfig, ResizeFilter};
    pub use crate::core::{BatchResult, ExecutionMode, ExecutionStrategy, OutcomeRecord, WorkItem};
    pub use crate::errors::{BatchError, BatchflowError, ConfigError, FailureKind, StageFailure};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::init_tracing;
    pub use crate::runner::{BatchRunner, BatchSummary, RunReport, StrategyComparison};
    pub use crate::stages::{FnStage, NoOpStage, Stage, StageChain, StageChainBuilder};

    #[cfg(feature = "images")]
    pub use crate::stages::image::{
        check_output_names, image_chain, GrayscaleStage, ImageJob, LoadImageStage, ResizeStage, SaveImageStage,
    };
}
