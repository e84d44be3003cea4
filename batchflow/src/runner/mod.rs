//! Batch execution.
//!
//! This module provides:
//! - The batch runner with sequential and parallel strategies
//! - Summaries and strategy comparisons over batch results

mod batch;
mod report;

pub use batch::BatchRunner;
pub use report::{BatchSummary, RunReport, StrategyComparison};
