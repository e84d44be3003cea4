//! Core domain model types for batchflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Work item identifiers
//! - Execution strategy and mode enums
//! - Per-item outcome records and whole-batch results

mod item;
mod outcome;
mod result;
mod strategy;

pub use item::WorkItem;
pub use outcome::OutcomeRecord;
pub use result::BatchResult;
pub use strategy::{ExecutionMode, ExecutionStrategy};
