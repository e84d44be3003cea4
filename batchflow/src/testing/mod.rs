//! Testing utilities for batchflow.
//!
//! This module provides:
//! - Mock stages for injecting delays, failures and panics
//! - Assertions over batch results
//! - On-disk image fixtures

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_all_succeeded, assert_index_aligned, assert_outcomes, assert_same_outcomes,
};
pub use fixtures::{sample_items, write_corrupt_file, ImageDirFixture};
#[cfg(feature = "images")]
pub use fixtures::write_sample_image;
pub use mocks::{
    CountingStage, DelayStage, FailingStage, PanickingStage, PeakConcurrencyStage,
    RecordingStage,
};
