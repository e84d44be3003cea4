//! Test assertions for batch results.

use crate::core::{BatchResult, WorkItem};
use crate::errors::FailureKind;

/// Asserts that the result holds one record per item, in input order.
pub fn assert_index_aligned(result: &BatchResult, items: &[WorkItem]) {
    assert_eq!(
        result.len(),
        items.len(),
        "Expected {} records, got {}",
        items.len(),
        result.len()
    );
    for (i, (record, item)) in result.records().iter().zip(items).enumerate() {
        assert_eq!(
            record.item(),
            item,
            "Record {i} belongs to '{}', expected '{item}'",
            record.item()
        );
    }
}

/// Asserts per-index outcomes: `None` for success, `Some(kind)` for failure.
pub fn assert_outcomes(result: &BatchResult, expected: &[Option<FailureKind>]) {
    let actual: Vec<Option<FailureKind>> = result.records().iter().map(|r| r.failure_kind()).collect();
    assert_eq!(
        actual, expected,
        "Unexpected outcomes for {} run",
        result.strategy()
    );
}

/// Asserts that two results agree on per-index success.
pub fn assert_same_outcomes(left: &BatchResult, right: &BatchResult) {
    assert_eq!(
        left.success_flags(),
        right.success_flags(),
        "{} and {} runs disagree",
        left.strategy(),
        right.strategy()
    );
}

/// Asserts that every item succeeded.
pub fn assert_all_succeeded(result: &BatchResult) {
    let failed: Vec<String> = result
        .failures()
        .filter_map(|r| r.failure().map(ToString::to_string))
        .collect();
    assert!(failed.is_empty(), "Expected every item to succeed, failures: {failed:?}");
}
