//! Per-item outcome records.

use super::WorkItem;
use crate::errors::{FailureKind, StageFailure};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The outcome of running one work item through the stage chain.
///
/// Exactly one record exists per item per batch run. Records are created
/// when the item's run finishes and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    item: WorkItem,
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure: Option<StageFailure>,
    duration_ms: f64,
}

impl OutcomeRecord {
    /// Creates a record for an item whose chain ran to completion.
    #[must_use]
    pub fn succeeded(item: WorkItem, duration: Duration) -> Self {
        Self {
            item,
            success: true,
            failure: None,
            duration_ms: duration.as_secs_f64() * 1000.0,
        }
    }

    /// Creates a record for an item whose chain failed.
    #[must_use]
    pub fn failed(item: WorkItem, failure: StageFailure, duration: Duration) -> Self {
        Self {
            item,
            success: false,
            failure: Some(failure),
            duration_ms: duration.as_secs_f64() * 1000.0,
        }
    }

    /// Returns the item this record belongs to.
    #[must_use]
    pub fn item(&self) -> &WorkItem {
        &self.item
    }

    /// Returns true if the item was processed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns true if the item failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&StageFailure> {
        self.failure.as_ref()
    }

    /// Returns the failure kind, if any.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(StageFailure::kind)
    }

    /// Returns how long this item's run took, in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_record() {
        let record = OutcomeRecord::succeeded(WorkItem::from("ok.jpg"), Duration::from_millis(5));

        assert!(record.is_success());
        assert!(!record.is_failure());
        assert!(record.failure().is_none());
        assert!(record.failure_kind().is_none());
        assert!((record.duration_ms() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_failed_record() {
        let item = WorkItem::from("missing.jpg");
        let failure = StageFailure::missing_input(item.clone(), "file not found");
        let record = OutcomeRecord::failed(item.clone(), failure, Duration::ZERO);

        assert!(record.is_failure());
        assert_eq!(record.item(), &item);
        assert_eq!(record.failure_kind(), Some(FailureKind::MissingInput));
    }

    #[test]
    fn test_record_serialization_skips_empty_failure() {
        let record = OutcomeRecord::succeeded(WorkItem::from("ok.jpg"), Duration::ZERO);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["item"], "ok.jpg");
        assert_eq!(json["success"], true);
        assert!(json.get("failure").is_none());
    }
}
