//! Read-only projections over batch results.

use crate::core::{BatchResult, ExecutionStrategy};
use crate::errors::{BatchError, StageFailure};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Counts and failures of one batch result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Run ID of the summarized batch.
    pub run_id: Uuid,
    /// Strategy that produced the batch.
    pub strategy: ExecutionStrategy,
    /// Number of items.
    pub total: usize,
    /// Number of successful items.
    pub succeeded: usize,
    /// Number of failed items.
    pub failed: usize,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: f64,
    /// Failures in input order.
    pub failures: Vec<StageFailure>,
}

impl BatchSummary {
    /// Summarizes a batch result.
    #[must_use]
    pub fn from_result(result: &BatchResult) -> Self {
        Self {
            run_id: result.run_id(),
            strategy: result.strategy(),
            total: result.len(),
            succeeded: result.success_count(),
            failed: result.failure_count(),
            elapsed_ms: result.elapsed_ms(),
            failures: result
                .failures()
                .filter_map(|r| r.failure().cloned())
                .collect(),
        }
    }

    /// Returns the fraction of items that succeeded.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.total as f64
    }
}

impl From<&BatchResult> for BatchSummary {
    fn from(result: &BatchResult) -> Self {
        Self::from_result(result)
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} Processing ===", self.strategy.label())?;
        writeln!(f, "Time taken: {:.2}ms", self.elapsed_ms)?;
        for failure in &self.failures {
            writeln!(f, "Failed to process {}: {}", failure.item(), failure.cause())?;
        }
        writeln!(f, "Successfully processed: {}", self.succeeded)?;
        write!(f, "Failed to process: {}", self.failed)
    }
}

/// Side-by-side view of a sequential and a parallel run over the same items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyComparison {
    /// Summary of the sequential run.
    pub sequential: BatchSummary,
    /// Summary of the parallel run.
    pub parallel: BatchSummary,
    /// `sequential_elapsed / parallel_elapsed`, if the parallel run took any time.
    pub speedup: Option<f64>,
    /// Whether both runs agree on per-index success.
    pub outcomes_agree: bool,
}

impl StrategyComparison {
    /// Compares two results over the same item list.
    ///
    /// Fails with `MismatchedItems` if the item lists differ in length or order.
    pub fn new(sequential: &BatchResult, parallel: &BatchResult) -> Result<Self, BatchError> {
        if sequential.items() != parallel.items() {
            return Err(BatchError::MismatchedItems {
                left: sequential.len(),
                right: parallel.len(),
            });
        }

        let parallel_secs = parallel.elapsed().as_secs_f64();
        let speedup = (parallel_secs > 0.0).then(|| sequential.elapsed().as_secs_f64() / parallel_secs);

        Ok(Self {
            sequential: BatchSummary::from_result(sequential),
            parallel: BatchSummary::from_result(parallel),
            speedup,
            outcomes_agree: sequential.success_flags() == parallel.success_flags(),
        })
    }

    /// Returns the speedup of the parallel run over the sequential one.
    #[must_use]
    pub fn speedup(&self) -> Option<f64> {
        self.speedup
    }
}

impl fmt::Display for StrategyComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Performance Comparison ===")?;
        writeln!(f, "Sequential time: {:.2}ms", self.sequential.elapsed_ms)?;
        writeln!(f, "Parallel time: {:.2}ms", self.parallel.elapsed_ms)?;
        match self.speedup {
            Some(speedup) => write!(f, "Speedup: {speedup:.2}x")?,
            None => write!(f, "Speedup: n/a")?,
        }
        if !self.outcomes_agree {
            write!(f, "\nWarning: sequential and parallel outcomes differ")?;
        }
        Ok(())
    }
}

/// Everything one invocation of a mode produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    summaries: Vec<BatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<StrategyComparison>,
    #[serde(skip)]
    results: Vec<BatchResult>,
}

impl RunReport {
    /// Builds a report from results in the order they ran.
    ///
    /// A comparison is attached when both a sequential and a parallel result
    /// are present.
    pub fn new(results: Vec<BatchResult>) -> Result<Self, BatchError> {
        let find = |strategy: ExecutionStrategy| results.iter().find(|r| r.strategy() == strategy);
        let comparison = match (find(ExecutionStrategy::Sequential), find(ExecutionStrategy::Parallel)) {
            (Some(sequential), Some(parallel)) => Some(StrategyComparison::new(sequential, parallel)?),
            _ => None,
        };

        Ok(Self {
            summaries: results.iter().map(BatchSummary::from_result).collect(),
            comparison,
            results,
        })
    }

    /// Returns the results in the order they ran.
    #[must_use]
    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    /// Returns the result for a strategy, if it ran.
    #[must_use]
    pub fn result(&self, strategy: ExecutionStrategy) -> Option<&BatchResult> {
        self.results.iter().find(|r| r.strategy() == strategy)
    }

    /// Returns the per-result summaries.
    #[must_use]
    pub fn summaries(&self) -> &[BatchSummary] {
        &self.summaries
    }

    /// Returns the comparison, if both strategies ran.
    #[must_use]
    pub fn comparison(&self) -> Option<&StrategyComparison> {
        self.comparison.as_ref()
    }

    /// Renders the report as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Returns the failure count summed over every result.
    #[must_use]
    pub fn total_failures(&self) -> usize {
        self.summaries.iter().map(|s| s.failed).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, summary) in self.summaries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{summary}")?;
        }
        if let Some(comparison) = &self.comparison {
            write!(f, "\n\n{comparison}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OutcomeRecord, WorkItem};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn result(strategy: ExecutionStrategy, elapsed_ms: u64, items: &[(&str, bool)]) -> BatchResult {
        let records = items
            .iter()
            .map(|(name, ok)| {
                let item = WorkItem::from(*name);
                if *ok {
                    OutcomeRecord::succeeded(item, Duration::from_millis(1))
                } else {
                    OutcomeRecord::failed(
                        item.clone(),
                        StageFailure::missing_input(item, "no such file"),
                        Duration::from_millis(1),
                    )
                }
            })
            .collect();
        BatchResult::new(
            Uuid::new_v4(),
            strategy,
            Utc::now(),
            Duration::from_millis(elapsed_ms),
            records,
        )
    }

    const ITEMS: &[(&str, bool)] = &[("ok1.jpg", true), ("missing.jpg", false), ("ok2.jpg", true)];

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary::from(&result(ExecutionStrategy::Sequential, 30, ITEMS));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].item(), &WorkItem::from("missing.jpg"));
        assert!((summary.success_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_display() {
        let text = BatchSummary::from(&result(ExecutionStrategy::Parallel, 12, ITEMS)).to_string();

        assert!(text.starts_with("=== Parallel Processing ==="));
        assert!(text.contains("Time taken: 12.00ms"));
        assert!(text.contains("Failed to process missing.jpg: no such file"));
        assert!(text.contains("Successfully processed: 2"));
        assert!(text.ends_with("Failed to process: 1"));
    }

    #[test]
    fn test_comparison_speedup() {
        let sequential = result(ExecutionStrategy::Sequential, 400, ITEMS);
        let parallel = result(ExecutionStrategy::Parallel, 100, ITEMS);

        let comparison = StrategyComparison::new(&sequential, &parallel).unwrap();

        let speedup = comparison.speedup().unwrap();
        assert!((speedup - 4.0).abs() < 1e-9);
        assert!(comparison.outcomes_agree);
        assert!(comparison.to_string().contains("Speedup: 4.00x"));
    }

    #[test]
    fn test_comparison_without_parallel_time() {
        let sequential = result(ExecutionStrategy::Sequential, 5, ITEMS);
        let parallel = result(ExecutionStrategy::Parallel, 0, ITEMS);

        let comparison = StrategyComparison::new(&sequential, &parallel).unwrap();

        assert_eq!(comparison.speedup(), None);
        assert!(comparison.to_string().contains("Speedup: n/a"));
    }

    #[test]
    fn test_comparison_flags_disagreement() {
        let sequential = result(ExecutionStrategy::Sequential, 5, &[("a", true), ("b", true)]);
        let parallel = result(ExecutionStrategy::Parallel, 5, &[("a", true), ("b", false)]);

        let comparison = StrategyComparison::new(&sequential, &parallel).unwrap();

        assert!(!comparison.outcomes_agree);
        assert!(comparison.to_string().contains("outcomes differ"));
    }

    #[test]
    fn test_comparison_rejects_different_items() {
        let sequential = result(ExecutionStrategy::Sequential, 5, &[("a", true), ("b", true)]);
        let reordered = result(ExecutionStrategy::Parallel, 5, &[("b", true), ("a", true)]);
        let shorter = result(ExecutionStrategy::Parallel, 5, &[("a", true)]);

        assert!(matches!(
            StrategyComparison::new(&sequential, &reordered),
            Err(BatchError::MismatchedItems { left: 2, right: 2 })
        ));
        assert!(matches!(
            StrategyComparison::new(&sequential, &shorter),
            Err(BatchError::MismatchedItems { left: 2, right: 1 })
        ));
    }

    #[test]
    fn test_report_with_both_strategies() {
        let report = RunReport::new(vec![
            result(ExecutionStrategy::Sequential, 40, ITEMS),
            result(ExecutionStrategy::Parallel, 20, ITEMS),
        ])
        .unwrap();

        assert_eq!(report.results().len(), 2);
        assert_eq!(report.total_failures(), 2);
        assert!(report.comparison().is_some());
        assert!(report.result(ExecutionStrategy::Parallel).is_some());

        let text = report.to_string();
        assert!(text.contains("=== Sequential Processing ==="));
        assert!(text.contains("=== Parallel Processing ==="));
        assert!(text.contains("Speedup: 2.00x"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summaries"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["comparison"]["outcomes_agree"], true);
    }

    #[test]
    fn test_report_json_parses_back() {
        let report = RunReport::new(vec![
            result(ExecutionStrategy::Sequential, 30, ITEMS),
            result(ExecutionStrategy::Parallel, 10, ITEMS),
        ])
        .unwrap();

        let rendered = report.to_json_pretty().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert!(rendered.starts_with('{'));
        assert_eq!(parsed["summaries"][0]["strategy"], "sequential");
        assert_eq!(parsed["summaries"][1]["failures"][0]["kind"], "missing_input");
        assert_eq!(parsed["summaries"][1]["failures"][0]["item"], "missing.jpg");
        assert_eq!(parsed["comparison"]["speedup"].as_f64().map(f64::round), Some(3.0));
    }

    #[test]
    fn test_report_single_strategy_has_no_comparison() {
        let report = RunReport::new(vec![result(ExecutionStrategy::Parallel, 20, ITEMS)]).unwrap();

        assert!(report.comparison().is_none());
        assert!(report.result(ExecutionStrategy::Sequential).is_none());
        assert!(!report.to_string().contains("Speedup"));
    }
}
