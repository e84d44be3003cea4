//! Execution strategy and mode enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a batch schedules its per-item runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// One item at a time, in input order.
    Sequential,
    /// One concurrent task per item, joined by a barrier.
    Parallel,
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl ExecutionStrategy {
    /// Returns a capitalized label for reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::Parallel => "Parallel",
        }
    }
}

/// Which strategies a run should exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Sequential only.
    Sequential,
    /// Parallel only.
    Parallel,
    /// Sequential baseline, then parallel, then a comparison.
    #[default]
    Both,
}

impl ExecutionMode {
    /// Returns the strategies to run, in the order they run.
    #[must_use]
    pub fn strategies(&self) -> &'static [ExecutionStrategy] {
        match self {
            Self::Sequential => &[ExecutionStrategy::Sequential],
            Self::Parallel => &[ExecutionStrategy::Parallel],
            Self::Both => &[ExecutionStrategy::Sequential, ExecutionStrategy::Parallel],
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            // "concurrent" is accepted as an alias for parallel
            "parallel" | "concurrent" => Ok(Self::Parallel),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "invalid mode: {other}. Use 'sequential', 'parallel', or 'both'"
            )),
        }
    }
}
