//! Monotonic timing for batches and items.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Measures one span of work.
///
/// Captures both a monotonic start (for elapsed time) and a wall-clock
/// start (for reporting).
#[derive(Debug, Clone)]
pub struct SpanTimer {
    name: String,
    start: Instant,
    started_at: DateTime<Utc>,
}

impl SpanTimer {
    /// Starts a new timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the wall-clock start time.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the elapsed time so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finishes the span and returns its duration.
    #[must_use]
    pub fn finish(self) -> Duration {
        self.elapsed()
    }
}
