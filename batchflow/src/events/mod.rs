//! Event sink system for observability.
//!
//! The batch runner reports its lifecycle to an [`EventSink`]. Event names
//! are the constants below; payloads are JSON objects that always carry the
//! batch `run_id` and `strategy`.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Emitted once before the first item starts.
pub const BATCH_STARTED: &str = "batch.started";
/// Emitted once after the last item finished.
pub const BATCH_COMPLETED: &str = "batch.completed";
/// Emitted when an item's chain ran to completion.
pub const ITEM_COMPLETED: &str = "item.completed";
/// Emitted when an item's chain failed or panicked.
pub const ITEM_FAILED: &str = "item.failed";
