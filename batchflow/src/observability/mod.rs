//! Observability utilities: subscriber setup and timing.

mod subscriber;
mod timer;

pub use subscriber::init_tracing;
pub use timer::SpanTimer;
