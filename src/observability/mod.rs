//! Observability
//!
//! Structured logging and typed lifecycle events for release runs. Logging
//! is synchronous and side-effect free with respect to the promotion flow:
//! it describes decisions, it never gates them.

mod events;
mod logger;

pub use events::ReleaseEvent;
pub use logger::{Logger, Severity};
