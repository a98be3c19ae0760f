//! Message retention and view synchronization for msgscope
//!
//! This crate provides the bounded per-severity history, the session
//! transcript, the ingestion entry point and the filter logic that keeps the
//! displayed list in sequence order.

mod arena;
mod config;
mod engine;
mod error;
mod index;
mod layer;
mod store;
mod transcript;
mod view;

#[cfg(test)]
mod testing;

pub use config::{ConsoleConfig, DEFAULT_LOG_FILE, DEFAULT_MAX_DISPLAYED, DEFAULT_MAX_RETAINED};
pub use config::RetentionOverrides;
pub use engine::{Console, ConsoleStats, FatalHook, ViewRequest, ViewRequests};
pub use error::ConsoleError;
pub use index::{ActiveViewIndex, ViewEntry};
pub use layer::ConsoleLayer;
pub use store::SeverityStore;
pub use transcript::{SessionLog, render_block};
pub use view::{ConsoleView, ViewSink};

// Re-export types used in our public API
pub use msgscope_types::{MessageRecord, Provenance, SeqId, Severity, Visibility};
