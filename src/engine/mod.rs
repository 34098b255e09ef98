//! Core engine — listing discovery and the sequential entry loop.

pub mod cancel;
pub mod orchestrator;
pub mod paginator;
pub mod stats;
pub mod submitter;

pub use cancel::CancelToken;
pub use orchestrator::EntryOrchestrator;
