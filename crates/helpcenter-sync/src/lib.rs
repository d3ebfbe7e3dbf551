//! Ingestion layer: help-center HTTP export, usage-feed merge, offline
//! snapshots, and the generative answer client.

mod error;
pub mod export;
pub mod gemini;
pub mod usage;
pub mod zendesk;

pub use error::SyncError;
pub use export::HelpCenterExport;
pub use gemini::GeminiClient;
pub use usage::{load_usage, merge_usage};
pub use zendesk::HelpCenterClient;
