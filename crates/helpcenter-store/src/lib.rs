//! Persistence for operator state: per-article overrides and console settings.

mod console;
mod error;
mod kv;

pub use console::{ConsoleStore, GEMINI_KEY_KEY, OVERRIDE_PREFIX, THRESHOLD_KEY};
pub use error::StoreError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
