//! Offline snapshots of a help-center fetch.
//!
//! A snapshot lets the console be rebuilt without network access. It records
//! when the articles were fetched and from which locale root.

use std::path::Path;

use chrono::{DateTime, Utc};
use helpcenter_core::RawArticle;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::SyncError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpCenterExport {
    pub fetched_at: DateTime<Utc>,
    pub base_url: String,
    pub articles: Vec<RawArticle>,
}

impl HelpCenterExport {
    pub fn new(base_url: impl Into<String>, articles: Vec<RawArticle>) -> Self {
        Self {
            fetched_at: Utc::now(),
            base_url: base_url.into(),
            articles,
        }
    }

    /// Write the snapshot as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        let io_err = |source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes).map_err(io_err)?;
        info!(path = %path.display(), articles = self.articles.len(), "saved export");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let bytes = std::fs::read(path).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let export: Self = serde_json::from_slice(&bytes)?;
        info!(
            path = %path.display(),
            articles = export.articles.len(),
            fetched_at = %export.fetched_at,
            "loaded export"
        );
        Ok(export)
    }
}
