//! Shared configuration for the help-center tooling.
//!
//! Defaults cover a local run against the public help center. A JSON file can
//! overlay any subset of fields; the CLI layers flags and env vars on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://support.ramp.com/api/v2/help_center/en-us";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Confidence percentage above which a chunk is labelled "Approved" in the
/// retrieval table. Presentation only; the AI gate has its own fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct DisplayThreshold(u8);

impl DisplayThreshold {
    pub const DEFAULT: Self = Self(60);

    /// Clamp an arbitrary integer percentage into `[0, 100]`.
    pub fn from_percent(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as u8)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub fn approves(self, confidence: f64) -> bool {
        confidence >= self.as_fraction()
    }
}

impl Default for DisplayThreshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for DisplayThreshold {
    fn from(percent: i64) -> Self {
        Self::from_percent(percent)
    }
}

impl From<DisplayThreshold> for i64 {
    fn from(threshold: DisplayThreshold) -> Self {
        i64::from(threshold.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpCenterConfig {
    /// Help-center API root, e.g. `https://example.zendesk.com/api/v2/help_center/en-us`.
    pub base_url: String,
    /// Maximum article pages (100 articles each) to pull per refresh.
    pub article_pages: u32,
    /// Usage feed (JSON array of `{rank, title, views, upvotes, downvotes}`).
    pub usage_path: Option<PathBuf>,
    /// Directory for operator overrides and settings.
    pub state_dir: PathBuf,
    pub display_threshold: DisplayThreshold,
    pub gemini_model: String,
}

impl Default for HelpCenterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            article_pages: 2,
            usage_path: None,
            state_dir: PathBuf::from("./data/state"),
            display_threshold: DisplayThreshold::DEFAULT,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

impl HelpCenterConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn display_threshold_clamps() {
        assert_eq!(DisplayThreshold::from_percent(-5).percent(), 0);
        assert_eq!(DisplayThreshold::from_percent(150).percent(), 100);
        assert_eq!(DisplayThreshold::from_percent(65).percent(), 65);
    }

    #[test]
    fn display_threshold_defaults_to_sixty() {
        assert_eq!(DisplayThreshold::default().percent(), 60);
    }

    #[test]
    fn display_threshold_approves_at_boundary() {
        let t = DisplayThreshold::from_percent(60);
        assert!(t.approves(0.60));
        assert!(!t.approves(0.59));
        assert!(DisplayThreshold::from_percent(0).approves(0.0));
    }

    #[test]
    fn display_threshold_deserializes_out_of_range() {
        let t: DisplayThreshold = serde_json::from_str("250").unwrap();
        assert_eq!(t.percent(), 100);
        assert_eq!(serde_json::to_string(&t).unwrap(), "100");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"article_pages": 6, "display_threshold": 75}}"#).unwrap();

        let config = HelpCenterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.article_pages, 6);
        assert_eq!(config.display_threshold.percent(), 75);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = HelpCenterConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = HelpCenterConfig::from_file(Path::new("/nonexistent/helpcenter.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(HelpCenterConfig::load(None).unwrap(), HelpCenterConfig::default());
    }
}
