//! Shared startup for every subcommand: configuration, state store, article
//! source, and the evaluation pipeline.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use helpcenter_ai::{Evaluation, KeywordRuleSet, MetadataClassifier, Pipeline};
use helpcenter_core::{DisplayThreshold, HelpCenterConfig, RawArticle};
use helpcenter_store::{ConsoleStore, FileStore};
use helpcenter_sync::{HelpCenterClient, HelpCenterExport, load_usage, merge_usage};
use tracing::info;

pub const STATE_FILE: &str = "console.json";

/// Flags that override the config file, one field at a time.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub article_pages: Option<u32>,
    pub usage_path: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub gemini_model: Option<String>,
}

pub fn resolve_config(path: Option<&Path>, flags: Overrides) -> anyhow::Result<HelpCenterConfig> {
    let mut config = HelpCenterConfig::load(path).context("loading config")?;
    if let Some(url) = flags.base_url {
        config.base_url = url;
    }
    if let Some(pages) = flags.article_pages {
        config.article_pages = pages;
    }
    if flags.usage_path.is_some() {
        config.usage_path = flags.usage_path;
    }
    if let Some(dir) = flags.state_dir {
        config.state_dir = dir;
    }
    if let Some(model) = flags.gemini_model {
        config.gemini_model = model;
    }
    Ok(config)
}

pub struct App {
    pub config: HelpCenterConfig,
    pub console: ConsoleStore,
    pipeline: Pipeline,
}

impl App {
    pub async fn open(config: HelpCenterConfig, rules: Option<&Path>) -> anyhow::Result<Self> {
        let state_path = config.state_dir.join(STATE_FILE);
        let store = FileStore::open(&state_path)
            .await
            .with_context(|| format!("opening state store {}", state_path.display()))?;
        let classifier = match rules {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("reading keyword rules {}", path.display()))?;
                let rules = KeywordRuleSet::from_json(&bytes)
                    .with_context(|| format!("parsing keyword rules {}", path.display()))?;
                info!(path = %path.display(), patterns = rules.summary().total_patterns, "loaded keyword rules");
                MetadataClassifier::new(rules)
            }
            None => MetadataClassifier::default(),
        };
        Ok(Self {
            config,
            console: ConsoleStore::new(store),
            pipeline: Pipeline::new(classifier),
        })
    }

    /// Raw articles from the help center, before the usage merge.
    pub async fn fetch(&self, from_file: Option<&Path>) -> anyhow::Result<Vec<RawArticle>> {
        match from_file {
            Some(path) => Ok(HelpCenterExport::load(path)
                .with_context(|| format!("loading export {}", path.display()))?
                .articles),
            None => {
                let client = HelpCenterClient::new(&self.config.base_url)?;
                Ok(client
                    .fetch_articles(self.config.article_pages)
                    .await
                    .with_context(|| format!("fetching articles from {}", client.base_url()))?)
            }
        }
    }

    /// Fetched articles with the usage feed merged in, when one is configured.
    pub async fn load_articles(&self, from_file: Option<&Path>) -> anyhow::Result<Vec<RawArticle>> {
        let articles = self.fetch(from_file).await?;
        let Some(usage_path) = &self.config.usage_path else {
            return Ok(articles);
        };
        let usage = load_usage(usage_path)
            .with_context(|| format!("loading usage feed {}", usage_path.display()))?;
        Ok(merge_usage(articles, &usage, &self.config.base_url))
    }

    /// Load, apply stored overrides, classify, and score.
    pub async fn evaluate(&self, from_file: Option<&Path>) -> anyhow::Result<Evaluation> {
        let raws = self.load_articles(from_file).await?;
        let overrides = self.console.load_overrides().await.context("loading overrides")?;
        Ok(self.pipeline.evaluate(&raws, &overrides, Utc::now()))
    }

    /// The saved threshold, else the configured one.
    pub async fn display_threshold(&self) -> anyhow::Result<DisplayThreshold> {
        Ok(self
            .console
            .saved_display_threshold()
            .await
            .context("reading display threshold")?
            .unwrap_or(self.config.display_threshold))
    }

    /// `flag` (typically from the environment) wins over the stored key.
    pub async fn gemini_api_key(&self, flag: Option<&str>) -> anyhow::Result<Option<String>> {
        if let Some(key) = flag.map(str::trim).filter(|k| !k.is_empty()) {
            return Ok(Some(key.to_string()));
        }
        Ok(self.console.gemini_api_key().await.context("reading API key")?)
    }
}

#[cfg(test)]
mod tests {
    use helpcenter_core::UsageRecord;

    use super::*;

    fn config_in(dir: &Path) -> HelpCenterConfig {
        HelpCenterConfig {
            state_dir: dir.join("state"),
            ..HelpCenterConfig::default()
        }
    }

    #[test]
    fn flags_override_config_fields() {
        let config = resolve_config(
            None,
            Overrides {
                base_url: Some("https://help.example.com/api/v2/help_center/fr".into()),
                article_pages: Some(7),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(config.base_url, "https://help.example.com/api/v2/help_center/fr");
        assert_eq!(config.article_pages, 7);
        assert_eq!(config.gemini_model, HelpCenterConfig::default().gemini_model);
    }

    #[test]
    fn flags_override_fields_from_the_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"article_pages": 3, "gemini_model": "from-file", "state_dir": "/tmp/from-file"}"#,
        )
        .unwrap();

        let untouched = resolve_config(Some(&path), Overrides::default()).unwrap();
        assert_eq!(untouched.article_pages, 3);
        assert_eq!(untouched.gemini_model, "from-file");

        let config = resolve_config(
            Some(&path),
            Overrides {
                article_pages: Some(9),
                gemini_model: Some("from-flag".into()),
                usage_path: Some(dir.path().join("usage.json")),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(config.article_pages, 9);
        assert_eq!(config.gemini_model, "from-flag");
        assert_eq!(config.usage_path, Some(dir.path().join("usage.json")));
        assert_eq!(config.state_dir, PathBuf::from("/tmp/from-file"));
    }

    #[tokio::test]
    async fn unparseable_base_url_fails_before_fetching() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = config_in(dir.path());
        config.base_url = "not a url".into();
        let app = App::open(config, None).await.unwrap();
        let err = app.fetch(None).await.unwrap_err();
        assert!(err.to_string().contains("not a url"), "{err}");
    }

    #[tokio::test]
    async fn evaluates_an_offline_export_with_usage() {
        let dir = tempfile::TempDir::new().unwrap();
        let export_path = dir.path().join("export.json");
        let mut raw = RawArticle::new("10", "Submit a reimbursement");
        raw.body = "<p>Employees submit reimbursements from the mobile app.</p>".into();
        raw.updated_at = Some(Utc::now());
        HelpCenterExport::new("https://support.example.com/api/v2/help_center/en-us", vec![raw])
            .save(&export_path)
            .unwrap();

        let usage_path = dir.path().join("usage.json");
        let usage = vec![
            UsageRecord {
                rank: 1,
                title: "Submit a reimbursement".into(),
                views: 900,
                upvotes: 9,
                downvotes: 1,
            },
            UsageRecord {
                rank: 2,
                title: "Card declines".into(),
                views: 400,
                upvotes: 1,
                downvotes: 3,
            },
        ];
        std::fs::write(&usage_path, serde_json::to_vec(&usage).unwrap()).unwrap();

        let mut config = config_in(dir.path());
        config.usage_path = Some(usage_path);
        let app = App::open(config, None).await.unwrap();
        let eval = app.evaluate(Some(&export_path)).await.unwrap();

        assert_eq!(eval.articles.len(), 2);
        assert_eq!(eval.articles[0].votes.total, 10);
        assert!(eval.articles[1].is_placeholder());
        assert_eq!(eval.chunks.len(), 1);
        assert!(eval.chunks[0].allowed_for_ai);
    }

    #[tokio::test]
    async fn saved_threshold_beats_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = config_in(dir.path());
        config.display_threshold = DisplayThreshold::from_percent(80);
        let app = App::open(config, None).await.unwrap();
        assert_eq!(app.display_threshold().await.unwrap().percent(), 80);
        app.console.set_display_threshold(55).await.unwrap();
        assert_eq!(app.display_threshold().await.unwrap().percent(), 55);
    }

    #[tokio::test]
    async fn api_key_flag_beats_stored_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let app = App::open(config_in(dir.path()), None).await.unwrap();
        app.console.set_gemini_api_key("stored").await.unwrap();
        assert_eq!(app.gemini_api_key(Some("env")).await.unwrap().as_deref(), Some("env"));
        assert_eq!(app.gemini_api_key(Some("  ")).await.unwrap().as_deref(), Some("stored"));
        assert_eq!(app.gemini_api_key(None).await.unwrap().as_deref(), Some("stored"));
    }
}
