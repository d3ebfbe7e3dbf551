//! Operator-console state on top of a [`KeyValueStore`].
//!
//! Keys:
//! - `override/{article_id}`: JSON-encoded [`ArticleOverride`]
//! - `settings/display_threshold`: integer percent
//! - `settings/gemini_api_key`: generative API key

use std::sync::Arc;

use helpcenter_core::{ArticleOverride, DisplayThreshold, OverrideMap};
use tracing::{info, warn};

use crate::{KeyValueStore, StoreError};

pub const OVERRIDE_PREFIX: &str = "override/";
pub const THRESHOLD_KEY: &str = "settings/display_threshold";
pub const GEMINI_KEY_KEY: &str = "settings/gemini_api_key";

#[derive(Clone)]
pub struct ConsoleStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ConsoleStore {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Arc::new(kv) }
    }

    fn override_key(id: &str) -> String {
        format!("{OVERRIDE_PREFIX}{id}")
    }

    pub async fn get_override(&self, id: &str) -> Result<Option<ArticleOverride>, StoreError> {
        match self.kv.get(&Self::override_key(id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Store `edit` as the complete override for `id`. An empty override
    /// removes the entry.
    pub async fn save_override(&self, id: &str, edit: &ArticleOverride) -> Result<(), StoreError> {
        if edit.is_empty() {
            self.remove_override(id).await?;
            return Ok(());
        }
        let json = serde_json::to_string(edit)?;
        self.kv.put(&Self::override_key(id), json).await?;
        info!(id, "saved override");
        Ok(())
    }

    /// Merge `edit` into any stored override for `id` and save the result.
    pub async fn update_override(
        &self,
        id: &str,
        edit: ArticleOverride,
    ) -> Result<ArticleOverride, StoreError> {
        let mut merged = self.get_override(id).await?.unwrap_or_default();
        merged.merge(edit);
        self.save_override(id, &merged).await?;
        Ok(merged)
    }

    pub async fn remove_override(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.kv.delete(&Self::override_key(id)).await?;
        if removed {
            info!(id, "cleared override");
        }
        Ok(removed)
    }

    /// Ids with a stored override, sorted.
    pub async fn override_ids(&self) -> Result<Vec<String>, StoreError> {
        let keys = self.kv.keys(OVERRIDE_PREFIX).await?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(OVERRIDE_PREFIX).map(str::to_string))
            .collect())
    }

    /// Every stored override. Undecodable entries are skipped with a warning
    /// so one bad record cannot block a refresh.
    pub async fn load_overrides(&self) -> Result<OverrideMap, StoreError> {
        let mut map = OverrideMap::new();
        for id in self.override_ids().await? {
            match self.get_override(&id).await {
                Ok(Some(edit)) => {
                    map.insert(id, edit);
                }
                Ok(None) => {}
                Err(StoreError::Json(e)) => warn!(id, error = %e, "skipping unreadable override"),
                Err(e) => return Err(e),
            }
        }
        Ok(map)
    }

    /// The saved display threshold, if one was ever saved.
    pub async fn saved_display_threshold(&self) -> Result<Option<DisplayThreshold>, StoreError> {
        let Some(raw) = self.kv.get(THRESHOLD_KEY).await? else {
            return Ok(None);
        };
        raw.trim()
            .parse::<i64>()
            .map(|p| Some(DisplayThreshold::from_percent(p)))
            .map_err(|e| StoreError::Invalid {
                key: THRESHOLD_KEY.to_string(),
                reason: e.to_string(),
            })
    }

    /// Save a threshold, clamped to `[0, 100]`. Returns the stored value.
    pub async fn set_display_threshold(&self, percent: i64) -> Result<DisplayThreshold, StoreError> {
        let threshold = DisplayThreshold::from_percent(percent);
        self.kv
            .put(THRESHOLD_KEY, threshold.percent().to_string())
            .await?;
        info!(percent = threshold.percent(), "saved display threshold");
        Ok(threshold)
    }

    pub async fn gemini_api_key(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .kv
            .get(GEMINI_KEY_KEY)
            .await?
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()))
    }

    /// Save the key; an empty value clears it.
    pub async fn set_gemini_api_key(&self, key: &str) -> Result<(), StoreError> {
        let key = key.trim();
        if key.is_empty() {
            self.kv.delete(GEMINI_KEY_KEY).await?;
            info!("cleared generative API key");
        } else {
            self.kv.put(GEMINI_KEY_KEY, key.to_string()).await?;
            info!(len = key.len(), "saved generative API key");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use helpcenter_core::Persona;

    use super::*;
    use crate::{FileStore, MemoryStore};

    fn persona_edit() -> ArticleOverride {
        ArticleOverride {
            persona: Some(BTreeSet::from([Persona::Vendor])),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn override_lifecycle() {
        let console = ConsoleStore::new(MemoryStore::new());
        console.save_override("42", &persona_edit()).await.unwrap();
        assert_eq!(console.get_override("42").await.unwrap(), Some(persona_edit()));
        assert_eq!(console.override_ids().await.unwrap(), ["42"]);

        let merged = console
            .update_override(
                "42",
                ArticleOverride {
                    title: Some("Vendor onboarding".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(merged.title.as_deref(), Some("Vendor onboarding"));
        assert!(merged.persona.is_some());

        assert!(console.remove_override("42").await.unwrap());
        assert!(console.load_overrides().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_override_clears_entry() {
        let console = ConsoleStore::new(MemoryStore::new());
        console.save_override("1", &persona_edit()).await.unwrap();
        console.save_override("1", &ArticleOverride::default()).await.unwrap();
        assert_eq!(console.get_override("1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_override_is_skipped() {
        let kv = Arc::new(MemoryStore::new());
        kv.put("override/bad", "{not json".into()).await.unwrap();
        let console = ConsoleStore::new(kv);
        console.save_override("good", &persona_edit()).await.unwrap();
        let map = console.load_overrides().await.unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("good"));
    }

    #[tokio::test]
    async fn threshold_defaults_and_clamps() {
        let console = ConsoleStore::new(MemoryStore::new());
        assert_eq!(console.saved_display_threshold().await.unwrap(), None);
        let saved = console.set_display_threshold(140).await.unwrap();
        assert_eq!(saved.percent(), 100);
        assert_eq!(console.saved_display_threshold().await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn garbage_threshold_is_invalid() {
        let kv = Arc::new(MemoryStore::new());
        kv.put(THRESHOLD_KEY, "lots".into()).await.unwrap();
        let console = ConsoleStore::new(kv);
        let err = console.saved_display_threshold().await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid { .. }));
    }

    #[tokio::test]
    async fn api_key_set_and_clear() {
        let console = ConsoleStore::new(MemoryStore::new());
        assert_eq!(console.gemini_api_key().await.unwrap(), None);
        console.set_gemini_api_key("  AIzaSecret ").await.unwrap();
        assert_eq!(console.gemini_api_key().await.unwrap().as_deref(), Some("AIzaSecret"));
        console.set_gemini_api_key("").await.unwrap();
        assert_eq!(console.gemini_api_key().await.unwrap(), None);
    }

    #[tokio::test]
    async fn overrides_persist_in_file_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let console = ConsoleStore::new(FileStore::open(&path).await.unwrap());
        console.save_override("7", &persona_edit()).await.unwrap();
        drop(console);

        let console = ConsoleStore::new(FileStore::open(&path).await.unwrap());
        let map = console.load_overrides().await.unwrap();
        assert_eq!(map.get("7"), Some(&persona_edit()));
    }
}
