//! HTTP client for the Zendesk help-center API.
//!
//! Lists are paginated with `per_page`/`page` and a `next_page` link. Articles
//! are joined to their section and the section's category so the classifier
//! sees both names.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use helpcenter_core::{Category, RawArticle, Section};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::SyncError;

pub const PER_PAGE: u32 = 100;
pub const CATEGORY_PAGES: u32 = 1;
pub const SECTION_PAGES: u32 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct ZendeskArticle {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub vote_sum: i64,
    #[serde(default)]
    pub label_names: Vec<String>,
    #[serde(default)]
    pub section_id: Option<u64>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZendeskSection {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZendeskCategory {
    pub id: u64,
    pub name: String,
}

/// One page of a list endpoint: the items under `key` plus the next link.
pub fn parse_page<T: DeserializeOwned>(
    mut page: serde_json::Value,
    key: &str,
) -> Result<(Vec<T>, Option<String>), SyncError> {
    let items = match page.get_mut(key).map(serde_json::Value::take) {
        Some(serde_json::Value::Null) | None => Vec::new(),
        Some(value) => serde_json::from_value(value)?,
    };
    let next = page
        .get("next_page")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok((items, next))
}

/// Attach section and category names to each article.
pub fn join_articles(
    articles: Vec<ZendeskArticle>,
    sections: &[ZendeskSection],
    categories: &[ZendeskCategory],
) -> Vec<RawArticle> {
    let section_map: HashMap<u64, &ZendeskSection> = sections.iter().map(|s| (s.id, s)).collect();
    let category_map: HashMap<u64, &ZendeskCategory> =
        categories.iter().map(|c| (c.id, c)).collect();

    articles
        .into_iter()
        .map(|a| {
            let section = a.section_id.and_then(|id| section_map.get(&id).copied());
            let category = section
                .and_then(|s| s.category_id)
                .and_then(|id| category_map.get(&id).copied());
            RawArticle {
                id: a.id.to_string(),
                title: a.title,
                body: a.body.unwrap_or_default(),
                updated_at: a.updated_at,
                vote_count: a.vote_count,
                vote_sum: a.vote_sum,
                label_names: a.label_names,
                section: section.map(|s| Section {
                    name: s.name.clone(),
                }),
                category: category.map(|c| Category {
                    name: c.name.clone(),
                }),
                html_url: a.html_url,
                views_30d: None,
                is_placeholder: false,
            }
        })
        .collect()
}

/// Client for one help-center locale root.
pub struct HelpCenterClient {
    client: reqwest::Client,
    base_url: String,
}

impl HelpCenterClient {
    /// `base_url` is the locale root, e.g.
    /// `https://example.zendesk.com/api/v2/help_center/en-us`. It must be an
    /// absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let invalid = |reason: String| SyncError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = reqwest::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", parsed.scheme())));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn first_page_url(&self, path: &str) -> String {
        format!("{}/{path}.json?per_page={PER_PAGE}&page=1", self.base_url)
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, SyncError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    /// Follow `next_page` links for up to `max_pages` pages.
    pub async fn fetch_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        max_pages: u32,
    ) -> Result<Vec<T>, SyncError> {
        let mut results = Vec::new();
        let mut next = Some(self.first_page_url(path));
        let mut page = 1;
        while let Some(url) = next.take() {
            if page > max_pages {
                break;
            }
            debug!(url = %url, page, "fetching page");
            let (items, next_page) = parse_page::<T>(self.get_json(&url).await?, key)?;
            results.extend(items);
            next = next_page;
            page += 1;
        }
        info!(path, count = results.len(), pages = page - 1, "fetched list");
        Ok(results)
    }

    /// Fetch categories, sections, and up to `article_pages` pages of
    /// articles concurrently, then join them.
    pub async fn fetch_articles(&self, article_pages: u32) -> Result<Vec<RawArticle>, SyncError> {
        let (categories, sections, articles) = tokio::try_join!(
            self.fetch_paginated::<ZendeskCategory>("categories", "categories", CATEGORY_PAGES),
            self.fetch_paginated::<ZendeskSection>("sections", "sections", SECTION_PAGES),
            self.fetch_paginated::<ZendeskArticle>("articles", "articles", article_pages),
        )?;
        let joined = join_articles(articles, &sections, &categories);
        info!(
            articles = joined.len(),
            sections = sections.len(),
            categories = categories.len(),
            "help center fetched"
        );
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLES_PAGE: &str = r#"{
        "articles": [
            {
                "id": 101,
                "title": "Set up Okta SSO",
                "body": "<p>Configure Okta.</p>",
                "updated_at": "2025-02-10T08:30:00Z",
                "vote_count": 12,
                "vote_sum": 8,
                "label_names": ["sso"],
                "section_id": 11,
                "html_url": "https://support.example.com/hc/en-us/articles/101"
            },
            {
                "id": 102,
                "title": "Orphan article",
                "body": null,
                "section_id": 99
            }
        ],
        "next_page": "https://support.example.com/api/v2/help_center/en-us/articles.json?page=2",
        "page": 1
    }"#;

    #[test]
    fn parses_article_page() {
        let value: serde_json::Value = serde_json::from_str(ARTICLES_PAGE).unwrap();
        let (items, next) = parse_page::<ZendeskArticle>(value, "articles").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].vote_sum, 8);
        assert!(items[1].body.is_none());
        assert_eq!(items[1].vote_count, 0);
        assert!(next.unwrap().ends_with("page=2"));
    }

    #[test]
    fn last_page_has_no_next() {
        let value = serde_json::json!({"sections": [], "next_page": null});
        let (items, next) = parse_page::<ZendeskSection>(value, "sections").unwrap();
        assert!(items.is_empty());
        assert!(next.is_none());
    }

    #[test]
    fn missing_key_is_empty_page() {
        let value = serde_json::json!({"count": 0});
        let (items, _) = parse_page::<ZendeskCategory>(value, "categories").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn malformed_items_are_an_error() {
        let value = serde_json::json!({"categories": [{"id": "x"}]});
        let err = parse_page::<ZendeskCategory>(value, "categories").unwrap_err();
        assert!(matches!(err, SyncError::Json(_)));
    }

    #[test]
    fn join_attaches_section_and_category() {
        let value: serde_json::Value = serde_json::from_str(ARTICLES_PAGE).unwrap();
        let (articles, _) = parse_page::<ZendeskArticle>(value, "articles").unwrap();
        let sections = vec![ZendeskSection {
            id: 11,
            name: "Security".into(),
            category_id: Some(1),
        }];
        let categories = vec![ZendeskCategory {
            id: 1,
            name: "Getting started".into(),
        }];
        let joined = join_articles(articles, &sections, &categories);
        assert_eq!(joined[0].id, "101");
        assert_eq!(joined[0].section_name(), Some("Security"));
        assert_eq!(joined[0].category_name(), Some("Getting started"));
        assert_eq!(joined[1].section, None);
        assert_eq!(joined[1].body, "");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client =
            HelpCenterClient::new("https://support.example.com/api/v2/help_center/en-us/").unwrap();
        assert_eq!(
            client.first_page_url("articles"),
            "https://support.example.com/api/v2/help_center/en-us/articles.json?per_page=100&page=1"
        );
    }

    #[test]
    fn client_rejects_unusable_base_urls() {
        for bad in ["support.example.com/api", "ftp://support.example.com/hc", ""] {
            let err = HelpCenterClient::new(bad).err().unwrap();
            assert!(matches!(err, SyncError::InvalidUrl { .. }), "{bad}");
        }
    }
}
