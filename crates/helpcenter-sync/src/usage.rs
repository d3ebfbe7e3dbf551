//! Usage-feed merge.
//!
//! Usage records carry views and votes keyed by article title. A record
//! whose normalised title matches an article overwrites that article's vote
//! counts; the rest become placeholder articles so high-traffic topics stay
//! visible even when their content was not exported.

use std::collections::HashMap;
use std::path::Path;

use helpcenter_core::text::normalize;
use helpcenter_core::{RawArticle, UsageRecord};
use reqwest::Url;
use tracing::{info, warn};

use crate::SyncError;

/// Read a usage feed: a JSON array of [`UsageRecord`]s.
pub fn load_usage(path: &Path) -> Result<Vec<UsageRecord>, SyncError> {
    let bytes = std::fs::read(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<UsageRecord> = serde_json::from_slice(&bytes)?;
    info!(path = %path.display(), count = records.len(), "loaded usage feed");
    Ok(records)
}

/// Reader-facing search page for `title`, derived from the API locale root
/// (`https://host/api/v2/help_center/en-us` → `https://host/hc/en-us/search?query=…`).
pub fn search_url(base_url: &str, title: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let locale = base
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .unwrap_or("en-us");
    let mut url = base.join(&format!("/hc/{locale}/search")).ok()?;
    url.query_pairs_mut().append_pair("query", title);
    Some(url.to_string())
}

fn placeholder(record: &UsageRecord, base_url: &str) -> RawArticle {
    let mut raw = RawArticle::new(format!("usage-{}", record.rank), record.title.clone());
    raw.vote_count = record.vote_count();
    raw.vote_sum = record.vote_sum();
    raw.views_30d = Some(record.views);
    raw.html_url = search_url(base_url, &record.title);
    raw.is_placeholder = true;
    raw
}

/// Merge `usage` into `articles`. Matched articles take the usage vote
/// counts and views; unmatched records are appended as placeholders in feed
/// order. When two records share a title the later one wins.
pub fn merge_usage(
    mut articles: Vec<RawArticle>,
    usage: &[UsageRecord],
    base_url: &str,
) -> Vec<RawArticle> {
    let mut order: Vec<String> = Vec::new();
    let mut by_title: HashMap<String, (&UsageRecord, bool)> = HashMap::new();
    for record in usage {
        let key = normalize(&record.title);
        if by_title.insert(key.clone(), (record, false)).is_some() {
            warn!(title = %record.title, "duplicate usage title; keeping the later record");
        } else {
            order.push(key);
        }
    }

    let mut matched = 0;
    for article in &mut articles {
        if let Some((record, seen)) = by_title.get_mut(&normalize(&article.title)) {
            article.vote_count = record.vote_count();
            article.vote_sum = record.vote_sum();
            article.views_30d = Some(record.views);
            *seen = true;
            matched += 1;
        }
    }

    let before = articles.len();
    articles.extend(
        order
            .iter()
            .filter_map(|key| by_title.get(key))
            .filter(|(_, seen)| !seen)
            .map(|(record, _)| placeholder(record, base_url)),
    );
    info!(
        matched,
        placeholders = articles.len() - before,
        records = usage.len(),
        "merged usage feed"
    );
    articles
}
