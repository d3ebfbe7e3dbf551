//! Per-article scoring: vote recovery, confidence, and the eligibility gate.

pub mod confidence;
pub mod gate;
pub mod votes;

use chrono::{DateTime, Utc};
use helpcenter_core::ClassifiedArticle;
use helpcenter_core::text::{strip_html, summarize};
use serde::Serialize;

use crate::chunk::SUMMARY_CHARS;
use confidence::ConfidenceBreakdown;
use votes::Votes;

/// Preview text for usage-only placeholders, which carry no body.
pub const PLACEHOLDER_SUMMARY: &str = "Usage data available; article content not yet ingested. \
     Follow the link to view the full article.";

/// A classified article with its vote and confidence derivations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredArticle {
    pub article: ClassifiedArticle,
    pub votes: Votes,
    pub confidence: f64,
    pub breakdown: ConfidenceBreakdown,
    /// Stripped, word-trimmed body preview.
    pub summary: String,
}

impl ScoredArticle {
    pub fn recency_days(&self) -> Option<f64> {
        self.breakdown.recency_days
    }

    pub fn is_placeholder(&self) -> bool {
        self.article.raw.is_placeholder
    }
}

/// Score an article against the batch clock reading `now`. Total.
pub fn score(article: ClassifiedArticle, now: DateTime<Utc>) -> ScoredArticle {
    let votes = Votes::from_raw(&article.raw);
    let breakdown = confidence::compute_breakdown(&votes, article.raw.updated_at, now);
    let summary = if article.raw.is_placeholder {
        PLACEHOLDER_SUMMARY.to_string()
    } else {
        summarize(&strip_html(&article.raw.body), SUMMARY_CHARS)
    };
    ScoredArticle {
        confidence: breakdown.confidence,
        article,
        votes,
        breakdown,
        summary,
    }
}
