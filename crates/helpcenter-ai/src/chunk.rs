//! AI-retrieval chunks: the projection of an article an assistant may cite.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use helpcenter_core::text::strip_html;
use helpcenter_core::{ClassifiedArticle, JourneyStage, Persona, Region, ServiceTier};
use serde::{Deserialize, Serialize};

use crate::scoring::confidence::ConfidenceBreakdown;
use crate::scoring::gate::ApprovalChecks;
use crate::scoring::{ScoredArticle, score};

/// Maximum characters of stripped body kept as a chunk summary.
pub const SUMMARY_CHARS: usize = 280;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub summary: String,
    pub persona: BTreeSet<Persona>,
    pub service_tier: BTreeSet<ServiceTier>,
    pub feature_area: BTreeSet<String>,
    pub integrations: BTreeSet<String>,
    pub regions: BTreeSet<Region>,
    pub journey_stage: JourneyStage,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub vote_total: u64,
    pub positivity: Option<f64>,
    pub confidence: f64,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub approval_checks: ApprovalChecks,
    pub allowed_for_ai: bool,
}

impl Chunk {
    /// Project a scored article. `None` for placeholders and empty bodies.
    pub fn from_scored(scored: &ScoredArticle) -> Option<Self> {
        let article = &scored.article;
        if article.raw.is_placeholder || strip_html(&article.raw.body).is_empty() {
            return None;
        }
        let approval_checks = ApprovalChecks::evaluate(article, &scored.votes, scored.confidence);
        Some(Self {
            id: article.raw.id.clone(),
            title: article.raw.title.clone(),
            url: article.raw.html_url.clone(),
            summary: scored.summary.clone(),
            persona: article.persona.clone(),
            service_tier: article.service_tier.clone(),
            feature_area: article.feature_area.clone(),
            integrations: article.integrations.clone(),
            regions: article.regions.clone(),
            journey_stage: article.journey_stage,
            last_reviewed: article.raw.updated_at,
            vote_total: scored.votes.total,
            positivity: scored.votes.positivity,
            confidence: scored.confidence,
            confidence_breakdown: scored.breakdown,
            allowed_for_ai: approval_checks.allowed(),
            approval_checks,
        })
    }
}

/// Score `article` and project it as a chunk.
pub fn build_chunk(article: &ClassifiedArticle, now: DateTime<Utc>) -> Option<Chunk> {
    Chunk::from_scored(&score(article.clone(), now))
}

#[cfg(test)]
mod tests {
    use helpcenter_core::RawArticle;

    use super::*;
    use crate::MetadataClassifier;

    fn classified(body: &str) -> ClassifiedArticle {
        let mut raw = RawArticle::new("55", "Connect NetSuite");
        raw.body = body.to_string();
        raw.vote_count = 12;
        raw.vote_sum = 10;
        raw.html_url = Some("https://support.example.com/articles/55".into());
        MetadataClassifier::default().classify(raw)
    }

    #[test]
    fn chunk_carries_tags_and_gate() {
        let now = Utc::now();
        let mut article = classified("<p>Sync bills with NetSuite.</p>");
        article.raw.updated_at = Some(now);
        let chunk = build_chunk(&article, now).unwrap();
        assert_eq!(chunk.id, "55");
        assert_eq!(chunk.summary, "Sync bills with NetSuite.");
        assert!(chunk.integrations.contains("netsuite"));
        assert_eq!(chunk.vote_total, 12);
        assert!(chunk.allowed_for_ai);
        assert_eq!(chunk.allowed_for_ai, chunk.approval_checks.allowed());
    }

    #[test]
    fn empty_body_yields_no_chunk() {
        assert!(build_chunk(&classified(""), Utc::now()).is_none());
        assert!(build_chunk(&classified("<p> </p><br/>"), Utc::now()).is_none());
    }

    #[test]
    fn placeholder_yields_no_chunk() {
        let mut raw = RawArticle::new("usage-1", "Card limits");
        raw.is_placeholder = true;
        let article = MetadataClassifier::default().classify(raw);
        assert!(build_chunk(&article, Utc::now()).is_none());
    }

    #[test]
    fn long_body_is_trimmed_to_summary() {
        let body = format!("<p>{}</p>", "reconcile transactions ".repeat(40));
        let chunk = build_chunk(&classified(&body), Utc::now()).unwrap();
        assert!(chunk.summary.chars().count() <= SUMMARY_CHARS + 1);
        assert!(chunk.summary.ends_with('…'));
    }

    #[test]
    fn undated_chunk_is_not_allowed() {
        let chunk = build_chunk(&classified("<p>Sync bills.</p>"), Utc::now()).unwrap();
        assert!(!chunk.approval_checks.is_recent_enough);
        assert!(!chunk.allowed_for_ai);
    }
}
