//! Batch evaluation: override merge, classification, scoring, chunking.
//!
//! Every article in a batch is scored against one clock reading so that
//! article scores and chunk gates agree on recency.

use chrono::{DateTime, Utc};
use helpcenter_core::{ArticleOverride, OverrideMap, RawArticle};
use rayon::prelude::*;
use tracing::info;

use crate::MetadataClassifier;
use crate::chunk::Chunk;
use crate::scoring::{ScoredArticle, score};

/// Result of one refresh.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Scored articles, in input order.
    pub articles: Vec<ScoredArticle>,
    /// Chunks for every article with body text, in input order.
    pub chunks: Vec<Chunk>,
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn allowed_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter().filter(|c| c.allowed_for_ai)
    }

    pub fn article(&self, id: &str) -> Option<&ScoredArticle> {
        self.articles.iter().find(|a| a.article.raw.id == id)
    }
}

#[derive(Clone, Default)]
pub struct Pipeline {
    classifier: MetadataClassifier,
}

impl Pipeline {
    pub fn new(classifier: MetadataClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &MetadataClassifier {
        &self.classifier
    }

    /// Run one article through override merge, classification, and scoring.
    pub fn evaluate_one(
        &self,
        raw: &RawArticle,
        edit: Option<&ArticleOverride>,
        now: DateTime<Utc>,
    ) -> ScoredArticle {
        let edited = match edit {
            Some(o) => o.apply_to_raw(raw),
            None => raw.clone(),
        };
        let mut article = self.classifier.classify(edited);
        if let Some(o) = edit {
            o.pin_tags(&mut article);
        }
        score(article, now)
    }

    /// Evaluate a batch in parallel against a single clock reading.
    pub fn evaluate(
        &self,
        raws: &[RawArticle],
        overrides: &OverrideMap,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let articles: Vec<ScoredArticle> = raws
            .par_iter()
            .map(|raw| self.evaluate_one(raw, overrides.get(&raw.id), now))
            .collect();
        let chunks: Vec<Chunk> = articles.par_iter().filter_map(Chunk::from_scored).collect();

        let allowed = chunks.iter().filter(|c| c.allowed_for_ai).count();
        info!(
            articles = articles.len(),
            chunks = chunks.len(),
            allowed,
            overrides = overrides.len(),
            "evaluated batch"
        );

        Evaluation {
            articles,
            chunks,
            evaluated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Duration;
    use helpcenter_core::{Persona, ServiceTier};

    use super::*;

    fn raw(id: &str, title: &str, body: &str) -> RawArticle {
        let mut raw = RawArticle::new(id, title);
        raw.body = body.to_string();
        raw
    }

    #[test]
    fn batch_preserves_order_and_skips_empty_bodies() {
        let now = Utc::now();
        let raws = vec![
            raw("1", "Order cards", "<p>Order a physical card.</p>"),
            raw("2", "Empty", ""),
            raw("3", "Submit receipts", "<p>Upload a receipt from the mobile app.</p>"),
        ];
        let eval = Pipeline::default().evaluate(&raws, &OverrideMap::new(), now);
        let ids: Vec<&str> = eval.articles.iter().map(|a| a.article.id()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        let chunk_ids: Vec<&str> = eval.chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(chunk_ids, ["1", "3"]);
        assert_eq!(eval.evaluated_at, now);
    }

    #[test]
    fn body_override_changes_classification() {
        let now = Utc::now();
        let source = raw("9", "Weekly digest", "");
        let edit = ArticleOverride {
            body: Some("<p>Configure Okta SSO.</p>".into()),
            ..Default::default()
        };
        let scored = Pipeline::default().evaluate_one(&source, Some(&edit), now);
        assert!(scored.article.integrations.contains("okta"));
        assert!(scored.article.persona.contains(&Persona::It));
        // the stored raw article is untouched
        assert!(source.body.is_empty());
    }

    #[test]
    fn pinned_tags_survive_classification() {
        let now = Utc::now();
        let mut source = raw("4", "Approval policies", "<p>Set approval rules.</p>");
        source.vote_count = 20;
        source.vote_sum = 20;
        source.updated_at = Some(now - Duration::days(1));
        let edit = ArticleOverride {
            persona: Some(BTreeSet::from([Persona::Bookkeeper])),
            service_tier: Some(BTreeSet::from([ServiceTier::Plus])),
            ..Default::default()
        };
        let mut overrides = OverrideMap::new();
        overrides.insert("4".into(), edit);

        let eval = Pipeline::default().evaluate(&[source], &overrides, now);
        let scored = &eval.articles[0];
        assert_eq!(scored.article.persona, BTreeSet::from([Persona::Bookkeeper]));
        assert!(scored.article.is_plus_only);
        let chunk = &eval.chunks[0];
        assert!(!chunk.approval_checks.is_plus_eligible);
        assert!(!chunk.allowed_for_ai);
        assert_eq!(eval.allowed_chunks().count(), 0);
    }

    #[test]
    fn lookup_by_id() {
        let eval = Pipeline::default().evaluate(
            &[raw("a", "First", "<p>x</p>")],
            &OverrideMap::new(),
            Utc::now(),
        );
        assert!(eval.article("a").is_some());
        assert!(eval.article("b").is_none());
    }
}
