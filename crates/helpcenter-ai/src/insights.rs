//! Operator-console queues: articles that need attention, and why.
//!
//! Urgency blends vote volume, negativity, and age. Placeholders are left
//! out; they have no content to fix. Articles without a timestamp contribute
//! no age terms and never enter the stale queue.

use std::cmp::Ordering;

use serde::Serialize;

use crate::scoring::ScoredArticle;
use crate::scoring::votes::Votes;

pub const QUEUE_LEN: usize = 6;
pub const ALERT_MIN_VOTES: u64 = 5;
pub const ALERT_POSITIVITY: f64 = 0.6;
pub const STALE_AFTER_DAYS: f64 = 90.0;
pub const OUTDATED_AFTER_DAYS: f64 = 120.0;
const LOW_POSITIVITY: f64 = 0.5;

pub struct KeywordHint {
    pub keywords: &'static [&'static str],
    pub message: &'static str,
}

/// Editorial suggestions keyed on summary text; the first match wins.
pub const KEYWORD_HINTS: &[KeywordHint] = &[
    KeywordHint {
        keywords: &["login", "password", "sso", "mfa"],
        message: "Clarify SSO vs password flows and add a quick recovery checklist with screenshots of the current UI.",
    },
    KeywordHint {
        keywords: &["reimburse", "reimbursement", "expense report"],
        message: "Spell out reimbursement approval timelines, include bank-linking steps, and note how employees track payout status.",
    },
    KeywordHint {
        keywords: &["receipt", "memo", "compliance"],
        message: "Add an at-a-glance list of acceptable receipts, examples, and how auto-matching works to reduce back-and-forth.",
    },
    KeywordHint {
        keywords: &["bill", "vendor", "payment"],
        message: "Call out ACH vs check timelines, fee scenarios, and vendor portal notifications to set expectations.",
    },
    KeywordHint {
        keywords: &["travel", "flight", "hotel"],
        message: "Summarise travel policy thresholds, approval SLA, and link to in-app booking flow for faster execution.",
    },
    KeywordHint {
        keywords: &["integration", "sync", "quickbooks", "netsuite", "xero", "intacct"],
        message: "Provide a troubleshooting table for common sync failures and specify version prerequisites or permissions.",
    },
];

const NO_FEEDBACK: &str =
    "No recent feedback yet. Prompt internal teams or release notes to collect sentiment.";
const FALLBACK: &str = "Add a short \"What changed\" callout and link to the most common next step to reduce navigation time.";

/// One article in an operator queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueueItem<'a> {
    #[serde(skip)]
    pub article: &'a ScoredArticle,
    pub id: &'a str,
    pub title: &'a str,
    pub votes: Votes,
    pub urgency: f64,
    /// Whole days since the last update, when known.
    pub age_days: Option<u64>,
    pub insight: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OpsQueues<'a> {
    /// Negative or heavily voted articles, most urgent first.
    pub alerts: Vec<QueueItem<'a>>,
    /// Articles untouched for over 90 days, oldest first.
    pub stale: Vec<QueueItem<'a>>,
}

/// `total/10 + (1 − positivity)·5 + days/45`, omitting unknown terms.
pub fn urgency(votes: &Votes, recency_days: Option<f64>) -> f64 {
    let negativity = votes.positivity.map_or(0.0, |p| (1.0 - p) * 5.0);
    let age = recency_days.map_or(0.0, |d| d / 45.0);
    votes.total as f64 / 10.0 + negativity + age
}

/// Editorial guidance for an article, as one paragraph.
pub fn insight_for(scored: &ScoredArticle) -> String {
    let votes = &scored.votes;
    let mut insights: Vec<String> = Vec::new();

    match votes.positivity {
        Some(p) if votes.total > 0 && p < LOW_POSITIVITY => insights.push(format!(
            "Only {}% of {} votes are positive; investigate the main failure reasons customers cite.",
            (p * 100.0).round() as u32,
            votes.total
        )),
        _ if votes.total == 0 => insights.push(NO_FEEDBACK.to_string()),
        _ => {}
    }

    if let Some(days) = scored.recency_days()
        && days > OUTDATED_AFTER_DAYS
    {
        insights.push(format!(
            "Content is {} days old; confirm policies and UI labels still reflect current product.",
            days.round() as u64
        ));
    }

    let summary = scored.summary.to_lowercase();
    let hint = KEYWORD_HINTS
        .iter()
        .find(|h| h.keywords.iter().any(|k| summary.contains(k)));
    match hint {
        Some(h) => insights.push(h.message.to_string()),
        None if insights.len() < 2 => insights.push(FALLBACK.to_string()),
        None => {}
    }

    insights.join(" ")
}

/// Build the alert and stale queues from a filtered article set.
pub fn build_ops_queues<'a>(
    articles: impl IntoIterator<Item = &'a ScoredArticle>,
) -> OpsQueues<'a> {
    let items: Vec<QueueItem<'a>> = articles
        .into_iter()
        .filter(|a| !a.is_placeholder())
        .map(|a| QueueItem {
            article: a,
            id: &a.article.raw.id,
            title: &a.article.raw.title,
            votes: a.votes,
            urgency: urgency(&a.votes, a.recency_days()),
            age_days: a.recency_days().map(|d| d.round() as u64),
            insight: insight_for(a),
        })
        .collect();

    let mut alerts: Vec<QueueItem<'a>> = items
        .iter()
        .filter(|i| {
            i.votes.total > ALERT_MIN_VOTES
                || i.votes.positivity.is_none_or(|p| p < ALERT_POSITIVITY)
        })
        .cloned()
        .collect();
    alerts.sort_by(|a, b| desc(a.urgency, b.urgency));
    alerts.truncate(QUEUE_LEN);

    let mut stale: Vec<QueueItem<'a>> = items
        .into_iter()
        .filter(|i| i.article.recency_days().is_some_and(|d| d > STALE_AFTER_DAYS))
        .collect();
    stale.sort_by(|a, b| {
        desc(
            a.article.recency_days().unwrap_or(0.0),
            b.article.recency_days().unwrap_or(0.0),
        )
    });
    stale.truncate(QUEUE_LEN);

    OpsQueues { alerts, stale }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use helpcenter_core::RawArticle;

    use super::*;
    use crate::MetadataClassifier;
    use crate::scoring::score;
    use crate::scoring::votes::derive_votes;

    fn scored(id: &str, body: &str, total: i64, sum: i64, age: Option<i64>) -> ScoredArticle {
        let now = Utc::now();
        let mut raw = RawArticle::new(id, format!("Article {id}"));
        raw.body = body.to_string();
        raw.vote_count = total;
        raw.vote_sum = sum;
        raw.updated_at = age.map(|d| now - Duration::days(d));
        score(MetadataClassifier::default().classify(raw), now)
    }

    #[test]
    fn urgency_terms() {
        let votes = derive_votes(10, 0); // 5 up, 5 down
        assert!((urgency(&votes, Some(90.0)) - (1.0 + 2.5 + 2.0)).abs() < 1e-9);
        assert_eq!(urgency(&derive_votes(0, 0), None), 0.0);
    }

    #[test]
    fn low_positivity_insight() {
        let article = scored("1", "<p>Nothing relevant.</p>", 10, -6, Some(1));
        let text = insight_for(&article);
        assert!(text.starts_with("Only 20% of 10 votes are positive"));
        assert!(text.ends_with(FALLBACK));
    }

    #[test]
    fn no_votes_old_article_with_hint() {
        let article = scored("1", "<p>Reset your password.</p>", 0, 0, Some(200));
        let text = insight_for(&article);
        assert!(text.starts_with(NO_FEEDBACK));
        assert!(text.contains("Content is 200 days old"));
        assert!(text.ends_with(KEYWORD_HINTS[0].message));
    }

    #[test]
    fn fallback_skipped_with_two_insights() {
        let article = scored("1", "<p>Nothing relevant.</p>", 0, 0, Some(200));
        let text = insight_for(&article);
        assert!(!text.contains(FALLBACK));
    }

    #[test]
    fn queues_exclude_placeholders_and_cap_length() {
        let mut articles: Vec<ScoredArticle> = (0..10)
            .map(|i| scored(&i.to_string(), "<p>x</p>", 10 + i, -(10 + i), Some(100 + i)))
            .collect();
        articles[0].article.raw.is_placeholder = true;

        let queues = build_ops_queues(&articles);
        assert_eq!(queues.alerts.len(), QUEUE_LEN);
        assert_eq!(queues.stale.len(), QUEUE_LEN);
        assert!(queues.alerts.iter().all(|i| i.id != "0"));
        assert_eq!(queues.alerts[0].id, "9");
        assert_eq!(queues.stale[0].id, "9");
        assert_eq!(queues.stale[0].age_days, Some(109));
    }

    #[test]
    fn alert_and_stale_criteria() {
        let articles = vec![
            scored("happy", "<p>x</p>", 4, 4, Some(10)),
            scored("unvoted", "<p>x</p>", 0, 0, Some(10)),
            scored("busy", "<p>x</p>", 6, 6, Some(10)),
            scored("undated", "<p>x</p>", 4, 4, None),
            scored("old", "<p>x</p>", 4, 4, Some(91)),
        ];
        let queues = build_ops_queues(&articles);
        let alert_ids: Vec<&str> = queues.alerts.iter().map(|i| i.id).collect();
        assert_eq!(alert_ids, ["busy", "unvoted"]);
        let stale_ids: Vec<&str> = queues.stale.iter().map(|i| i.id).collect();
        assert_eq!(stale_ids, ["old"]);
    }
}
