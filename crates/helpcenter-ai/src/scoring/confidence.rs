//! Vote + recency confidence formula.
//!
//! ```text
//! confidence = clamp01(0.55 × voteScore
//!                      + 0.35 × recencyWeight
//!                      + freshnessBonus
//!                      − stalePenalty)
//! ```
//!
//! rounded to two decimals. An article with no timestamp gets no recency
//! credit and no stale penalty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::votes::Votes;

pub const VOTE_WEIGHT: f64 = 0.55;
pub const RECENCY_WEIGHT: f64 = 0.35;
/// Vote score when nobody has voted.
pub const NO_VOTE_SCORE: f64 = 0.6;
/// Age at which recency credit reaches zero and the stale penalty starts.
pub const RECENCY_HORIZON_DAYS: f64 = 180.0;
pub const FRESH_BONUS_DAYS: f64 = 7.0;
pub const FRESH_BONUS: f64 = 0.10;
pub const RECENT_BONUS_DAYS: f64 = 30.0;
pub const RECENT_BONUS: f64 = 0.05;
pub const STALE_PENALTY_SPAN_DAYS: f64 = 540.0;
pub const MAX_STALE_PENALTY: f64 = 0.25;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Each factor of the confidence formula, for display and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub vote_score: f64,
    /// Fractional days since the last update; `None` without a timestamp.
    pub recency_days: Option<f64>,
    pub recency_weight: f64,
    pub freshness_bonus: f64,
    pub stale_penalty: f64,
    pub confidence: f64,
}

/// Days between `updated_at` and `now`. Future timestamps count as zero.
pub fn recency_days(updated_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<f64> {
    updated_at.map(|ts| {
        let secs = (now - ts).num_seconds() as f64;
        (secs / SECONDS_PER_DAY).max(0.0)
    })
}

/// Laplace-smoothed upvote share, or [`NO_VOTE_SCORE`] without votes.
pub fn vote_score(votes: &Votes) -> f64 {
    if votes.total == 0 {
        return NO_VOTE_SCORE;
    }
    ((votes.upvotes as f64 + 1.0) / (votes.total as f64 + 2.0)).min(1.0)
}

pub fn recency_weight(days: Option<f64>) -> f64 {
    days.map_or(0.0, |d| (1.0 - d / RECENCY_HORIZON_DAYS).max(0.0))
}

pub fn freshness_bonus(days: Option<f64>) -> f64 {
    match days {
        Some(d) if d <= FRESH_BONUS_DAYS => FRESH_BONUS,
        Some(d) if d <= RECENT_BONUS_DAYS => RECENT_BONUS,
        _ => 0.0,
    }
}

pub fn stale_penalty(days: Option<f64>) -> f64 {
    match days {
        Some(d) if d > RECENCY_HORIZON_DAYS => {
            ((d - RECENCY_HORIZON_DAYS) / STALE_PENALTY_SPAN_DAYS).min(MAX_STALE_PENALTY)
        }
        _ => 0.0,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Confidence in `[0, 1]`, rounded to two decimals.
pub fn compute(votes: &Votes, updated_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    compute_breakdown(votes, updated_at, now).confidence
}

pub fn compute_breakdown(
    votes: &Votes,
    updated_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ConfidenceBreakdown {
    let days = recency_days(updated_at, now);
    let vote_score = vote_score(votes);
    let recency_weight = recency_weight(days);
    let freshness_bonus = freshness_bonus(days);
    let stale_penalty = stale_penalty(days);

    let raw = VOTE_WEIGHT * vote_score + RECENCY_WEIGHT * recency_weight + freshness_bonus
        - stale_penalty;

    ConfidenceBreakdown {
        vote_score,
        recency_days: days,
        recency_weight,
        freshness_bonus,
        stale_penalty,
        confidence: round2(raw.clamp(0.0, 1.0)),
    }
}
