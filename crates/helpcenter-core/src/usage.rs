//! Usage feed records: page views and helpfulness votes keyed by article title.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Position in the usage ranking; used for placeholder ids.
    pub rank: u32,
    pub title: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
}

impl UsageRecord {
    /// Total votes in help-center encoding, saturating at `i64::MAX`.
    pub fn vote_count(&self) -> i64 {
        saturate(self.upvotes.saturating_add(self.downvotes))
    }

    /// Upvotes minus downvotes, saturating at the `i64` bounds.
    pub fn vote_sum(&self) -> i64 {
        saturate(self.upvotes).saturating_sub(saturate(self.downvotes))
    }
}

fn saturate(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
