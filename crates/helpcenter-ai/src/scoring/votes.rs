//! Upvote/downvote recovery from help-center vote encoding.
//!
//! The help center reports `vote_count` (total votes) and `vote_sum`
//! (upvotes minus downvotes). Malformed input is clamped, never rejected.

use helpcenter_core::RawArticle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Votes {
    pub total: u64,
    pub upvotes: u64,
    pub downvotes: u64,
    /// `upvotes / total`; `None` when nobody has voted.
    pub positivity: Option<f64>,
}

impl Votes {
    pub fn from_raw(raw: &RawArticle) -> Self {
        derive_votes(raw.vote_count, raw.vote_sum)
    }

    pub fn has_votes(&self) -> bool {
        self.total > 0
    }
}

/// Recover upvotes and downvotes from `(total, sum)`.
///
/// `total` is clamped to zero from below. Upvotes are `round((total + sum) / 2)`
/// with halves rounding up, clamped to `[0, total]`.
pub fn derive_votes(total: i64, sum: i64) -> Votes {
    let total = i128::from(total.max(0));
    let upvotes = (total + i128::from(sum) + 1).div_euclid(2).clamp(0, total);
    let downvotes = total - upvotes;
    let total = total as u64;
    let upvotes = upvotes as u64;
    Votes {
        total,
        upvotes,
        downvotes: downvotes as u64,
        positivity: (total > 0).then(|| upvotes as f64 / total as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_pair() {
        let votes = derive_votes(10, 8);
        assert_eq!((votes.upvotes, votes.downvotes), (9, 1));
        assert_eq!(votes.positivity, Some(0.9));
    }

    #[test]
    fn no_votes_has_no_positivity() {
        let votes = derive_votes(0, 0);
        assert_eq!(votes.total, 0);
        assert_eq!(votes.positivity, None);
        assert!(!votes.has_votes());
    }

    #[test]
    fn all_negative() {
        let votes = derive_votes(4, -4);
        assert_eq!((votes.upvotes, votes.downvotes), (0, 4));
        assert_eq!(votes.positivity, Some(0.0));
    }

    #[test]
    fn negative_total_clamps_to_zero() {
        let votes = derive_votes(-3, 2);
        assert_eq!(votes, derive_votes(0, 0));
    }

    #[test]
    fn oversized_sum_clamps_to_total() {
        let high = derive_votes(3, 10);
        assert_eq!((high.upvotes, high.downvotes), (3, 0));
        let low = derive_votes(3, -10);
        assert_eq!((low.upvotes, low.downvotes), (0, 3));
    }

    #[test]
    fn odd_parity_rounds_half_up() {
        // (5 + 2) / 2 = 3.5
        let votes = derive_votes(5, 2);
        assert_eq!((votes.upvotes, votes.downvotes), (4, 1));
    }

    #[test]
    fn extreme_inputs_do_not_overflow() {
        let votes = derive_votes(i64::MAX, i64::MAX);
        assert_eq!(votes.upvotes, votes.total);
        let votes = derive_votes(i64::MAX, i64::MIN);
        assert_eq!(votes.upvotes, 0);
    }
}
