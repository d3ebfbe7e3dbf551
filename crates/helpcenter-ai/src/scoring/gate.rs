//! AI-retrieval eligibility gate.
//!
//! Five independent checks; a chunk may be served to the assistant only when
//! every one passes. The confidence bar here is fixed and unrelated to the
//! operator's display threshold.

use helpcenter_core::ClassifiedArticle;
use serde::{Deserialize, Serialize};

use super::votes::Votes;

pub const MIN_FEEDBACK_VOTES: u64 = 5;
pub const MIN_POSITIVITY: f64 = 0.60;
pub const MIN_CONFIDENCE: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalCheck {
    HasFeedback,
    PositivityOk,
    ConfidenceOk,
    IsRecentEnough,
    IsPlusEligible,
}

impl ApprovalCheck {
    pub const ALL: [ApprovalCheck; 5] = [
        ApprovalCheck::HasFeedback,
        ApprovalCheck::PositivityOk,
        ApprovalCheck::ConfidenceOk,
        ApprovalCheck::IsRecentEnough,
        ApprovalCheck::IsPlusEligible,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ApprovalCheck::HasFeedback => "hasFeedback",
            ApprovalCheck::PositivityOk => "positivityOk",
            ApprovalCheck::ConfidenceOk => "confidenceOk",
            ApprovalCheck::IsRecentEnough => "isRecentEnough",
            ApprovalCheck::IsPlusEligible => "isPlusEligible",
        }
    }

    /// Short operator-facing description of what passing requires.
    pub fn requirement(self) -> &'static str {
        match self {
            ApprovalCheck::HasFeedback => ">=5 votes",
            ApprovalCheck::PositivityOk => "60%+ positivity",
            ApprovalCheck::ConfidenceOk => ">=65% confidence",
            ApprovalCheck::IsRecentEnough => "recent review date",
            ApprovalCheck::IsPlusEligible => "non-Plus content",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalChecks {
    pub has_feedback: bool,
    pub positivity_ok: bool,
    pub confidence_ok: bool,
    pub is_recent_enough: bool,
    pub is_plus_eligible: bool,
}

impl ApprovalChecks {
    pub fn evaluate(article: &ClassifiedArticle, votes: &Votes, confidence: f64) -> Self {
        Self {
            has_feedback: votes.total >= MIN_FEEDBACK_VOTES,
            positivity_ok: votes.positivity.is_some_and(|p| p >= MIN_POSITIVITY),
            confidence_ok: confidence >= MIN_CONFIDENCE,
            is_recent_enough: article.raw.updated_at.is_some(),
            is_plus_eligible: !article.is_plus_only,
        }
    }

    pub fn get(&self, check: ApprovalCheck) -> bool {
        match check {
            ApprovalCheck::HasFeedback => self.has_feedback,
            ApprovalCheck::PositivityOk => self.positivity_ok,
            ApprovalCheck::ConfidenceOk => self.confidence_ok,
            ApprovalCheck::IsRecentEnough => self.is_recent_enough,
            ApprovalCheck::IsPlusEligible => self.is_plus_eligible,
        }
    }

    pub fn allowed(&self) -> bool {
        ApprovalCheck::ALL.iter().all(|&c| self.get(c))
    }

    /// Failing checks in declaration order.
    pub fn failing(&self) -> Vec<ApprovalCheck> {
        ApprovalCheck::ALL
            .into_iter()
            .filter(|&c| !self.get(c))
            .collect()
    }

    /// `"Needs: >=5 votes, recent review date"`, or `None` when everything passes.
    pub fn needs_line(&self) -> Option<String> {
        let failing = self.failing();
        if failing.is_empty() {
            return None;
        }
        let parts: Vec<&str> = failing.iter().map(|c| c.requirement()).collect();
        Some(format!("Needs: {}", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use helpcenter_core::{Persona, RawArticle, Region, ServiceTier};

    use super::*;
    use crate::scoring::votes::derive_votes;

    fn article(tiers: &[ServiceTier], dated: bool) -> ClassifiedArticle {
        let mut raw = RawArticle::new("7", "Approval chains");
        raw.updated_at = dated.then(Utc::now);
        let mut article = ClassifiedArticle {
            raw,
            persona: BTreeSet::from([Persona::Admin]),
            service_tier: tiers.iter().copied().collect(),
            feature_area: BTreeSet::new(),
            topic_cluster: "General".into(),
            integrations: BTreeSet::new(),
            journey_stage: Default::default(),
            regions: BTreeSet::from([Region::Us]),
            is_plus_only: false,
        };
        article.refresh_plus_only();
        article
    }

    #[test]
    fn everything_passes() {
        let checks = ApprovalChecks::evaluate(
            &article(&[ServiceTier::Base], true),
            &derive_votes(10, 8),
            0.91,
        );
        assert!(checks.allowed());
        assert!(checks.failing().is_empty());
        assert_eq!(checks.needs_line(), None);
    }

    #[test]
    fn unvoted_undated_article_fails() {
        let checks = ApprovalChecks::evaluate(
            &article(&[ServiceTier::Base], false),
            &derive_votes(0, 0),
            0.33,
        );
        assert!(!checks.allowed());
        assert_eq!(
            checks.failing(),
            vec![
                ApprovalCheck::HasFeedback,
                ApprovalCheck::PositivityOk,
                ApprovalCheck::ConfidenceOk,
                ApprovalCheck::IsRecentEnough,
            ]
        );
        assert_eq!(
            checks.needs_line().as_deref(),
            Some("Needs: >=5 votes, 60%+ positivity, >=65% confidence, recent review date")
        );
    }

    #[test]
    fn thresholds_are_inclusive() {
        let votes = derive_votes(5, 1); // 3 up, 2 down
        assert_eq!(votes.positivity, Some(0.6));
        let checks =
            ApprovalChecks::evaluate(&article(&[ServiceTier::Base], true), &votes, MIN_CONFIDENCE);
        assert!(checks.has_feedback);
        assert!(checks.positivity_ok);
        assert!(checks.confidence_ok);
    }

    #[test]
    fn plus_only_article_is_ineligible() {
        let only = article(&[ServiceTier::Plus], true);
        let checks = ApprovalChecks::evaluate(&only, &derive_votes(10, 10), 0.95);
        assert_eq!(checks.failing(), vec![ApprovalCheck::IsPlusEligible]);

        let both = article(&[ServiceTier::Base, ServiceTier::Plus], true);
        assert!(ApprovalChecks::evaluate(&both, &derive_votes(10, 10), 0.95).allowed());
    }

    #[test]
    fn check_names_are_camel_case() {
        let names: Vec<&str> = ApprovalCheck::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            [
                "hasFeedback",
                "positivityOk",
                "confidenceOk",
                "isRecentEnough",
                "isPlusEligible"
            ]
        );
        let json = serde_json::to_string(&ApprovalCheck::IsPlusEligible).unwrap();
        assert_eq!(json, "\"isPlusEligible\"");
    }
}
