//! Operator-console edits to an article.
//!
//! An override never replaces the pipeline's output wholesale. Title and body
//! edits feed classification; tag edits pin the matching dimension after
//! classification has run. Scoring always runs on the merged result.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::article::{ClassifiedArticle, Persona, RawArticle, Region, ServiceTier};

/// Overrides keyed by article id.
pub type OverrideMap = HashMap<String, ArticleOverride>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleOverride {
    pub title: Option<String>,
    /// Replacement HTML body.
    pub body: Option<String>,
    pub persona: Option<BTreeSet<Persona>>,
    pub service_tier: Option<BTreeSet<ServiceTier>>,
    pub feature_area: Option<BTreeSet<String>>,
    pub integrations: Option<BTreeSet<String>>,
    pub regions: Option<BTreeSet<Region>>,
}

impl ArticleOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy of `raw` with the edited title and body applied.
    pub fn apply_to_raw(&self, raw: &RawArticle) -> RawArticle {
        let mut edited = raw.clone();
        if let Some(title) = &self.title {
            edited.title = title.clone();
        }
        if let Some(body) = &self.body {
            edited.body = body.clone();
        }
        edited
    }

    /// Replace classified tag sets with the pinned ones.
    ///
    /// Empty persona, tier, or region edits are ignored: those dimensions are
    /// non-empty by construction.
    pub fn pin_tags(&self, article: &mut ClassifiedArticle) {
        if let Some(persona) = self.persona.as_ref().filter(|p| !p.is_empty()) {
            article.persona = persona.clone();
        }
        if let Some(tiers) = self.service_tier.as_ref().filter(|t| !t.is_empty()) {
            article.service_tier = tiers.clone();
        }
        if let Some(areas) = &self.feature_area {
            article.feature_area = areas.clone();
        }
        if let Some(integrations) = &self.integrations {
            article.integrations = integrations.clone();
        }
        if let Some(regions) = self.regions.as_ref().filter(|r| !r.is_empty()) {
            article.regions = regions.clone();
        }
        article.refresh_plus_only();
    }

    /// Field-wise merge; fields set in `newer` win.
    pub fn merge(&mut self, newer: ArticleOverride) {
        let ArticleOverride {
            title,
            body,
            persona,
            service_tier,
            feature_area,
            integrations,
            regions,
        } = newer;
        if title.is_some() {
            self.title = title;
        }
        if body.is_some() {
            self.body = body;
        }
        if persona.is_some() {
            self.persona = persona;
        }
        if service_tier.is_some() {
            self.service_tier = service_tier;
        }
        if feature_area.is_some() {
            self.feature_area = feature_area;
        }
        if integrations.is_some() {
            self.integrations = integrations;
        }
        if regions.is_some() {
            self.regions = regions;
        }
    }
}
