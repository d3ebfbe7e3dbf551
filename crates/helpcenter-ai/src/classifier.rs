//! Keyword-based metadata classifier for help-center articles.
//!
//! Builds a normalised haystack from the title, stripped body, labels, and
//! section/category names, then tests it against each keyword table. The
//! classifier is total: every input yields a fully populated
//! [`ClassifiedArticle`], with documented defaults where nothing matches.

use std::collections::BTreeSet;
use std::sync::Arc;

use helpcenter_core::text::{normalize, slugify, strip_html, truncate_chars};
use helpcenter_core::{
    Category, ClassifiedArticle, JourneyStage, Persona, RawArticle, Region, Section, ServiceTier,
};
use tracing::debug;

use crate::keywords::{KeywordRuleSet, KeywordRules};

/// Stripped body characters considered for persona inference.
pub const PERSONA_BODY_PREFIX_CHARS: usize = 400;

pub(crate) const DEFAULT_TOPIC: &str = "General";
pub(crate) const PLACEHOLDER_TOPIC: &str = "Usage insights";
pub(crate) const PLACEHOLDER_FEATURE_AREA: &str = "usage-insights";

/// Classifies articles against a swappable set of keyword rules.
#[derive(Clone)]
pub struct MetadataClassifier {
    rules: Arc<dyn KeywordRules>,
}

impl Default for MetadataClassifier {
    fn default() -> Self {
        Self::new(KeywordRuleSet::builtin())
    }
}

impl MetadataClassifier {
    pub fn new(rules: impl KeywordRules + 'static) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Classify an article using the section and category it carries.
    pub fn classify(&self, raw: RawArticle) -> ClassifiedArticle {
        if raw.is_placeholder {
            return classify_placeholder(raw);
        }

        let body_text = strip_html(&raw.body);
        let context = context_text(&raw);
        let full = haystack(&[&raw.title, &body_text, &context]);
        let persona_hay = haystack(&[
            &raw.title,
            truncate_chars(&body_text, PERSONA_BODY_PREFIX_CHARS),
            &context,
        ]);
        let section = raw.section_name().map(normalize);

        let persona = self.infer_persona(&persona_hay, section.as_deref());
        let feature_area = self.infer_feature_area(&full, raw.section_name());
        let integrations: BTreeSet<String> = self
            .rules
            .integrations()
            .iter()
            .filter(|e| e.matches(&full))
            .map(|e| e.tag.clone())
            .collect();
        let journey_stage = self.infer_journey_stage(&full);
        let service_tier = self.infer_service_tier(&full);
        let regions = self.infer_regions(section.as_deref());
        let topic_cluster = topic_cluster(&raw);

        debug!(
            id = %raw.id,
            persona = ?persona,
            features = feature_area.len(),
            integrations = integrations.len(),
            stage = %journey_stage,
            "classified article"
        );

        let mut article = ClassifiedArticle {
            raw,
            persona,
            service_tier,
            feature_area,
            topic_cluster,
            integrations,
            journey_stage,
            regions,
            is_plus_only: false,
        };
        article.refresh_plus_only();
        article
    }

    /// Classify with explicit section and category context, replacing any the
    /// article already carries.
    pub fn classify_in(
        &self,
        mut raw: RawArticle,
        section: Option<Section>,
        category: Option<Category>,
    ) -> ClassifiedArticle {
        raw.section = section;
        raw.category = category;
        self.classify(raw)
    }

    fn infer_persona(&self, haystack: &str, section: Option<&str>) -> BTreeSet<Persona> {
        let mut persona: BTreeSet<Persona> = self
            .rules
            .persona()
            .iter()
            .filter(|e| e.matches(haystack))
            .map(|e| e.tag)
            .collect();
        if persona.is_empty() {
            let fallback = match section {
                Some(name) if name.contains("employee") => Persona::Employee,
                _ => Persona::Admin,
            };
            persona.insert(fallback);
        }
        persona
    }

    fn infer_feature_area(&self, haystack: &str, section: Option<&str>) -> BTreeSet<String> {
        let mut areas: BTreeSet<String> = self
            .rules
            .feature_area()
            .iter()
            .filter(|e| e.matches(haystack))
            .map(|e| e.tag.clone())
            .collect();
        if areas.is_empty()
            && let Some(name) = section
        {
            let slug = slugify(name);
            if !slug.is_empty() {
                areas.insert(slug);
            }
        }
        areas
    }

    fn infer_journey_stage(&self, haystack: &str) -> JourneyStage {
        self.rules
            .journey_stage()
            .iter()
            .find(|e| e.matches(haystack))
            .map(|e| e.tag)
            .unwrap_or_default()
    }

    fn infer_service_tier(&self, haystack: &str) -> BTreeSet<ServiceTier> {
        let mut tiers = BTreeSet::from([ServiceTier::Base]);
        if self
            .rules
            .plus_signals()
            .iter()
            .any(|s| haystack.contains(s.as_str()))
        {
            tiers.insert(ServiceTier::Plus);
        }
        tiers
    }

    fn infer_regions(&self, section: Option<&str>) -> BTreeSet<Region> {
        let international = section.is_some_and(|name| {
            self.rules
                .international_signals()
                .iter()
                .any(|s| name.contains(s.as_str()))
        });
        if international {
            BTreeSet::from([Region::Global])
        } else {
            BTreeSet::from([Region::Us])
        }
    }
}

/// Usage-only records have no text to classify; they get fixed defaults.
fn classify_placeholder(raw: RawArticle) -> ClassifiedArticle {
    ClassifiedArticle {
        raw,
        persona: BTreeSet::from([Persona::Admin]),
        service_tier: BTreeSet::from([ServiceTier::Base]),
        feature_area: BTreeSet::from([PLACEHOLDER_FEATURE_AREA.to_string()]),
        topic_cluster: PLACEHOLDER_TOPIC.to_string(),
        integrations: BTreeSet::new(),
        journey_stage: JourneyStage::Discover,
        regions: BTreeSet::from([Region::Us]),
        is_plus_only: false,
    }
}

fn context_text(raw: &RawArticle) -> String {
    let mut parts: Vec<&str> = raw.label_names.iter().map(String::as_str).collect();
    parts.extend(raw.section_name());
    parts.extend(raw.category_name());
    parts.join(" ")
}

fn haystack(parts: &[&str]) -> String {
    normalize(&parts.join(" "))
}

fn topic_cluster(raw: &RawArticle) -> String {
    [raw.section_name(), raw.category_name()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(DEFAULT_TOPIC)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordEntry;

    fn article(title: &str, body: &str) -> RawArticle {
        let mut raw = RawArticle::new("1", title);
        raw.body = body.to_string();
        raw
    }

    fn with_section(mut raw: RawArticle, section: &str) -> RawArticle {
        raw.section = Some(Section {
            name: section.to_string(),
        });
        raw
    }

    fn strings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn okta_sso_article() {
        let clf = MetadataClassifier::default();
        let result = clf.classify(article(
            "How to enable SSO with Okta",
            "<p>Configure Okta SSO for your team and enable MFA.</p>",
        ));
        assert!(result.persona.contains(&Persona::It));
        assert!(result.integrations.contains("okta"));
        assert!(result.feature_area.contains("authentication"));
        assert_eq!(result.journey_stage, JourneyStage::Implement);
        assert_eq!(result.topic_cluster, "General");
        assert_eq!(result.regions, BTreeSet::from([Region::Us]));
    }

    #[test]
    fn persona_defaults_to_admin() {
        let clf = MetadataClassifier::default();
        let result = clf.classify(article("Weekly digest", "<p>Nothing to see.</p>"));
        assert_eq!(result.persona, BTreeSet::from([Persona::Admin]));
    }

    #[test]
    fn persona_defaults_to_employee_in_employee_section() {
        let clf = MetadataClassifier::default();
        let raw = with_section(article("Weekly digest", ""), "Employee FAQ");
        let result = clf.classify(raw);
        assert_eq!(result.persona, BTreeSet::from([Persona::Employee]));
    }

    #[test]
    fn persona_only_reads_body_prefix() {
        let clf = MetadataClassifier::default();
        let filler = "lorem ipsum ".repeat(50);
        let body = format!("<p>{filler} vendor</p>");
        let result = clf.classify(article("Weekly digest", &body));
        assert!(!result.persona.contains(&Persona::Vendor));
        assert_eq!(result.persona, BTreeSet::from([Persona::Admin]));
    }

    #[test]
    fn feature_scan_reads_full_body() {
        let clf = MetadataClassifier::default();
        let filler = "lorem ipsum ".repeat(50);
        let body = format!("<p>{filler} upload a receipt</p>");
        let result = clf.classify(article("Weekly digest", &body));
        assert!(result.feature_area.contains("receipts"));
    }

    #[test]
    fn feature_area_falls_back_to_section_slug() {
        let clf = MetadataClassifier::default();
        let raw = with_section(article("Weekly digest", ""), "Treasury & Yield");
        let result = clf.classify(raw);
        assert_eq!(result.feature_area, strings(&["treasury-yield"]));
        assert_eq!(result.topic_cluster, "Treasury & Yield");
    }

    #[test]
    fn feature_area_empty_without_match_or_section() {
        let clf = MetadataClassifier::default();
        let result = clf.classify(article("Weekly digest", ""));
        assert!(result.feature_area.is_empty());
    }

    #[test]
    fn topic_cluster_prefers_section_then_category() {
        let clf = MetadataClassifier::default();
        let mut raw = article("Weekly digest", "");
        raw.category = Some(Category {
            name: "Spend".into(),
        });
        assert_eq!(clf.classify(raw.clone()).topic_cluster, "Spend");
        let raw = with_section(raw, "Cards");
        assert_eq!(clf.classify(raw).topic_cluster, "Cards");
    }

    #[test]
    fn journey_stage_priority_order() {
        let clf = MetadataClassifier::default();
        let both = clf.classify(article("Troubleshoot your setup", ""));
        assert_eq!(both.journey_stage, JourneyStage::Implement);
        let discover = clf.classify(article("Overview: set up cards", ""));
        assert_eq!(discover.journey_stage, JourneyStage::Discover);
        let resolve = clf.classify(article("Card declined", ""));
        assert_eq!(resolve.journey_stage, JourneyStage::Resolve);
        let default = clf.classify(article("Weekly digest", ""));
        assert_eq!(default.journey_stage, JourneyStage::Operate);
    }

    #[test]
    fn plus_signals_add_plus_tier_alongside_base() {
        let clf = MetadataClassifier::default();
        let result = clf.classify(article(
            "Multi-currency payments",
            "<p>Available for Ramp Plus customers.</p>",
        ));
        assert_eq!(
            result.service_tier,
            BTreeSet::from([ServiceTier::Base, ServiceTier::Plus])
        );
        assert!(!result.is_plus_only);
    }

    #[test]
    fn international_section_sets_global_region() {
        let clf = MetadataClassifier::default();
        let raw = with_section(article("Paying vendors", ""), "International Payments");
        assert_eq!(clf.classify(raw).regions, BTreeSet::from([Region::Global]));
        let body_only = article("Paying vendors", "<p>international wires</p>");
        assert_eq!(
            clf.classify(body_only).regions,
            BTreeSet::from([Region::Us])
        );
    }

    #[test]
    fn labels_and_entities_feed_the_haystack() {
        let clf = MetadataClassifier::default();
        let mut raw = article("Weekly digest", "<p>Sync&nbsp;with&nbsp;NetSuite</p>");
        raw.label_names = vec!["Slack".into()];
        let result = clf.classify(raw);
        assert_eq!(result.integrations, strings(&["netsuite", "slack"]));
    }

    #[test]
    fn placeholder_short_circuits_to_defaults() {
        let clf = MetadataClassifier::default();
        let mut raw = article("Okta SSO troubleshooting", "");
        raw.is_placeholder = true;
        let result = clf.classify(raw);
        assert_eq!(result.persona, BTreeSet::from([Persona::Admin]));
        assert_eq!(result.service_tier, BTreeSet::from([ServiceTier::Base]));
        assert_eq!(result.feature_area, strings(&["usage-insights"]));
        assert!(result.integrations.is_empty());
    }

    #[test]
    fn classification_is_deterministic() {
        let clf = MetadataClassifier::default();
        let raw = with_section(
            article(
                "Reconcile QuickBooks bills",
                "<p>Vendors, invoices, and journal entries.</p>",
            ),
            "Accounting",
        );
        assert_eq!(clf.classify(raw.clone()), clf.classify(raw));
    }

    #[test]
    fn classify_in_replaces_context() {
        let clf = MetadataClassifier::default();
        let raw = with_section(article("Weekly digest", ""), "Cards");
        let result = clf.classify_in(
            raw,
            Some(Section {
                name: "Global Spend".into(),
            }),
            None,
        );
        assert_eq!(result.topic_cluster, "Global Spend");
        assert_eq!(result.regions, BTreeSet::from([Region::Global]));
    }

    #[test]
    fn custom_rules_are_swappable() {
        let mut rules = KeywordRuleSet::builtin().clone();
        rules.integrations.push(KeywordEntry {
            tag: "gusto".into(),
            patterns: vec!["gusto".into()],
        });
        let clf = MetadataClassifier::new(rules);
        let result = clf.classify(article("Connect Gusto payroll", ""));
        assert!(result.integrations.contains("gusto"));
    }
}
