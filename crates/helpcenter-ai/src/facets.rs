//! Filter options derived from the tags present in a batch, with display
//! labels and one-line definitions.

use std::collections::BTreeSet;

use helpcenter_core::{Persona, Region, ServiceTier};
use serde::Serialize;

use crate::browse::RegionFilter;
use crate::scoring::ScoredArticle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub label: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub personas: Vec<FacetOption>,
    pub tiers: Vec<FacetOption>,
    pub features: Vec<FacetOption>,
    pub integrations: Vec<FacetOption>,
    pub regions: Vec<FacetOption>,
}

pub fn persona_definition(persona: Persona) -> &'static str {
    match persona {
        Persona::Admin => {
            "Finance or operations admin responsible for policies, spend controls, and day-to-day approvals."
        }
        Persona::Employee => {
            "Everyday cardholders looking for quick answers while they spend or submit expenses."
        }
        Persona::Bookkeeper => {
            "Accounting and close teams reconciling card activity against their general ledger."
        }
        Persona::Vendor => {
            "External vendors interacting with bill pay or vendor onboarding experiences."
        }
        Persona::It => {
            "IT and security owners handling SSO, device management, and authentication tooling."
        }
    }
}

pub fn tier_definition(tier: ServiceTier) -> &'static str {
    match tier {
        ServiceTier::Base => "Standard features available to every customer without add-ons.",
        ServiceTier::Plus => {
            "Plus capabilities that unlock with the premium operations and automation suite."
        }
    }
}

pub fn integration_definition(slug: &str) -> Option<&'static str> {
    let text = match slug {
        "quickbooks-online" => "QuickBooks Online syncing for expenses, bills, and card transactions.",
        "netsuite" => "NetSuite ERP connection covering journal entries, reimbursements, and bills.",
        "sage-intacct" => "Sage Intacct export path to keep spend data aligned with finance ledgers.",
        "xero" => "Xero bookkeeping sync for small business accounting teams.",
        "travelperk" => "TravelPerk travel inventory connection for centralized booking.",
        "slack" => "Slack notifications and approvals integrated into team channels.",
        "okta" => "Okta single sign-on and provisioning support for employee access.",
        "microsoft-entra" => "Microsoft Entra ID (Azure AD) identity and SSO configuration.",
        "google" => "Google Workspace SSO and directory sync for user management.",
        "bill-com" => "Bill.com export workflow for vendor payments and invoice routing.",
        "rippling" => "Rippling HRIS sync used for provisioning finance and employee data.",
        _ => return None,
    };
    Some(text)
}

/// Upper-case the first character.
pub fn capitalise(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"bill-pay"` → `"Bill Pay"`.
pub fn format_feature(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(capitalise)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"quickbooks-online"` → `"Quickbooks Online"`, `"bill-com"` → `"Bill COM"`.
/// Parts of three characters or fewer are treated as acronyms.
pub fn format_integration(slug: &str) -> String {
    slug.split('-')
        .map(|part| {
            if part.chars().count() > 3 {
                capitalise(part)
            } else {
                part.to_uppercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Facets {
    /// Distinct tag values across `articles`, each list sorted by value.
    pub fn collect<'a>(articles: impl IntoIterator<Item = &'a ScoredArticle>) -> Self {
        let mut personas = BTreeSet::new();
        let mut tiers = BTreeSet::new();
        let mut features = BTreeSet::new();
        let mut integrations = BTreeSet::new();
        let mut domestic = false;
        let mut international = false;

        for scored in articles {
            let a = &scored.article;
            personas.extend(a.persona.iter().copied());
            tiers.extend(a.service_tier.iter().copied());
            features.extend(a.feature_area.iter().cloned());
            integrations.extend(a.integrations.iter().cloned());
            domestic |= RegionFilter::Domestic.matches(&a.regions);
            international |= RegionFilter::International.matches(&a.regions);
        }

        let mut regions = Vec::new();
        if domestic {
            regions.push(FacetOption {
                value: RegionFilter::Domestic.to_string(),
                label: "Domestic (US)".into(),
                definition: "Articles applicable to the US region.".into(),
            });
        }
        if international {
            regions.push(FacetOption {
                value: RegionFilter::International.to_string(),
                label: "International".into(),
                definition: "Articles that reference non-US behavior or global scope.".into(),
            });
        }

        Self {
            personas: sorted_by_value(personas.into_iter().map(|p: Persona| FacetOption {
                value: p.to_string(),
                label: capitalise(p.as_str()),
                definition: persona_definition(p).into(),
            })),
            tiers: sorted_by_value(tiers.into_iter().map(|t: ServiceTier| FacetOption {
                value: t.to_string(),
                label: capitalise(t.as_str()),
                definition: tier_definition(t).into(),
            })),
            features: features
                .into_iter()
                .map(|slug: String| {
                    let label = format_feature(&slug);
                    FacetOption {
                        definition: format!("Feature area: {label}"),
                        value: slug,
                        label,
                    }
                })
                .collect(),
            integrations: integrations
                .into_iter()
                .map(|slug: String| {
                    let label = format_integration(&slug);
                    FacetOption {
                        definition: integration_definition(&slug)
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Integration tag: {label}.")),
                        value: slug,
                        label,
                    }
                })
                .collect(),
            regions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
            && self.tiers.is_empty()
            && self.features.is_empty()
            && self.integrations.is_empty()
            && self.regions.is_empty()
    }
}

/// Enum tags sort by declaration order in a `BTreeSet`; options list by name.
fn sorted_by_value(options: impl Iterator<Item = FacetOption>) -> Vec<FacetOption> {
    let mut options: Vec<FacetOption> = options.collect();
    options.sort_by(|a, b| a.value.cmp(&b.value));
    options
}

/// Regions a reader can filter on, given the article's own tags.
pub fn region_buckets(regions: &BTreeSet<Region>) -> Vec<RegionFilter> {
    [RegionFilter::Domestic, RegionFilter::International]
        .into_iter()
        .filter(|r| r.matches(regions))
        .collect()
}
