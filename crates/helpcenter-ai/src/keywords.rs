//! Keyword tables that drive metadata classification.
//!
//! Each table maps a tag to the lower-case substrings that signal it. Table
//! order matters only for journey stage, where the first matching stage wins.
//! The built-in tables are compiled once; alternative rule sets can be loaded
//! from JSON and swapped in through [`KeywordRules`] without touching scoring.

use std::sync::LazyLock;

use helpcenter_core::{JourneyStage, Persona};
use serde::{Deserialize, Serialize};

/// One tag and the substrings that signal it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry<T> {
    pub tag: T,
    pub patterns: Vec<String>,
}

impl<T> KeywordEntry<T> {
    /// True if any pattern occurs in the (already normalised) haystack.
    pub fn matches(&self, haystack: &str) -> bool {
        self.patterns.iter().any(|p| haystack.contains(p.as_str()))
    }
}

/// Source of classification keyword tables.
pub trait KeywordRules: Send + Sync {
    fn persona(&self) -> &[KeywordEntry<Persona>];
    fn feature_area(&self) -> &[KeywordEntry<String>];
    fn integrations(&self) -> &[KeywordEntry<String>];
    /// In priority order: the first stage with a match wins.
    fn journey_stage(&self) -> &[KeywordEntry<JourneyStage>];
    /// Text that marks content as premium-tier.
    fn plus_signals(&self) -> &[String];
    /// Section-name text that marks content as non-US.
    fn international_signals(&self) -> &[String];
}

impl<T: KeywordRules + ?Sized> KeywordRules for &T {
    fn persona(&self) -> &[KeywordEntry<Persona>] {
        (**self).persona()
    }
    fn feature_area(&self) -> &[KeywordEntry<String>] {
        (**self).feature_area()
    }
    fn integrations(&self) -> &[KeywordEntry<String>] {
        (**self).integrations()
    }
    fn journey_stage(&self) -> &[KeywordEntry<JourneyStage>] {
        (**self).journey_stage()
    }
    fn plus_signals(&self) -> &[String] {
        (**self).plus_signals()
    }
    fn international_signals(&self) -> &[String] {
        (**self).international_signals()
    }
}

/// An owned, serialisable set of keyword tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRuleSet {
    pub persona: Vec<KeywordEntry<Persona>>,
    pub feature_area: Vec<KeywordEntry<String>>,
    pub integrations: Vec<KeywordEntry<String>>,
    pub journey_stage: Vec<KeywordEntry<JourneyStage>>,
    pub plus_signals: Vec<String>,
    pub international_signals: Vec<String>,
}

/// Summary statistics for a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    pub persona_tags: usize,
    pub feature_areas: usize,
    pub integrations: usize,
    pub journey_stages: usize,
    pub total_patterns: usize,
}

static BUILTIN: LazyLock<KeywordRuleSet> = LazyLock::new(KeywordRuleSet::build_builtin);

impl KeywordRuleSet {
    /// The built-in help-center tables.
    pub fn builtin() -> &'static KeywordRuleSet {
        &BUILTIN
    }

    /// Parse a rule set from JSON. Patterns are lower-cased and trimmed so
    /// they match the normalised haystack; empty patterns are dropped.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let mut rules: Self = serde_json::from_slice(bytes)?;
        rules.normalize();
        Ok(rules)
    }

    pub fn summary(&self) -> RuleSummary {
        let total_patterns = self.persona.iter().map(|e| e.patterns.len()).sum::<usize>()
            + self.feature_area.iter().map(|e| e.patterns.len()).sum::<usize>()
            + self.integrations.iter().map(|e| e.patterns.len()).sum::<usize>()
            + self.journey_stage.iter().map(|e| e.patterns.len()).sum::<usize>()
            + self.plus_signals.len()
            + self.international_signals.len();
        RuleSummary {
            persona_tags: self.persona.len(),
            feature_areas: self.feature_area.len(),
            integrations: self.integrations.len(),
            journey_stages: self.journey_stage.len(),
            total_patterns,
        }
    }

    fn normalize(&mut self) {
        fn clean(patterns: &mut Vec<String>) {
            for p in patterns.iter_mut() {
                *p = p.trim().to_lowercase();
            }
            patterns.retain(|p| !p.is_empty());
        }
        self.persona.iter_mut().for_each(|e| clean(&mut e.patterns));
        self.feature_area.iter_mut().for_each(|e| clean(&mut e.patterns));
        self.integrations.iter_mut().for_each(|e| clean(&mut e.patterns));
        self.journey_stage.iter_mut().for_each(|e| clean(&mut e.patterns));
        clean(&mut self.plus_signals);
        clean(&mut self.international_signals);
    }

    fn build_builtin() -> Self {
        Self {
            persona: entries(PERSONA, |t| t),
            feature_area: entries(FEATURE_AREA, str::to_string),
            integrations: entries(INTEGRATIONS, str::to_string),
            journey_stage: entries(JOURNEY_STAGE, |t| t),
            plus_signals: strings(PLUS_SIGNALS),
            international_signals: strings(INTERNATIONAL_SIGNALS),
        }
    }
}

impl KeywordRules for KeywordRuleSet {
    fn persona(&self) -> &[KeywordEntry<Persona>] {
        &self.persona
    }
    fn feature_area(&self) -> &[KeywordEntry<String>] {
        &self.feature_area
    }
    fn integrations(&self) -> &[KeywordEntry<String>] {
        &self.integrations
    }
    fn journey_stage(&self) -> &[KeywordEntry<JourneyStage>] {
        &self.journey_stage
    }
    fn plus_signals(&self) -> &[String] {
        &self.plus_signals
    }
    fn international_signals(&self) -> &[String] {
        &self.international_signals
    }
}

fn entries<S: Copy, T>(table: &[(S, &[&str])], tag: impl Fn(S) -> T) -> Vec<KeywordEntry<T>> {
    table
        .iter()
        .map(|&(t, patterns)| KeywordEntry {
            tag: tag(t),
            patterns: strings(patterns),
        })
        .collect()
}

fn strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

// ── Built-in tables ──

const PERSONA: &[(Persona, &[&str])] = &[
    (
        Persona::Employee,
        &[
            "employee",
            "cardholder",
            "reimbursement",
            "expense report",
            "my card",
            "your card",
            "mobile app",
            "submit a receipt",
        ],
    ),
    (
        Persona::Admin,
        &[
            "admin",
            "policy",
            "policies",
            "approval",
            "spend limit",
            "permission",
            "controls",
            "owner",
        ],
    ),
    (
        Persona::Bookkeeper,
        &[
            "accounting",
            "bookkeep",
            "reconcil",
            "general ledger",
            "journal entr",
            "month-end",
            "close the books",
        ],
    ),
    (
        Persona::Vendor,
        &["vendor", "supplier", "payee", "bill pay", "invoice"],
    ),
    (
        Persona::It,
        &[
            "sso",
            "saml",
            "single sign-on",
            "scim",
            "okta",
            "mfa",
            "two-factor",
            "provisioning",
            "security",
            "entra",
            "azure ad",
        ],
    ),
];

const FEATURE_AREA: &[(&str, &[&str])] = &[
    (
        "authentication",
        &[
            "sso",
            "saml",
            "single sign-on",
            "login",
            "log in",
            "password",
            "mfa",
            "two-factor",
            "2fa",
        ],
    ),
    (
        "cards",
        &["card", "spend limit", "virtual card", "physical card"],
    ),
    ("reimbursements", &["reimburse", "mileage", "out-of-pocket"]),
    (
        "bill-pay",
        &["bill pay", "bill", "invoice", "vendor payment", "ach payment"],
    ),
    (
        "accounting",
        &[
            "accounting",
            "general ledger",
            "reconcil",
            "journal entr",
            "accounting sync",
        ],
    ),
    ("receipts", &["receipt", "memo"]),
    ("travel", &["travel", "flight", "hotel", "booking"]),
    (
        "procurement",
        &["purchase order", "procurement", "purchase request"],
    ),
    ("approvals", &["approval", "approver", "workflow"]),
    ("integrations", &["integration", "connect"]),
];

const INTEGRATIONS: &[(&str, &[&str])] = &[
    ("quickbooks-online", &["quickbooks", "qbo"]),
    ("netsuite", &["netsuite"]),
    ("sage-intacct", &["intacct"]),
    ("xero", &["xero"]),
    ("travelperk", &["travelperk"]),
    ("slack", &["slack"]),
    ("okta", &["okta"]),
    (
        "microsoft-entra",
        &["entra", "azure ad", "azure active directory"],
    ),
    ("google", &["google workspace", "google sso", "g suite"]),
    ("bill-com", &["bill.com"]),
    ("rippling", &["rippling"]),
];

const JOURNEY_STAGE: &[(JourneyStage, &[&str])] = &[
    (
        JourneyStage::Discover,
        &[
            "overview",
            "what is",
            "introduction",
            "introducing",
            "getting started",
            "learn about",
            "benefits of",
        ],
    ),
    (
        JourneyStage::Implement,
        &[
            "set up",
            "setup",
            "configure",
            "enable",
            "install",
            "connect",
            "activate",
            "onboard",
            "turn on",
        ],
    ),
    (
        JourneyStage::Operate,
        &[
            "manage", "review", "approve", "submit", "track", "export", "update", "view",
        ],
    ),
    (
        JourneyStage::Resolve,
        &[
            "troubleshoot",
            "error",
            "fix",
            "issue",
            "failed",
            "declined",
            "not working",
            "unable",
            "why",
        ],
    ),
];

const PLUS_SIGNALS: &[&str] = &[
    "ramp plus",
    "plus plan",
    "plus tier",
    "plus customers",
    "international",
    "multi-currency",
    "multi-entity",
    "global",
    "foreign currency",
    "procurement",
];

const INTERNATIONAL_SIGNALS: &[&str] = &[
    "international",
    "global",
    "multi-currency",
    "non-us",
    "outside the us",
    "foreign",
];
