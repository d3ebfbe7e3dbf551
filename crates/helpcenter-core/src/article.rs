//! Help-center article types: the raw export record and its classified form.
//!
//! A [`RawArticle`] is what the fetch layer hands over. The classifier turns
//! it into a [`ClassifiedArticle`] carrying audience and product tags; the
//! tag sets are `BTreeSet`s so equality is order-independent and rendering
//! is stable.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Help-center section an article is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
}

/// Help-center category a section belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
}

/// An article as exported from the help center, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub id: String,
    pub title: String,
    /// HTML body. Empty for usage-only placeholders.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Total votes cast.
    #[serde(default)]
    pub vote_count: i64,
    /// Upvotes minus downvotes.
    #[serde(default)]
    pub vote_sum: i64,
    #[serde(default)]
    pub label_names: Vec<String>,
    #[serde(default)]
    pub section: Option<Section>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub html_url: Option<String>,
    /// Views over the last 30 days, from the usage feed.
    #[serde(default)]
    pub views_30d: Option<u64>,
    /// Synthesized from a usage record with no matching article.
    #[serde(default)]
    pub is_placeholder: bool,
}

impl RawArticle {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: String::new(),
            updated_at: None,
            vote_count: 0,
            vote_sum: 0,
            label_names: Vec::new(),
            section: None,
            category: None,
            html_url: None,
            views_30d: None,
            is_placeholder: false,
        }
    }

    pub fn section_name(&self) -> Option<&str> {
        self.section.as_ref().map(|s| s.name.as_str())
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} tag: {value:?}")]
pub struct ParseTagError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a lowercase string-backed tag enum with `as_str`, `Display`, and `FromStr`.
macro_rules! tag_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseTagError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ParseTagError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

tag_enum!(
    /// Audience segment an article is written for.
    Persona, "persona" {
        Employee => "employee",
        Admin => "admin",
        Bookkeeper => "bookkeeper",
        Vendor => "vendor",
        It => "it",
    }
);

tag_enum!(
    /// Product tier an article applies to.
    ServiceTier, "service tier" {
        Base => "base",
        Plus => "plus",
    }
);

tag_enum!(
    /// Where in the customer journey an article sits.
    ///
    /// Variant order is the classifier's priority order.
    JourneyStage, "journey stage" {
        Discover => "discover",
        Implement => "implement",
        Operate => "operate",
        Resolve => "resolve",
    }
);

tag_enum!(
    /// Geographic scope of an article.
    Region, "region" {
        Us => "us",
        Global => "global",
    }
);

impl Default for JourneyStage {
    fn default() -> Self {
        Self::Operate
    }
}

/// A raw article plus the metadata tags derived from its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedArticle {
    pub raw: RawArticle,
    /// Never empty.
    pub persona: BTreeSet<Persona>,
    pub service_tier: BTreeSet<ServiceTier>,
    pub feature_area: BTreeSet<String>,
    pub topic_cluster: String,
    pub integrations: BTreeSet<String>,
    pub journey_stage: JourneyStage,
    pub regions: BTreeSet<Region>,
    pub is_plus_only: bool,
}

impl ClassifiedArticle {
    /// True iff the tier set is exactly `{plus}`.
    pub fn plus_only(tiers: &BTreeSet<ServiceTier>) -> bool {
        tiers.len() == 1 && tiers.contains(&ServiceTier::Plus)
    }

    /// Recompute `is_plus_only` after the tier set changed.
    pub fn refresh_plus_only(&mut self) {
        self.is_plus_only = Self::plus_only(&self.service_tier);
    }

    pub fn id(&self) -> &str {
        &self.raw.id
    }

    pub fn title(&self) -> &str {
        &self.raw.title
    }
}
