//! Filtering, ranking, and sorting for the article and chunk views.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use helpcenter_core::{DisplayThreshold, ParseTagError, Persona, Region, ServiceTier};
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::facets::format_feature;
use crate::scoring::ScoredArticle;

/// Age assumed for ranking when an article has no timestamp.
pub const UNKNOWN_AGE_DAYS: f64 = 180.0;
const RECENCY_SCALE_DAYS: f64 = 60.0;
const PLACEHOLDER_RANK_PENALTY: f64 = 0.2;
const NO_VOTE_RANK_SCORE: f64 = 0.1;

/// Geographic filter buckets shown to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionFilter {
    Domestic,
    International,
}

impl RegionFilter {
    pub fn matches(self, regions: &BTreeSet<Region>) -> bool {
        match self {
            RegionFilter::Domestic => regions.contains(&Region::Us),
            RegionFilter::International => regions.iter().any(|r| *r != Region::Us),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegionFilter::Domestic => "domestic",
            RegionFilter::International => "international",
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionFilter {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "domestic" | "us" => Ok(RegionFilter::Domestic),
            "international" | "global" => Ok(RegionFilter::International),
            _ => Err(ParseTagError {
                kind: "region filter",
                value: s.to_string(),
            }),
        }
    }
}

/// Any-of tag filters plus a free-text query. Empty sets match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub personas: BTreeSet<Persona>,
    pub tiers: BTreeSet<ServiceTier>,
    pub integrations: BTreeSet<String>,
    pub features: BTreeSet<String>,
    pub regions: BTreeSet<RegionFilter>,
    pub query: String,
}

/// Tag view shared by scored articles and chunks.
trait Tagged {
    fn persona(&self) -> &BTreeSet<Persona>;
    fn service_tier(&self) -> &BTreeSet<ServiceTier>;
    fn integrations(&self) -> &BTreeSet<String>;
    fn feature_area(&self) -> &BTreeSet<String>;
    fn regions(&self) -> &BTreeSet<Region>;
    fn title(&self) -> &str;
    fn summary(&self) -> &str;
}

impl Tagged for ScoredArticle {
    fn persona(&self) -> &BTreeSet<Persona> {
        &self.article.persona
    }
    fn service_tier(&self) -> &BTreeSet<ServiceTier> {
        &self.article.service_tier
    }
    fn integrations(&self) -> &BTreeSet<String> {
        &self.article.integrations
    }
    fn feature_area(&self) -> &BTreeSet<String> {
        &self.article.feature_area
    }
    fn regions(&self) -> &BTreeSet<Region> {
        &self.article.regions
    }
    fn title(&self) -> &str {
        &self.article.raw.title
    }
    fn summary(&self) -> &str {
        &self.summary
    }
}

impl Tagged for Chunk {
    fn persona(&self) -> &BTreeSet<Persona> {
        &self.persona
    }
    fn service_tier(&self) -> &BTreeSet<ServiceTier> {
        &self.service_tier
    }
    fn integrations(&self) -> &BTreeSet<String> {
        &self.integrations
    }
    fn feature_area(&self) -> &BTreeSet<String> {
        &self.feature_area
    }
    fn regions(&self) -> &BTreeSet<Region> {
        &self.regions
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn summary(&self) -> &str {
        &self.summary
    }
}

fn any_of<T: Ord>(wanted: &BTreeSet<T>, have: &BTreeSet<T>) -> bool {
    wanted.is_empty() || !wanted.is_disjoint(have)
}

impl ArticleFilter {
    /// Filter on a single feature area, as the category shortcuts do.
    pub fn for_feature(area: impl Into<String>) -> Self {
        Self {
            features: BTreeSet::from([area.into()]),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.tags_empty()
    }

    fn tags_empty(&self) -> bool {
        self.personas.is_empty()
            && self.tiers.is_empty()
            && self.integrations.is_empty()
            && self.features.is_empty()
            && self.regions.is_empty()
    }

    fn matches(&self, item: &impl Tagged) -> bool {
        any_of(&self.personas, item.persona())
            && any_of(&self.tiers, item.service_tier())
            && any_of(&self.integrations, item.integrations())
            && any_of(&self.features, item.feature_area())
            && (self.regions.is_empty() || self.regions.iter().any(|r| r.matches(item.regions())))
            && self.matches_text(item.title(), item.summary())
    }

    fn matches_text(&self, title: &str, summary: &str) -> bool {
        let query = self.query.trim().to_lowercase();
        query.is_empty() || format!("{title} {summary}").to_lowercase().contains(&query)
    }

    pub fn matches_article(&self, article: &ScoredArticle) -> bool {
        self.matches(article)
    }

    pub fn matches_chunk(&self, chunk: &Chunk) -> bool {
        self.matches(chunk)
    }
}

/// Reader-view ranking: vote quality, freshness, and traffic.
pub fn rank_score(scored: &ScoredArticle) -> f64 {
    let votes = &scored.votes;
    let vote_score = if votes.total > 0 {
        votes.positivity.unwrap_or(0.0) * (votes.total as f64 + 1.0).log10()
    } else {
        NO_VOTE_RANK_SCORE
    };
    let days = scored.recency_days().unwrap_or(UNKNOWN_AGE_DAYS);
    let recency_score = 1.0 / (1.0 + days / RECENCY_SCALE_DAYS);
    let views_boost = scored
        .article
        .raw
        .views_30d
        .map_or(0.0, |v| ((v as f64 + 1.0).log10() / 3.0).min(1.0));
    let penalty = if scored.is_placeholder() {
        PLACEHOLDER_RANK_PENALTY
    } else {
        0.0
    };
    vote_score + recency_score + views_boost - penalty
}

/// Articles matching `filter`, best rank first. Ties keep input order.
pub fn search_articles<'a>(
    articles: &'a [ScoredArticle],
    filter: &ArticleFilter,
) -> Vec<&'a ScoredArticle> {
    let mut ranked: Vec<(f64, &ScoredArticle)> = articles
        .iter()
        .filter(|a| filter.matches_article(a))
        .map(|a| (rank_score(a), a))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().map(|(_, a)| a).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSortColumn {
    /// Chunk title.
    Chunk,
    Persona,
    Summary,
    Updated,
    #[default]
    Confidence,
    Status,
}

impl FromStr for ChunkSortColumn {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chunk" | "title" => Ok(Self::Chunk),
            "persona" => Ok(Self::Persona),
            "summary" => Ok(Self::Summary),
            "updated" => Ok(Self::Updated),
            "confidence" => Ok(Self::Confidence),
            "status" => Ok(Self::Status),
            _ => Err(ParseTagError {
                kind: "sort column",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseTagError {
                kind: "sort direction",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkSort {
    pub column: ChunkSortColumn,
    pub direction: SortDirection,
}

impl ChunkSort {
    /// Header-click behaviour: the same column flips direction, a new column
    /// starts descending.
    pub fn toggle(self, column: ChunkSortColumn) -> Self {
        if self.column == column {
            let direction = match self.direction {
                SortDirection::Desc => SortDirection::Asc,
                SortDirection::Asc => SortDirection::Desc,
            };
            Self { column, direction }
        } else {
            Self {
                column,
                direction: SortDirection::Desc,
            }
        }
    }

    pub fn compare(&self, a: &Chunk, b: &Chunk) -> Ordering {
        let numeric = |f: fn(&Chunk) -> f64| {
            let ord = f(a).total_cmp(&f(b));
            if ord == Ordering::Equal {
                compare_text(&a.title, &b.title)
            } else {
                ord
            }
        };
        let ord = match self.column {
            ChunkSortColumn::Chunk => compare_text(&a.title, &b.title),
            ChunkSortColumn::Persona => compare_text(&persona_key(a), &persona_key(b)),
            ChunkSortColumn::Summary => compare_text(&a.summary, &b.summary),
            ChunkSortColumn::Updated => numeric(|c| {
                c.last_reviewed
                    .map_or(0.0, |ts| ts.timestamp_millis() as f64)
            }),
            ChunkSortColumn::Confidence => numeric(|c| c.confidence),
            ChunkSortColumn::Status => numeric(|c| if c.allowed_for_ai { 1.0 } else { 0.0 }),
        };
        self.direction.apply(ord)
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn persona_key(chunk: &Chunk) -> String {
    chunk
        .persona
        .iter()
        .map(Persona::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Chunks matching `filter`, ordered by `sort`.
pub fn filter_chunks<'a>(chunks: &'a [Chunk], filter: &ArticleFilter, sort: ChunkSort) -> Vec<&'a Chunk> {
    let mut matched: Vec<&Chunk> = chunks.iter().filter(|c| filter.matches_chunk(c)).collect();
    matched.sort_by(|a, b| sort.compare(a, b));
    matched
}

/// Vote totals across a set of articles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArticleStats {
    pub articles: usize,
    pub total_votes: u64,
    pub helpful_votes: u64,
    pub unhelpful_votes: u64,
    /// Articles whose positivity is at least one half.
    pub positive_articles: usize,
}

impl ArticleStats {
    pub fn collect<'a>(articles: impl IntoIterator<Item = &'a ScoredArticle>) -> Self {
        articles.into_iter().fold(Self::default(), |mut acc, a| {
            acc.articles += 1;
            acc.total_votes += a.votes.total;
            acc.helpful_votes += a.votes.upvotes;
            acc.unhelpful_votes += a.votes.downvotes;
            if a.votes.positivity.is_some_and(|p| p >= 0.5) {
                acc.positive_articles += 1;
            }
            acc
        })
    }

    pub fn sentiment_percent(&self) -> Option<u32> {
        percent(self.positive_articles as u64, self.articles as u64)
    }

    pub fn helpful_percent(&self) -> Option<u32> {
        percent(self.helpful_votes, self.helpful_votes + self.unhelpful_votes)
    }

    pub fn unhelpful_percent(&self) -> Option<u32> {
        percent(self.unhelpful_votes, self.helpful_votes + self.unhelpful_votes)
    }
}

fn percent(part: u64, whole: u64) -> Option<u32> {
    (whole > 0).then(|| (part as f64 / whole as f64 * 100.0).round() as u32)
}

/// Chunks at or above the display threshold versus those below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThresholdCounts {
    pub usable: usize,
    pub needs_review: usize,
}

pub fn threshold_counts<'a>(
    chunks: impl IntoIterator<Item = &'a Chunk>,
    threshold: DisplayThreshold,
) -> ThresholdCounts {
    chunks
        .into_iter()
        .fold(ThresholdCounts::default(), |mut acc, c| {
            if threshold.approves(c.confidence) {
                acc.usable += 1;
            } else {
                acc.needs_review += 1;
            }
            acc
        })
}

/// Landing-page category shortcuts and the feature area each opens.
pub const CATEGORY_AREAS: &[(&str, &str)] = &[
    ("getting-started", "authentication"),
    ("cards-controls", "cards"),
    ("bill-pay", "bill-pay"),
    ("accounting-close", "accounting"),
];

/// Resolve a category shortcut into a feature filter and a results heading.
pub fn browse_category(id: &str) -> Option<(ArticleFilter, String)> {
    CATEGORY_AREAS
        .iter()
        .find(|(category, _)| *category == id)
        .map(|(_, area)| {
            (
                ArticleFilter::for_feature(*area),
                format!("Browse: {}", format_feature(area)),
            )
        })
}
