//! Classification and scoring layer: keyword heuristics for metadata tags,
//! vote/recency confidence, and the AI-retrieval eligibility gate.

pub mod answer;
pub mod browse;
mod chunk;
mod classifier;
pub mod facets;
pub mod insights;
pub mod keywords;
mod pipeline;
pub mod scoring;

pub use chunk::{Chunk, SUMMARY_CHARS, build_chunk};
pub use classifier::{MetadataClassifier, PERSONA_BODY_PREFIX_CHARS};
pub use keywords::{KeywordEntry, KeywordRuleSet, KeywordRules};
pub use pipeline::{Evaluation, Pipeline};
pub use scoring::gate::{ApprovalCheck, ApprovalChecks};
pub use scoring::votes::{Votes, derive_votes};
pub use scoring::{ScoredArticle, score};
