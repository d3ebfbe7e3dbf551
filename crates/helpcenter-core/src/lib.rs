pub mod article;
pub mod config;
pub mod overrides;
pub mod text;
pub mod usage;

pub use article::{
    Category, ClassifiedArticle, JourneyStage, ParseTagError, Persona, RawArticle, Region,
    Section, ServiceTier,
};
pub use config::{ConfigError, DisplayThreshold, HelpCenterConfig};
pub use overrides::{ArticleOverride, OverrideMap};
pub use usage::UsageRecord;
