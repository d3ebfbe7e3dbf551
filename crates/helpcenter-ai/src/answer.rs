//! Retrieval-augmented answers: prompt assembly around a pluggable generator.
//!
//! The top-ranked articles become numbered context blocks; the generator sees
//! only that context plus the reader's question and audience.

use std::collections::BTreeSet;

use async_trait::async_trait;
use helpcenter_core::text::{strip_html, truncate_chars};
use helpcenter_core::{Persona, ServiceTier};
use serde::Serialize;
use tracing::debug;

use crate::scoring::ScoredArticle;

pub const MAX_CONTEXT_ARTICLES: usize = 6;
pub const MAX_CONTEXT_CHARS: usize = 600;
pub const NO_ANSWER: &str = "No answer generated.";

const INSTRUCTIONS: &[&str] = &[
    "You are the Help Center assistant. Provide a concise, step-by-step answer.",
    "Use ONLY the provided context. If insufficient, say so briefly and suggest next steps.",
    "Be specific to the audience if provided. Prefer bullet points and numbered steps.",
];

/// The reader's selected filters, echoed to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audience {
    pub personas: BTreeSet<Persona>,
    pub tiers: BTreeSet<ServiceTier>,
    pub integrations: BTreeSet<String>,
}

impl Audience {
    /// `"Persona: admin | Integrations: okta"`, or `None` with no selection.
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.personas.is_empty() {
            parts.push(format!("Persona: {}", join(self.personas.iter())));
        }
        if !self.tiers.is_empty() {
            parts.push(format!("Service tier: {}", join(self.tiers.iter())));
        }
        if !self.integrations.is_empty() {
            parts.push(format!("Integrations: {}", join(self.integrations.iter())));
        }
        (!parts.is_empty()).then(|| parts.join(" | "))
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

/// Numbered context blocks for the first [`MAX_CONTEXT_ARTICLES`] articles.
pub fn build_context(articles: &[&ScoredArticle]) -> String {
    articles
        .iter()
        .take(MAX_CONTEXT_ARTICLES)
        .enumerate()
        .map(|(idx, scored)| {
            let a = &scored.article;
            let body = strip_html(&a.raw.body);
            let excerpt = if body.is_empty() {
                truncate_chars(&scored.summary, MAX_CONTEXT_CHARS)
            } else {
                truncate_chars(&body, MAX_CONTEXT_CHARS)
            };
            let mut lines = vec![format!("[{}] {}", idx + 1, a.raw.title)];
            if !a.persona.is_empty() {
                lines.push(format!("Persona: {}", join(a.persona.iter())));
            }
            if !a.service_tier.is_empty() {
                lines.push(format!("Service tier: {}", join(a.service_tier.iter())));
            }
            if !a.integrations.is_empty() {
                lines.push(format!("Integrations: {}", join(a.integrations.iter())));
            }
            lines.push(format!("URL: {}", a.raw.html_url.as_deref().unwrap_or("")));
            if !excerpt.is_empty() {
                lines.push(format!("Excerpt: {excerpt}"));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(question: &str, audience: &Audience, context: &str) -> String {
    let mut sections: Vec<String> = INSTRUCTIONS.iter().map(|s| s.to_string()).collect();
    if let Some(line) = audience.describe() {
        sections.push(format!("Audience: {line}"));
    }
    let question = question.trim();
    let question = if question.is_empty() {
        "(no query provided)"
    } else {
        question
    };
    sections.push(format!("User question: {question}\n"));
    let context = if context.is_empty() {
        "(no context)"
    } else {
        context
    };
    sections.push(format!("Context (numbered sources):\n{context}"));
    sections.join("\n\n")
}

/// A text-generation backend.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerSource {
    pub index: usize,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiAnswer {
    pub answer: String,
    pub sources: Vec<AnswerSource>,
}

/// Answer `question` from the ranked `articles` using `generator`.
pub async fn answer_question(
    generator: &dyn AnswerGenerator,
    question: &str,
    audience: &Audience,
    articles: &[&ScoredArticle],
) -> anyhow::Result<AiAnswer> {
    let context = build_context(articles);
    let prompt = build_prompt(question, audience, &context);
    debug!(
        articles = articles.len().min(MAX_CONTEXT_ARTICLES),
        prompt_chars = prompt.len(),
        "requesting answer"
    );
    let text = generator.generate(&prompt).await?;
    let text = text.trim();
    let answer = if text.is_empty() { NO_ANSWER } else { text };
    let sources = articles
        .iter()
        .take(MAX_CONTEXT_ARTICLES)
        .enumerate()
        .map(|(idx, a)| AnswerSource {
            index: idx + 1,
            title: a.article.raw.title.clone(),
            url: a.article.raw.html_url.clone().unwrap_or_default(),
        })
        .collect();
    Ok(AiAnswer {
        answer: answer.to_string(),
        sources,
    })
}
