//! Terminal rendering for articles, chunks, and operator queues.
//!
//! Lists print as compact cards: a title line followed by indented
//! `label  value` rows, the same layout across every view.

use chrono::{DateTime, Utc};
use helpcenter_ai::answer::AiAnswer;
use helpcenter_ai::browse::{ArticleStats, ThresholdCounts};
use helpcenter_ai::facets::{FacetOption, Facets};
use helpcenter_ai::insights::{OpsQueues, QueueItem};
use helpcenter_ai::keywords::RuleSummary;
use helpcenter_ai::{Chunk, ScoredArticle};
use helpcenter_core::text::truncate_chars;
use helpcenter_core::{ArticleOverride, DisplayThreshold};

const MAX_TITLE_CHARS: usize = 72;
const LABEL_WIDTH: usize = 12;

// ── Formatting helpers ──

/// `"today"`, `"1 day"`, `"3 months"`, …; `None` when the date is unknown.
pub fn format_relative(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<String> {
    let days = (now - date?).num_days();
    let text = if days <= 0 {
        "today".to_string()
    } else if days == 1 {
        "1 day".to_string()
    } else if days < 30 {
        format!("{days} days")
    } else if days / 30 == 1 {
        "1 month".to_string()
    } else if days / 30 < 12 {
        format!("{} months", days / 30)
    } else if days / 360 == 1 {
        "1 year".to_string()
    } else {
        format!("{} years", days / 360)
    };
    Some(text)
}

/// `"Today"`, `"3 days ago"`, or `fallback` for unknown dates.
pub fn updated_label(date: Option<DateTime<Utc>>, now: DateTime<Utc>, fallback: &str) -> String {
    match format_relative(date, now) {
        Some(rel) if rel == "today" => "Today".to_string(),
        Some(rel) => format!("{rel} ago"),
        None => fallback.to_string(),
    }
}

pub fn format_percent(fraction: Option<f64>) -> String {
    match fraction {
        Some(f) => format!("{}%", (f * 100.0).round() as i64),
        None => "-".to_string(),
    }
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", truncate_chars(text, max.saturating_sub(3)))
    } else {
        text.to_string()
    }
}

fn join_or_dash<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    let items: Vec<String> = items.into_iter().map(|i| i.to_string()).collect();
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<width$} {}", label, value, width = LABEL_WIDTH);
}

fn print_more(shown: usize, total: usize) {
    if total > shown {
        println!("... and {} more", total - shown);
    }
}

// ── Reader view ──

pub fn print_articles(articles: &[&ScoredArticle], limit: usize, now: DateTime<Utc>) {
    if articles.is_empty() {
        println!("No articles match the current filters.");
        return;
    }
    for scored in articles.iter().take(limit) {
        let a = &scored.article;
        println!("{}", shorten(&a.raw.title, MAX_TITLE_CHARS));
        row("persona", join_or_dash(&a.persona));
        row("tier", join_or_dash(&a.service_tier));
        if !a.integrations.is_empty() {
            row("integrations", join_or_dash(&a.integrations));
        }
        let votes = &scored.votes;
        row(
            "votes",
            format!(
                "{} ({} positive)",
                votes.total,
                format_percent(votes.positivity)
            ),
        );
        if scored.is_placeholder() {
            row("updated", "Usage snapshot");
        } else {
            row("updated", updated_label(a.raw.updated_at, now, "Recently"));
        }
        if let Some(views) = a.raw.views_30d {
            row("views", format!("{views} (30d)"));
        }
        if let Some(url) = &a.raw.html_url {
            row("url", url);
        }
        println!("  {}", scored.summary);
        println!();
    }
    print_more(limit.min(articles.len()), articles.len());
}

// ── AI retrieval view ──

pub fn status_label(chunk: &Chunk) -> &'static str {
    if chunk.allowed_for_ai {
        "Approved"
    } else {
        "Human review"
    }
}

pub fn print_chunks(chunks: &[&Chunk], threshold: DisplayThreshold, limit: usize, now: DateTime<Utc>) {
    if chunks.is_empty() {
        println!("No chunks match the current filters.");
        return;
    }
    for chunk in chunks.iter().take(limit) {
        let marker = if threshold.approves(chunk.confidence) {
            ' '
        } else {
            '!'
        };
        println!(
            "{marker} {:<4} {}",
            format_percent(Some(chunk.confidence)),
            shorten(&chunk.title, MAX_TITLE_CHARS)
        );
        row(
            "persona",
            format!(
                "{} / {}",
                join_or_dash(&chunk.persona),
                join_or_dash(&chunk.service_tier)
            ),
        );
        let updated = chunk
            .last_reviewed
            .map(|d| format!("{} ({})", d.format("%b %-d, %Y"), updated_label(Some(d), now, "")))
            .unwrap_or_else(|| "-".to_string());
        row("updated", updated);
        row("status", status_label(chunk));
        row(
            "",
            format!(
                "Votes: {} • Positive: {}",
                chunk.vote_total,
                format_percent(chunk.positivity)
            ),
        );
        if let Some(days) = chunk.confidence_breakdown.recency_days {
            row("", format!("Age: {}d", days.round() as i64));
        }
        if !chunk.allowed_for_ai
            && let Some(needs) = chunk.approval_checks.needs_line()
        {
            row("", needs);
        }
        println!("  {}", chunk.summary);
        println!();
    }
    print_more(limit.min(chunks.len()), chunks.len());
}

pub fn print_threshold_counts(counts: &ThresholdCounts, threshold: DisplayThreshold) {
    println!(
        "Threshold {}%: {} usable, {} need review",
        threshold.percent(),
        counts.usable,
        counts.needs_review
    );
}

// ── Operator view ──

fn print_queue_item(item: &QueueItem<'_>, now: DateTime<Utc>) {
    let a = &item.article.article;
    println!("{}", shorten(item.title, MAX_TITLE_CHARS));
    row("id", item.id);
    row(
        "audience",
        format!(
            "{} / {}",
            join_or_dash(&a.persona),
            join_or_dash(&a.service_tier)
        ),
    );
    let sentiment = match item.votes.positivity {
        Some(p) => format!("{}% positive of {}", (p * 100.0).round() as i64, item.votes.total),
        None => "No feedback yet".to_string(),
    };
    row("sentiment", sentiment);
    row("updated", updated_label(a.raw.updated_at, now, "Recently"));
    row("urgency", format!("{:.1}", item.urgency));
    println!("  {}", item.insight);
    println!();
}

pub fn print_ops_queues(queues: &OpsQueues<'_>, now: DateTime<Utc>) {
    println!("=== Alerts ({}) ===", queues.alerts.len());
    if queues.alerts.is_empty() {
        println!("Nothing needs attention.");
    }
    for item in &queues.alerts {
        print_queue_item(item, now);
    }
    println!();
    println!("=== Stale ({}) ===", queues.stale.len());
    if queues.stale.is_empty() {
        println!("No stale articles.");
    }
    for item in &queues.stale {
        print_queue_item(item, now);
    }
}

pub fn print_stats(stats: &ArticleStats, counts: &ThresholdCounts, threshold: DisplayThreshold) {
    let pct = |p: Option<u32>| p.map_or_else(|| "-".to_string(), |p| format!("{p}%"));
    println!("Articles");
    row("total", stats.articles);
    row("positive", format!("{} ({})", stats.positive_articles, pct(stats.sentiment_percent())));
    println!("Votes");
    row("total", stats.total_votes);
    row("helpful", format!("{} ({})", stats.helpful_votes, pct(stats.helpful_percent())));
    row(
        "unhelpful",
        format!("{} ({})", stats.unhelpful_votes, pct(stats.unhelpful_percent())),
    );
    println!();
    print_threshold_counts(counts, threshold);
}

fn print_facet_group(header: &str, options: &[FacetOption]) {
    if options.is_empty() {
        return;
    }
    println!("{header}");
    for option in options {
        println!("  {:<24} {}", option.value, option.label);
        if !option.definition.is_empty() {
            println!("  {:<24} {}", "", option.definition);
        }
    }
    println!();
}

pub fn print_facets(facets: &Facets) {
    if facets.is_empty() {
        println!("No facets available.");
        return;
    }
    print_facet_group("Persona", &facets.personas);
    print_facet_group("Service tier", &facets.tiers);
    print_facet_group("Feature area", &facets.features);
    print_facet_group("Integrations", &facets.integrations);
    print_facet_group("Region", &facets.regions);
}

pub fn print_override(id: &str, edit: &ArticleOverride) {
    println!("{id}");
    if let Some(title) = &edit.title {
        row("title", title);
    }
    if let Some(body) = &edit.body {
        row("body", shorten(body, MAX_TITLE_CHARS));
    }
    if let Some(persona) = &edit.persona {
        row("persona", join_or_dash(persona));
    }
    if let Some(tiers) = &edit.service_tier {
        row("tier", join_or_dash(tiers));
    }
    if let Some(features) = &edit.feature_area {
        row("features", join_or_dash(features));
    }
    if let Some(integrations) = &edit.integrations {
        row("integrations", join_or_dash(integrations));
    }
    if let Some(regions) = &edit.regions {
        row("regions", join_or_dash(regions));
    }
}

pub fn print_answer(answer: &AiAnswer) {
    println!("{}", answer.answer);
    if answer.sources.is_empty() {
        return;
    }
    println!();
    println!("Sources");
    for source in &answer.sources {
        println!("  [{}] {}", source.index, source.title);
        if !source.url.is_empty() {
            println!("      {}", source.url);
        }
    }
}

pub fn print_rule_summary(summary: &RuleSummary) {
    println!("Keyword rules");
    row("personas", summary.persona_tags);
    row("features", summary.feature_areas);
    row("integrations", summary.integrations);
    row("journeys", summary.journey_stages);
    row("patterns", summary.total_patterns);
}
