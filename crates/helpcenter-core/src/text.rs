//! Text normalisation for article bodies and titles.
//!
//! Help-center bodies arrive as HTML. Classification and summaries work on
//! the stripped text: tags removed, entities decoded, whitespace collapsed.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>").expect("script regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space regex"));

/// Strip markup from an HTML fragment and collapse whitespace.
///
/// Tags become spaces so adjacent block elements don't fuse words together.
/// Entities are decoded after tag removal, so `&lt;b&gt;` survives as text.
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let without_scripts = SCRIPT_STYLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_scripts, " ");
    let decoded = ENTITY.replace_all(&without_tags, decode_entity);
    collapse_whitespace(&decoded)
}

/// Lower-case and collapse whitespace. Used for haystacks and title matching.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// First `max_chars` characters of `text`, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Shorten `text` to at most `max_chars`, cutting at a word boundary and
/// appending an ellipsis when anything was dropped.
pub fn summarize(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars);
    if head.len() == text.len() {
        return text.to_string();
    }
    let at_boundary = text[head.len()..].starts_with(char::is_whitespace);
    let cut = if at_boundary {
        head.len()
    } else {
        head.rfind(char::is_whitespace)
            .filter(|&i| i > 0)
            .unwrap_or(head.len())
    };
    format!("{}…", head[..cut].trim_end())
}

/// Turn a section or category name into a tag slug: `"Cards & Controls"` → `"cards-controls"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn decode_entity(caps: &Captures<'_>) -> String {
    let name = &caps[1];
    let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        named_entity(name)
    };
    match decoded {
        Some(ch) => ch.to_string(),
        None => caps[0].to_string(),
    }
}

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "bull" => '\u{2022}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        _ => return None,
    };
    Some(ch)
}
