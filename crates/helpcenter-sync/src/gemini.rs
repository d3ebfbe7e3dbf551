//! Gemini `generateContent` client used for generative answers.

use async_trait::async_trait;
use helpcenter_ai::answer::AnswerGenerator;
use serde_json::{Value, json};
use tracing::debug;

use crate::SyncError;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const TEMPERATURE: f64 = 0.2;
pub const MAX_OUTPUT_TOKENS: u32 = 700;

/// First six characters of `key` plus its length, for logs.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(6).collect();
    format!("{prefix}…({})", key.chars().count())
}

pub fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": TEMPERATURE,
            "maxOutputTokens": MAX_OUTPUT_TOKENS,
        }
    })
}

/// Text of the first candidate's parts, joined by newlines and trimmed.
/// Missing fields yield an empty string.
pub fn parse_response(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self, SyncError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(SyncError::MissingApiKey);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: GEMINI_ENDPOINT.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String, SyncError> {
        debug!(
            model = %self.model,
            key = %mask_key(&self.api_key),
            prompt_chars = prompt.chars().count(),
            "requesting generated answer"
        );
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let value: Value = resp.json().await?;
        Ok(parse_response(&value))
    }
}

#[async_trait]
impl AnswerGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(self.generate_content(prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            GeminiClient::new("   ", "gemini-1.5-flash"),
            Err(SyncError::MissingApiKey)
        ));
    }

    #[test]
    fn url_includes_model() {
        let client = GeminiClient::new("AIzaSecret", "gemini-1.5-flash").unwrap();
        assert_eq!(
            client.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert!(!client.url().contains("AIza"));
    }

    #[test]
    fn body_carries_prompt_and_generation_config() {
        let body = request_body("How do I lock a card?");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "How do I lock a card?");
        assert_eq!(body["generationConfig"]["temperature"], 0.2);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 700);
    }

    #[test]
    fn response_parts_are_joined() {
        let response = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "1. Open Cards." }, { "text": "" }, { "text": "2. Lock it. " }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(parse_response(&response), "1. Open Cards.\n2. Lock it.");
    }

    #[test]
    fn empty_response_is_empty_text() {
        assert_eq!(parse_response(&json!({ "candidates": [] })), "");
        assert_eq!(parse_response(&json!({})), "");
    }

    #[test]
    fn masked_key_hides_the_rest() {
        assert_eq!(mask_key("AIzaSyExample123"), "AIzaSy…(16)");
        assert_eq!(mask_key("abc"), "abc…(3)");
    }
}
