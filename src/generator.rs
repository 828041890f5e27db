//! Fresh word batches from the Gemini generative language API.
//!
//! Every failure (no key, transport, status, bad JSON) ends up as an empty
//! batch. Callers only ever see "some words" or "no words".

use crate::wordbank::{WordEntry, is_playable};
use crate::{info_log, warn_log};
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub trait WordGenerator: Send + Sync {
    /// Produce up to `count` new words. Empty on any failure.
    fn generate(&self, count: usize) -> impl Future<Output = Vec<WordEntry>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered with status {0}")]
    Status(u16),

    #[error("response carried no text")]
    EmptyResponse,

    #[error("malformed word list: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateReply {
    fn text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RawWord {
    hindi: String,
    english: String,
    transliteration: String,
}

fn prompt(count: usize) -> String {
    format!(
        "Generate {count} simple 2-letter Hindi words (Do Akshar Wale Shabd) for a beginner \
         language learning game. The words must be strictly 2 distinct characters (or a simple \
         conjunct that acts as one sound unit, but ideally simple consonants). Avoid complex \
         matras if possible, stick to the basics like 'Jal', 'Ghar', 'Fal'.\n\n\
         Return a JSON array where each object has:\n\
         - hindi: The Hindi word (e.g., 'जल')\n\
         - english: The English meaning (e.g., 'Water')\n\
         - transliteration: The English phonetic pronunciation (e.g., 'Jal')"
    )
}

fn request_body(count: usize) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt(count) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "hindi": { "type": "STRING" },
                        "english": { "type": "STRING" },
                        "transliteration": { "type": "STRING" }
                    },
                    "required": ["hindi", "english", "transliteration"]
                }
            }
        }
    })
}

/// Turn the model's JSON text into entries. Items that are not objects, lack
/// a non-empty field, or whose `hindi` is not playable are dropped.
/// Ids are `ai-{stamp}-{batch}-{index}`.
pub fn parse_words(text: &str, stamp: i64, batch: u64) -> Result<Vec<WordEntry>, GenerateError> {
    let items: Vec<Value> = serde_json::from_str(text)?;
    let words = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawWord>(item).ok())
        .filter_map(|raw| {
            let hindi = raw.hindi.trim();
            let english = raw.english.trim();
            let transliteration = raw.transliteration.trim();
            let valid = is_playable(hindi) && !english.is_empty() && !transliteration.is_empty();
            valid.then(|| (hindi.to_string(), english.to_string(), transliteration.to_string()))
        })
        .enumerate()
        .map(|(index, (hindi, english, transliteration))| {
            WordEntry::new(
                format!("ai-{stamp}-{batch}-{index}"),
                hindi,
                english,
                transliteration,
            )
        })
        .collect();
    Ok(words)
}

pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    batches: AtomicU64,
}

impl GeminiGenerator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            batches: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn request_text(&self, count: usize) -> Result<String, GenerateError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(GenerateError::MissingCredential)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&request_body(count))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Status(status.as_u16()));
        }
        let reply: GenerateReply = response.json().await?;
        reply.text().ok_or(GenerateError::EmptyResponse)
    }

    async fn try_generate(&self, count: usize) -> Result<Vec<WordEntry>, GenerateError> {
        let text = self.request_text(count).await?;
        let batch = self.batches.fetch_add(1, Ordering::Relaxed);
        parse_words(&text, chrono::Utc::now().timestamp_millis(), batch)
    }
}

impl WordGenerator for GeminiGenerator {
    async fn generate(&self, count: usize) -> Vec<WordEntry> {
        if count == 0 {
            return Vec::new();
        }
        match self.try_generate(count).await {
            Ok(words) => {
                info_log!("generated {} of {} requested words", words.len(), count);
                words
            }
            Err(GenerateError::MissingCredential) => {
                warn_log!("API key is missing, no words generated");
                Vec::new()
            }
            Err(e) => {
                warn_log!("word generation failed: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_words_assigns_ids() {
        let text = r#"[
            {"hindi": "जल", "english": "Water", "transliteration": "Jal"},
            {"hindi": "घर", "english": "Home", "transliteration": "Ghar"}
        ]"#;
        let words = parse_words(text, 1700, 2).unwrap();
        assert_eq!(
            words,
            vec![
                WordEntry::new("ai-1700-2-0", "जल", "Water", "Jal"),
                WordEntry::new("ai-1700-2-1", "घर", "Home", "Ghar"),
            ]
        );
    }

    #[test]
    fn test_parse_words_drops_invalid_items() {
        let text = r#"[
            {"hindi": "", "english": "Nothing", "transliteration": "x"},
            {"hindi": "फल", "english": "Fruit"},
            {"hindi": "Jal", "english": "Water", "transliteration": "Jal"},
            {"hindi": 5, "english": "Five", "transliteration": "Paanch"},
            "नल",
            {"hindi": " वन ", "english": " Forest ", "transliteration": "Van", "extra": true},
            {"hindi": "बस", "english": "Bus", "transliteration": "   "}
        ]"#;
        let words = parse_words(text, 1, 0).unwrap();
        assert_eq!(words, vec![WordEntry::new("ai-1-0-0", "वन", "Forest", "Van")]);
    }

    #[test]
    fn test_parse_words_drops_words_longer_than_pool() {
        let text = r#"[
            {"hindi": "कखगघङचछजझ", "english": "Nine", "transliteration": "Nine"},
            {"hindi": "कखगघङचछज", "english": "Eight", "transliteration": "Eight"}
        ]"#;
        let words = parse_words(text, 3, 1).unwrap();
        assert_eq!(words, vec![WordEntry::new("ai-3-1-0", "कखगघङचछज", "Eight", "Eight")]);
    }

    #[test]
    fn test_parse_words_rejects_non_array() {
        assert!(matches!(
            parse_words(r#"{"hindi": "जल"}"#, 1, 0),
            Err(GenerateError::Json(_))
        ));
        assert!(parse_words("not json", 1, 0).is_err());
    }

    #[test]
    fn test_reply_text_extraction() {
        let reply: GenerateReply = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "[]"}], "role": "model"}}]}"#,
        )
        .unwrap();
        assert_eq!(reply.text().as_deref(), Some("[]"));

        let empty: GenerateReply = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_request_body_carries_count_and_schema() {
        let body = request_body(7);
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Generate 7 simple"));
        assert_eq!(
            body["generationConfig"]["responseSchema"]["items"]["required"],
            json!(["hindi", "english", "transliteration"])
        );
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        assert!(!GeminiGenerator::new(Some("  ".into())).has_credential());
        assert!(!GeminiGenerator::new(None).has_credential());
        assert!(GeminiGenerator::new(Some("k".into())).has_credential());
    }

    #[tokio::test]
    async fn test_missing_key_yields_empty_batch() {
        let generator = GeminiGenerator::new(None);
        assert!(generator.generate(5).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_yields_empty_batch() {
        let generator =
            GeminiGenerator::new(Some("key".into())).with_base_url("http://127.0.0.1:9");
        assert!(generator.generate(5).await.is_empty());
    }
}
