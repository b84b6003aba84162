//! Gemini `generateContent` request and response types.
//!
//! Only the fields the provider reads or writes are modelled; unknown fields
//! in responses are ignored.
//!
//! See: <https://ai.google.dev/api/generate-content>

use serde::{Deserialize, Serialize};

/// Harm categories blocked at medium probability and above.
const BLOCKED_CATEGORIES: [&str; 2] = ["HARM_CATEGORY_HARASSMENT", "HARM_CATEGORY_HATE_SPEECH"];
const BLOCK_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    /// Single-turn user request carrying `prompt`.
    pub fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_owned()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            safety_settings: BLOCKED_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).to_owned(),
                    threshold: BLOCK_THRESHOLD.to_owned(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// Response body for `generateContent`.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        Some(text)
    }
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn request_serialises_prompt_and_safety_settings() {
        let request = GenerateContentRequest::from_prompt("compare".to_owned());
        let value = serde_json::to_value(&request).expect("request should serialise");
        assert_eq!(
            value,
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "compare" }] }],
                "safetySettings": [
                    { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                    { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" }
                ]
            })
        );
    }

    #[rstest]
    fn first_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "{\"confidence\":" }, { "text": " 80}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ],
            "usageMetadata": { "totalTokenCount": 12 }
        }))
        .expect("response should deserialise");
        assert_eq!(response.first_text().as_deref(), Some("{\"confidence\": 80}"));
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({ "candidates": [] }))]
    #[case(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))]
    fn first_text_is_absent_without_content(#[case] body: serde_json::Value) {
        let response: GenerateContentResponse =
            serde_json::from_value(body).expect("response should deserialise");
        assert!(response.first_text().is_none());
    }
}
