//! HTTP client for Gemini's `generateContent` endpoint.
//!
//! The provider posts a comparison prompt, pulls the first JSON object out
//! of the model's free-text answer, and turns it into a
//! [`SemanticVerdict`]. Transport and payload failures are reported as
//! [`SemanticError`] values so the engine can fall back to local scores.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use findx_core::{ReportSummary, SemanticError, SemanticSimilarity, SemanticVerdict};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::api::{GenerateContentRequest, GenerateContentResponse};
use crate::prompt::comparison_prompt;

/// Default Gemini API origin.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model used for comparisons.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default user agent for Gemini requests.
pub const DEFAULT_USER_AGENT: &str = "findx-gemini/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Error returned when [`GeminiSemanticSimilarity`] cannot be constructed.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Configuration for [`GeminiSemanticSimilarity`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// API origin, without the `/v1beta` path.
    pub base_url: String,
    /// Model name, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a configuration with `api_key` and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Point requests at another origin, such as a proxy or test server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Semantic similarity backed by a Gemini model.
///
/// The lost report is always presented first in the prompt. The model's
/// confidence is clamped to `0..=100`; a missing confidence counts as zero
/// and missing reasons as none.
#[derive(Debug, Clone)]
pub struct GeminiSemanticSimilarity {
    client: Client,
    config: GeminiConfig,
}

impl GeminiSemanticSimilarity {
    /// Create a provider for `api_key` with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(config: GeminiConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        Ok(Self { client, config })
    }

    /// Configuration in force.
    #[must_use]
    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// `generateContent` URL for the configured model.
    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> SemanticError {
        if error.is_timeout() {
            return SemanticError::Timeout {
                timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }

        if let Some(status) = error.status() {
            return SemanticError::Http {
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        SemanticError::Network {
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl SemanticSimilarity for GeminiSemanticSimilarity {
    async fn compare(
        &self,
        lost: &ReportSummary<'_>,
        found: &ReportSummary<'_>,
    ) -> Result<SemanticVerdict, SemanticError> {
        let url = self.endpoint_url();
        let body = GenerateContentRequest::from_prompt(comparison_prompt(lost, found));
        log::debug!("requesting comparison from {url}");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let payload: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|err| SemanticError::MalformedResponse {
                    message: err.to_string(),
                })?;

        convert_response(&payload).inspect_err(|err| {
            log::warn!("discarding Gemini answer for {:?}: {err}", found.title);
        })
    }
}

/// Turn a `generateContent` payload into a verdict.
fn convert_response(payload: &GenerateContentResponse) -> Result<SemanticVerdict, SemanticError> {
    let text = payload
        .first_text()
        .ok_or_else(|| SemanticError::MalformedResponse {
            message: "response has no candidate text".to_owned(),
        })?;
    let object = extract_json_object(&text).ok_or_else(|| SemanticError::MalformedResponse {
        message: "response contains no JSON object".to_owned(),
    })?;
    let value: Value =
        serde_json::from_str(object).map_err(|err| SemanticError::MalformedResponse {
            message: err.to_string(),
        })?;
    Ok(verdict_from_value(&value))
}

/// Slice `text` from its first `{` to its last `}`.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Read `confidence` and `reasons`, tolerating absent or mistyped fields.
fn verdict_from_value(value: &Value) -> SemanticVerdict {
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);
    let reasons = value
        .get("reasons")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    SemanticVerdict::new(confidence, reasons)
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    clippy::float_arithmetic,
    reason = "tests fail fast on broken setup and compare floating point values"
)]
mod tests {
    use super::*;
    use findx_core::Category;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn provider() -> GeminiSemanticSimilarity {
        GeminiSemanticSimilarity::new("test-key").expect("provider should build")
    }

    fn payload_with_text(text: &str) -> GenerateContentResponse {
        serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
        .expect("payload should deserialise")
    }

    #[rstest]
    fn endpoint_url_names_the_model(provider: GeminiSemanticSimilarity) {
        assert_eq!(
            provider.endpoint_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[rstest]
    fn endpoint_url_strips_trailing_slash() {
        let provider = GeminiSemanticSimilarity::with_config(
            GeminiConfig::new("k")
                .with_base_url("http://localhost:8080/")
                .with_model("gemini-pro"),
        )
        .expect("provider should build");
        assert_eq!(
            provider.endpoint_url(),
            "http://localhost:8080/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[rstest]
    #[case("{\"confidence\": 80}", Some("{\"confidence\": 80}"))]
    #[case("```json\n{\"a\": {\"b\": 1}}\n```", Some("{\"a\": {\"b\": 1}}"))]
    #[case("no json here", None)]
    #[case("} backwards {", None)]
    fn extract_json_object_cases(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_json_object(text), expected);
    }

    #[rstest]
    fn convert_response_reads_fenced_answer() {
        let payload = payload_with_text(
            "Here you go:\n```json\n{\"confidence\": 85, \"reasons\": [\"Same model\", \"Same colour\"]}\n```",
        );
        let verdict = convert_response(&payload).expect("verdict");
        assert_eq!(
            verdict,
            SemanticVerdict::new(85.0, vec!["Same model".to_owned(), "Same colour".to_owned()])
        );
    }

    #[rstest]
    #[case(json!({ "confidence": 140, "reasons": [] }), 100.0)]
    #[case(json!({ "confidence": -20 }), 0.0)]
    #[case(json!({ "confidence": "high" }), 0.0)]
    #[case(json!({ "reasons": ["unsure"] }), 0.0)]
    #[case(json!({ "confidence": 42.5 }), 42.5)]
    fn confidence_is_defaulted_and_clamped(#[case] value: Value, #[case] expected: f64) {
        let verdict = verdict_from_value(&value);
        assert!((verdict.confidence - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(json!({ "confidence": 50 }), Vec::<&str>::new())]
    #[case(json!({ "confidence": 50, "reasons": "not a list" }), Vec::new())]
    #[case(json!({ "confidence": 50, "reasons": ["a", 3, "b"] }), vec!["a", "b"])]
    fn reasons_default_to_empty(#[case] value: Value, #[case] expected: Vec<&str>) {
        assert_eq!(verdict_from_value(&value).reasons, expected);
    }

    #[rstest]
    #[case(json!({ "candidates": [] }))]
    #[case(json!({ "candidates": [{ "content": { "parts": [{ "text": "I cannot say." }] } }] }))]
    #[case(json!({ "candidates": [{ "content": { "parts": [{ "text": "{not json}" }] } }] }))]
    fn unusable_payloads_are_malformed(#[case] body: Value) {
        let payload: GenerateContentResponse =
            serde_json::from_value(body).expect("payload should deserialise");
        let err = convert_response(&payload).expect_err("payload should be rejected");
        assert!(matches!(err, SemanticError::MalformedResponse { .. }));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = GeminiConfig::new("secret")
            .with_base_url("http://example.com")
            .with_model("gemini-2.0-flash")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }

    #[rstest]
    fn debug_output_redacts_the_key() {
        let rendered = format!("{:?}", GeminiConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let provider = GeminiSemanticSimilarity::with_config(
            GeminiConfig::new("k")
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(Duration::from_secs(5)),
        )
        .expect("provider should build");
        let tags: Vec<String> = Vec::new();
        let summary = ReportSummary {
            title: "Wallet",
            description: "",
            tags: &tags,
            category: Category::Item,
        };

        let err = provider
            .compare(&summary, &summary)
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(
            err,
            SemanticError::Network { .. } | SemanticError::Timeout { .. }
        ));
    }
}
