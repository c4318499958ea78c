//! Anthropic advisor over the Messages API.
//!
//! Plain non-streaming calls: judgment answers are a few tokens, insights a
//! couple of sentences. The API key comes from `ANTHROPIC_API_KEY`; the
//! base URL can be overridden in settings (used by tests).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use muse_core::{ChangeSummary, Verdict};
use muse_settings::LlmSettings;

use crate::advisor::{Advisor, AdvisorError, AdvisorResult};
use crate::prompt::{
    build_insight_prompt, build_judgment_prompt, parse_verdict, INSIGHT_SYSTEM_PROMPT,
    JUDGMENT_SYSTEM_PROMPT,
};

/// Default base URL for the Anthropic API.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Environment variable holding the API key.
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Max tokens for the judgment call (a few words).
const JUDGMENT_MAX_TOKENS: u32 = 50;

/// Max tokens for insight generation.
const INSIGHT_MAX_TOKENS: u32 = 400;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Anthropic-backed advisor.
#[derive(Debug)]
pub struct AnthropicAdvisor {
    model: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicAdvisor {
    /// Build from settings, reading the API key from the environment.
    pub fn from_settings(settings: &LlmSettings) -> AdvisorResult<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| AdvisorError::MissingApiKey { var: API_KEY_VAR })?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self {
            model: settings.model.clone(),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            client,
        })
    }

    fn build_headers(&self) -> AdvisorResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        let _ = headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|_| AdvisorError::MalformedResponse {
                message: "API key is not a valid header value".to_string(),
            })?,
        );
        Ok(headers)
    }

    async fn complete(
        &self,
        system: &str,
        user: String,
        max_tokens: u32,
    ) -> AdvisorResult<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "system": system,
            "messages": [{"role": "user", "content": user}],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<String>();
        if text.is_empty() {
            return Err(AdvisorError::MalformedResponse {
                message: "response carried no text content".to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl Advisor for AnthropicAdvisor {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn assess(&self, summary: &ChangeSummary) -> AdvisorResult<Verdict> {
        let prompt = build_judgment_prompt(summary);
        let answer = self
            .complete(JUDGMENT_SYSTEM_PROMPT, prompt, JUDGMENT_MAX_TOKENS)
            .await?;
        debug!(answer = %answer, "judgment answer");
        parse_verdict(&answer).ok_or_else(|| AdvisorError::MalformedResponse {
            message: format!("no YES/NO in judgment answer: {answer}"),
        })
    }

    async fn insight(&self, summary: &ChangeSummary) -> AdvisorResult<String> {
        let prompt = build_insight_prompt(summary);
        self.complete(INSIGHT_SYSTEM_PROMPT, prompt, INSIGHT_MAX_TOKENS)
            .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn advisor(base_url: &str) -> AnthropicAdvisor {
        AnthropicAdvisor {
            model: "claude-3-5-sonnet-20241022".to_string(),
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn summary() -> ChangeSummary {
        ChangeSummary::from_changes(&[], 5, false)
    }

    #[tokio::test]
    async fn assess_parses_judgment_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "YES, confidence 8"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let verdict = advisor(&server.uri()).assess(&summary()).await.unwrap();
        assert!(verdict.intervene);
        assert_eq!(verdict.confidence, 8);
    }

    #[tokio::test]
    async fn insight_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "Consider extracting the auth check."}]
            })))
            .mount(&server)
            .await;

        let text = advisor(&server.uri()).insight(&summary()).await.unwrap();
        assert!(text.contains("auth check"));
    }

    #[tokio::test]
    async fn error_status_surfaces_as_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = advisor(&server.uri()).assess(&summary()).await.unwrap_err();
        assert_matches!(err, AdvisorError::Api { status: 429, .. });
    }

    #[tokio::test]
    async fn unparseable_judgment_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "perhaps"}]
            })))
            .mount(&server)
            .await;

        let err = advisor(&server.uri()).assess(&summary()).await.unwrap_err();
        assert_matches!(err, AdvisorError::MalformedResponse { .. });
    }

    #[tokio::test]
    async fn empty_content_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": []
            })))
            .mount(&server)
            .await;

        let err = advisor(&server.uri()).insight(&summary()).await.unwrap_err();
        assert_matches!(err, AdvisorError::MalformedResponse { .. });
    }
}
