//! OpenAI advisor over the chat completions API.
//!
//! Same shape as the Anthropic advisor: short non-streaming calls, API key
//! from `OPENAI_API_KEY`, base URL overridable for tests.

use async_trait::async_trait;
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

/// Default base URL for the OpenAI API.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Environment variable holding the API key.
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Max tokens for the judgment call.
const JUDGMENT_MAX_TOKENS: u32 = 50;

/// Max tokens for insight generation.
const INSIGHT_MAX_TOKENS: u32 = 400;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// OpenAI-backed advisor.
#[derive(Debug)]
pub struct OpenAiAdvisor {
    model: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiAdvisor {
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

    async fn complete(
        &self,
        system: &str,
        user: String,
        max_tokens: u32,
    ) -> AdvisorResult<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AdvisorError::MalformedResponse {
                message: "response carried no choices".to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl Advisor for OpenAiAdvisor {
    fn name(&self) -> &'static str {
        "openai"
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
