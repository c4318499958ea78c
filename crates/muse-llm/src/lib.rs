//! # muse-llm
//!
//! The LLM advisor for the Muse assistant.
//!
//! The advisor plays two roles in a monitoring session:
//!
//! - **Judgment call** ([`Advisor::assess`]): the optional second gate of
//!   the decision engine — given a change summary, answer yes/no with a
//!   confidence of 1–10
//! - **Insight generation** ([`Advisor::insight`]): once the engine decides
//!   to intervene, produce the observation text shown to the developer
//!
//! Providers: Anthropic (Messages API) and OpenAI (chat completions),
//! selected by settings, keys from the environment. Every advisor failure
//! is non-fatal — the session degrades to heuristic-only decisions and
//! canned observations for the cycle.

#![deny(unsafe_code)]

pub mod advisor;
pub mod anthropic;
pub mod openai;
pub mod prompt;

pub use advisor::{Advisor, AdvisorError, AdvisorResult};
pub use anthropic::AnthropicAdvisor;
pub use openai::OpenAiAdvisor;
pub use prompt::{build_insight_prompt, build_judgment_prompt, parse_verdict};

use muse_settings::LlmSettings;

/// Build the configured advisor.
///
/// Fails when settings name an unknown provider or the provider's API key
/// is not in the environment; callers treat that as "run without the
/// advisor" rather than an error worth stopping for.
pub fn advisor_from_settings(settings: &LlmSettings) -> AdvisorResult<Box<dyn Advisor>> {
    match settings.provider.as_str() {
        "anthropic" => Ok(Box::new(AnthropicAdvisor::from_settings(settings)?)),
        "openai" => Ok(Box::new(OpenAiAdvisor::from_settings(settings)?)),
        other => Err(AdvisorError::UnknownProvider {
            name: other.to_string(),
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
