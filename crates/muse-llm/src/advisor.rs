//! The advisor abstraction.
//!
//! An [`Advisor`] answers two questions for the decision engine: "is now a
//! good moment to interrupt?" ([`Advisor::assess`], the second gate) and
//! "what should the observation say?" ([`Advisor::insight`]). Both are
//! network calls with bounded timeouts; every failure degrades the session
//! rather than ending it.

use async_trait::async_trait;
use thiserror::Error;

use muse_core::{ChangeSummary, Verdict};

/// Result type alias for advisor operations.
pub type AdvisorResult<T> = Result<T, AdvisorError>;

/// Errors that can occur during advisor operations.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// No API key found in the environment.
    #[error("missing API key: set {var}")]
    MissingApiKey {
        /// The environment variable to set.
        var: &'static str,
    },

    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
    },

    /// Response arrived but did not contain a usable answer.
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// What was wrong with it.
        message: String,
    },

    /// Settings name a provider this build does not know.
    #[error("unknown provider: {name}")]
    UnknownProvider {
        /// The configured provider name.
        name: String,
    },
}

impl AdvisorError {
    /// Whether the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// An LLM-backed judgment and insight source.
#[async_trait]
pub trait Advisor: Send + Sync + std::fmt::Debug {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// The judgment call: should the assistant interrupt now?
    async fn assess(&self, summary: &ChangeSummary) -> AdvisorResult<Verdict>;

    /// Produce the observation text for an intervention.
    async fn insight(&self, summary: &ChangeSummary) -> AdvisorResult<String>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
