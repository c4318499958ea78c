//! Settings type definitions.
//!
//! Every struct derives `Deserialize` with `#[serde(default)]` so a partial
//! `muse.toml` only overrides the keys it names; everything else keeps the
//! compiled default. Keys are snake_case, the usual TOML convention.

mod rules;

pub use rules::{RuleEntry, RulesSettings};

use serde::{Deserialize, Serialize};

/// Root settings for a Muse session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MuseSettings {
    /// Filesystem observation settings.
    pub watcher: WatcherSettings,
    /// Decision engine settings.
    pub engine: EngineSettings,
    /// Scoring rule table.
    pub rules: RulesSettings,
    /// LLM advisor settings.
    pub llm: LlmSettings,
}

/// Which files the watcher observes and which it skips.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSettings {
    /// File extensions (without the dot) eligible for classification.
    pub extensions: Vec<String>,
    /// Directory/file patterns excluded from watching.
    pub ignored: Vec<String>,
    /// Files larger than this many bytes are classified from metadata only.
    pub max_file_bytes: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            extensions: [
                "py", "js", "ts", "jsx", "tsx", "java", "cpp", "c", "h", "hpp", "cs", "go",
                "rs", "rb", "php", "swift", "kt", "scala", "clj", "hs", "ml", "elm", "dart",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            ignored: [
                ".git",
                "node_modules",
                "target",
                "build",
                "dist",
                "__pycache__",
                ".pytest_cache",
                ".idea",
                ".vscode",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            max_file_bytes: 50_000,
        }
    }
}

/// Adaptive score-threshold parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    /// Score threshold at session start (before any persisted state).
    pub initial: u32,
    /// Lower bound the adaptive controller may reach.
    pub min: u32,
    /// Upper bound the adaptive controller may reach.
    pub max: u32,
    /// Step applied per feedback event.
    pub adjustment: u32,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            initial: 5,
            min: 2,
            max: 15,
            adjustment: 1,
        }
    }
}

/// Decision engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Minimum buffered changes before the engine evaluates at all.
    pub min_buffer_size: usize,
    /// Maximum buffered changes (oldest evicted first).
    pub max_buffer_size: usize,
    /// Buffered changes older than this are pruned before evaluation.
    pub max_event_age_secs: u64,
    /// Minimum wall-clock gap between interventions.
    pub processing_cooldown_secs: u64,
    /// Inactivity period after which buffered changes are force-evaluated.
    pub idle_threshold_secs: u64,
    /// Consult the LLM advisor as a second gate before intervening.
    pub enable_llm_decision: bool,
    /// Adjust the score threshold from user feedback.
    pub enable_adaptive_learning: bool,
    /// Minimum advisor confidence (1–10) required to intervene when the
    /// LLM gate is enabled.
    pub confidence_threshold: u8,
    /// Adaptive threshold bounds and step.
    pub threshold: ThresholdSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_buffer_size: 3,
            max_buffer_size: 10,
            max_event_age_secs: 120,
            processing_cooldown_secs: 30,
            idle_threshold_secs: 30,
            enable_llm_decision: false,
            enable_adaptive_learning: true,
            confidence_threshold: 7,
            threshold: ThresholdSettings::default(),
        }
    }
}

/// LLM advisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name: `"anthropic"` or `"openai"`.
    pub provider: String,
    /// Model identifier passed to the provider.
    pub model: String,
    /// Base URL override (primarily for tests).
    pub base_url: Option<String>,
    /// Per-call timeout in milliseconds; the engine falls back to the
    /// heuristic-only decision when it elapses.
    pub timeout_ms: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            base_url: None,
            timeout_ms: 10_000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
