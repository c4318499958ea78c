//! Settings loading with environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`MuseSettings::default()`]
//! 2. If the settings file exists, parse it as TOML — `#[serde(default)]`
//!    on every struct means a partial file only overrides named keys
//! 3. Apply environment variable overrides (highest priority)
//! 4. Clamp out-of-range values back into bounds with a warning
//!
//! A missing file is not an error; an unreadable or syntactically invalid
//! one is.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::MuseSettings;

/// Resolve the default settings path (`$XDG_CONFIG_HOME/muse/muse.toml`,
/// falling back to `~/.config/muse/muse.toml`).
pub fn default_settings_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME").map_or_else(
        |_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        },
        PathBuf::from,
    );
    config_dir.join("muse").join("muse.toml")
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid TOML, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<MuseSettings> {
    let mut settings = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        debug!(?path, "settings file not found, using defaults");
        MuseSettings::default()
    };

    apply_env_overrides(&mut settings);
    clamp_ranges(&mut settings);
    Ok(settings)
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Booleans accept: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`
/// - Invalid values are ignored with a warning (fall back to file/default)
pub fn apply_env_overrides(settings: &mut MuseSettings) {
    // ── Engine settings ─────────────────────────────────────────────
    if let Some(v) = read_env_u32("MUSE_SCORE_THRESHOLD", 1, 1000) {
        settings.engine.threshold.initial = v;
    }
    if let Some(v) = read_env_u32("MUSE_MIN_SCORE_THRESHOLD", 1, 1000) {
        settings.engine.threshold.min = v;
    }
    if let Some(v) = read_env_u32("MUSE_MAX_SCORE_THRESHOLD", 1, 1000) {
        settings.engine.threshold.max = v;
    }
    if let Some(v) = read_env_u64("MUSE_COOLDOWN_SECS", 0, 3600) {
        settings.engine.processing_cooldown_secs = v;
    }
    if let Some(v) = read_env_u64("MUSE_IDLE_SECS", 1, 3600) {
        settings.engine.idle_threshold_secs = v;
    }
    if let Some(v) = read_env_bool("MUSE_LLM_ENABLED") {
        settings.engine.enable_llm_decision = v;
    }
    if let Some(v) = read_env_bool("MUSE_ADAPTIVE_ENABLED") {
        settings.engine.enable_adaptive_learning = v;
    }
    if let Some(v) = read_env_u32("MUSE_CONFIDENCE_THRESHOLD", 1, 10) {
        settings.engine.confidence_threshold = v as u8;
    }

    // ── LLM settings ────────────────────────────────────────────────
    if let Some(v) = read_env_string("MUSE_LLM_PROVIDER") {
        settings.llm.provider = v;
    }
    if let Some(v) = read_env_string("MUSE_LLM_MODEL") {
        settings.llm.model = v;
    }
    if let Some(v) = read_env_u64("MUSE_LLM_TIMEOUT_MS", 500, 120_000) {
        settings.llm.timeout_ms = v;
    }
}

/// Clamp out-of-range parameter combinations back into bounds.
///
/// Misconfiguration is reported once here and the session continues with
/// the corrected values.
pub fn clamp_ranges(settings: &mut MuseSettings) {
    let t = &mut settings.engine.threshold;
    if t.min > t.max {
        warn!(min = t.min, max = t.max, "threshold min exceeds max, swapping");
        std::mem::swap(&mut t.min, &mut t.max);
    }
    if t.initial < t.min || t.initial > t.max {
        let clamped = t.initial.clamp(t.min, t.max);
        warn!(
            initial = t.initial,
            clamped, "initial threshold outside [min, max], clamping"
        );
        t.initial = clamped;
    }
    if settings.engine.min_buffer_size > settings.engine.max_buffer_size {
        warn!(
            min = settings.engine.min_buffer_size,
            max = settings.engine.max_buffer_size,
            "min buffer size exceeds max, lowering to max"
        );
        settings.engine.min_buffer_size = settings.engine.max_buffer_size;
    }
    if settings.engine.confidence_threshold == 0 || settings.engine.confidence_threshold > 10 {
        let clamped = settings.engine.confidence_threshold.clamp(1, 10);
        warn!(
            value = settings.engine.confidence_threshold,
            clamped, "confidence threshold outside 1-10, clamping"
        );
        settings.engine.confidence_threshold = clamped;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
