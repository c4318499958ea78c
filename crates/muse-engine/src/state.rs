//! Decision state and its persistence.
//!
//! [`DecisionState`] is the engine's mutable session state: the adaptive
//! threshold, cooldown timestamp, activity tracking, and feedback tally.
//! The learned pieces (threshold and tally) persist to a small JSON file
//! inside the watched workspace and are rehydrated at the next session
//! start. Persistence is best-effort: any load error falls back to
//! configured defaults and any save error is logged, never fatal.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use muse_settings::ThresholdSettings;

use crate::errors::{EngineError, Result};

/// File name of the persisted state inside the workspace. The watcher
/// always ignores this file.
pub const STATE_FILE_NAME: &str = ".muse-state.json";

/// Mutable per-session engine state.
#[derive(Debug, Clone)]
pub struct DecisionState {
    /// Current adaptive score threshold, always within the configured bounds.
    pub threshold: u32,
    /// When the last intervention fired (cooldown anchor).
    pub last_intervention: Option<Instant>,
    /// When the last change was observed (idle anchor).
    pub last_activity: Option<Instant>,
    /// Interventions fired this session.
    pub interventions: u32,
    /// Positive ratings received (all sessions).
    pub positive_feedback: u32,
    /// Negative ratings received (all sessions).
    pub negative_feedback: u32,
}

impl DecisionState {
    /// Fresh state from configured threshold settings.
    pub fn new(threshold: &ThresholdSettings) -> Self {
        Self {
            threshold: threshold.initial.clamp(threshold.min, threshold.max),
            last_intervention: None,
            last_activity: None,
            interventions: 0,
            positive_feedback: 0,
            negative_feedback: 0,
        }
    }

    /// Rehydrate from a persisted record, clamping the stored threshold to
    /// the currently configured bounds.
    pub fn from_persisted(persisted: &PersistedState, threshold: &ThresholdSettings) -> Self {
        Self {
            threshold: persisted.score_threshold.clamp(threshold.min, threshold.max),
            last_intervention: None,
            last_activity: None,
            interventions: 0,
            positive_feedback: persisted.positive_feedback,
            negative_feedback: persisted.negative_feedback,
        }
    }

    /// The persistable subset of this state.
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            score_threshold: self.threshold,
            positive_feedback: self.positive_feedback,
            negative_feedback: self.negative_feedback,
        }
    }
}

/// The subset of [`DecisionState`] that survives across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Learned score threshold.
    pub score_threshold: u32,
    /// Cumulative positive ratings.
    pub positive_feedback: u32,
    /// Cumulative negative ratings.
    pub negative_feedback: u32,
}

/// Path of the state file for a workspace.
pub fn state_path(workspace: &Path) -> PathBuf {
    workspace.join(STATE_FILE_NAME)
}

/// Load persisted state from a workspace, or `None` if absent or unreadable.
///
/// Any failure is logged and treated as "no saved state"; the session
/// proceeds with configured defaults.
pub fn load_state(workspace: &Path) -> Option<PersistedState> {
    let path = state_path(workspace);
    if !path.exists() {
        return None;
    }
    match try_load(&path) {
        Ok(state) => {
            debug!(?path, threshold = state.score_threshold, "restored saved state");
            Some(state)
        }
        Err(err) => {
            warn!(?path, error = %err, "ignoring unreadable state file");
            None
        }
    }
}

fn try_load(path: &Path) -> Result<PersistedState> {
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::StateIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| EngineError::StateFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Save persisted state into a workspace.
pub fn save_state(workspace: &Path, state: &PersistedState) -> Result<()> {
    let path = state_path(workspace);
    let json = serde_json::to_string_pretty(state).map_err(|source| EngineError::StateFormat {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| EngineError::StateIo { path, source })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_uses_initial_threshold() {
        let state = DecisionState::new(&ThresholdSettings::default());
        assert_eq!(state.threshold, 5);
        assert_eq!(state.interventions, 0);
        assert!(state.last_intervention.is_none());
    }

    #[test]
    fn new_state_clamps_out_of_range_initial() {
        let settings = ThresholdSettings {
            initial: 50,
            min: 2,
            max: 15,
            adjustment: 1,
        };
        let state = DecisionState::new(&settings);
        assert_eq!(state.threshold, 15);
    }

    #[test]
    fn persisted_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let saved = PersistedState {
            score_threshold: 7,
            positive_feedback: 2,
            negative_feedback: 4,
        };
        save_state(dir.path(), &saved).unwrap();

        let loaded = load_state(dir.path()).unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn persisted_format_is_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let saved = PersistedState {
            score_threshold: 7,
            positive_feedback: 0,
            negative_feedback: 1,
        };
        save_state(dir.path(), &saved).unwrap();

        let raw = std::fs::read_to_string(state_path(dir.path())).unwrap();
        assert!(raw.contains("scoreThreshold"));
        assert!(raw.contains("negativeFeedback"));
    }

    #[test]
    fn missing_state_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_state(dir.path()).is_none());
    }

    #[test]
    fn corrupt_state_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(state_path(dir.path()), "{not json").unwrap();
        assert!(load_state(dir.path()).is_none());
    }

    #[test]
    fn rehydrated_threshold_clamped_to_current_bounds() {
        let persisted = PersistedState {
            score_threshold: 14,
            positive_feedback: 0,
            negative_feedback: 9,
        };
        let settings = ThresholdSettings {
            initial: 5,
            min: 2,
            max: 10,
            adjustment: 1,
        };
        let state = DecisionState::from_persisted(&persisted, &settings);
        assert_eq!(state.threshold, 10);
        assert_eq!(state.negative_feedback, 9);
        // Session-scoped counters reset
        assert_eq!(state.interventions, 0);
    }
}
