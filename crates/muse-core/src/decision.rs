//! Per-cycle decisions and the summary context handed to the advisor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::change::{ScoredChange, Tag};

/// Explicit user rating of the last intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSignal {
    /// The intervention was valuable; the engine may speak more readily.
    Positive,
    /// The intervention was unwelcome; the engine should be more conservative.
    Negative,
}

/// Compact description of a set of buffered changes, used to build the
/// judgment and insight prompts.
///
/// Carries only what prompt construction needs: counts, tags, file names,
/// and the score picture at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    /// Distinct file names touched, in first-seen order.
    pub files: Vec<String>,
    /// Number of buffered changes.
    pub change_count: usize,
    /// Aggregate score across the buffered changes.
    pub total_score: u32,
    /// Score threshold in effect when the summary was taken.
    pub threshold: u32,
    /// How many changes carried each tag.
    pub tag_counts: BTreeMap<Tag, u32>,
    /// Whether the evaluation was forced by the idle timeout rather than
    /// the score threshold.
    pub idle_triggered: bool,
}

impl ChangeSummary {
    /// Build a summary over a set of scored changes.
    pub fn from_changes(
        changes: &[ScoredChange],
        threshold: u32,
        idle_triggered: bool,
    ) -> Self {
        let mut files = Vec::new();
        let mut tag_counts: BTreeMap<Tag, u32> = BTreeMap::new();
        let mut total_score = 0u32;

        for change in changes {
            let name = change.record.file_name();
            if !files.contains(&name) {
                files.push(name);
            }
            total_score += change.score;
            for tag in &change.tags {
                *tag_counts.entry(*tag).or_insert(0) += 1;
            }
        }

        Self {
            files,
            change_count: changes.len(),
            total_score,
            threshold,
            tag_counts,
            idle_triggered,
        }
    }
}

/// The advisor's answer to a judgment call: whether to interrupt, and how
/// confident it is on a 1–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the advisor recommends interrupting now.
    pub intervene: bool,
    /// Confidence, 1 (guessing) through 10 (certain).
    pub confidence: u8,
}

/// The engine's per-cycle output.
///
/// Ephemeral: consumed immediately by the insight generator and then
/// discarded; only its confidence and the user's subsequent rating feed
/// back into the decision state.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Whether to interrupt the developer now.
    pub should_intervene: bool,
    /// Confidence on a 0–10 scale.
    pub confidence: u8,
    /// The buffered changes that triggered the decision (consumed from the
    /// buffer when intervening).
    pub changes: Vec<ScoredChange>,
    /// Summary context for prompt construction.
    pub summary: ChangeSummary,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
