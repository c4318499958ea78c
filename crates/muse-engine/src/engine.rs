//! Threshold decision engine.
//!
//! The per-cycle state machine. A cycle runs on each scored-change arrival
//! ([`DecisionEngine::observe`]) and on each idle-timer tick
//! ([`DecisionEngine::idle_tick`]); both evaluate in the same fixed order:
//!
//! 1. prune the buffer
//! 2. below `min_buffer_size` → [`CycleOutcome::Idle`]
//! 3. inside the intervention cooldown → [`CycleOutcome::Cooldown`]
//! 4. aggregate score at/above the adaptive threshold, or the idle timeout
//!    elapsed with changes buffered → [`CycleOutcome::Ready`]
//! 5. otherwise → [`CycleOutcome::Accumulating`]
//!
//! `Ready` carries a copied snapshot so the caller can consult the advisor
//! without holding any engine state across the network await; the verdict
//! (or its absence, when the advisor is disabled or failed) is applied in
//! [`DecisionEngine::resolve`]. Intervening clears the entire buffer,
//! including changes that arrived while the advisor call was in flight.

use std::time::{Duration, Instant};

use muse_core::{ChangeSummary, Decision, FeedbackSignal, ScoredChange, Verdict};
use tracing::{debug, info};

use muse_settings::EngineSettings;

use crate::adaptive::{apply_feedback, FeedbackOutcome};
use crate::buffer::EventBuffer;
use crate::state::DecisionState;

/// What one evaluation cycle concluded.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Too few buffered changes to evaluate.
    Idle,
    /// Changes buffered, aggregate score still under threshold.
    Accumulating {
        /// Current aggregate score.
        total_score: u32,
        /// Threshold in effect.
        threshold: u32,
    },
    /// An intervention fired recently; evaluation suppressed.
    Cooldown {
        /// Time until the cooldown elapses.
        remaining: Duration,
    },
    /// The heuristic gate passed; the snapshot is ready for the second gate.
    Ready(EvaluationSnapshot),
}

/// A copied view of the buffer at the moment the heuristic gate passed.
///
/// Handed out of the engine so the advisor call happens without engine
/// access; applied back via [`DecisionEngine::resolve`]. If the buffer
/// changed during the advisor await, this stale snapshot's decision is
/// still honored for the cycle.
#[derive(Debug, Clone)]
pub struct EvaluationSnapshot {
    /// The buffered changes under evaluation, oldest first.
    pub changes: Vec<ScoredChange>,
    /// Summary context for the judgment and insight prompts.
    pub summary: ChangeSummary,
    /// Whether the idle timeout forced this evaluation.
    pub idle_triggered: bool,
    /// Confidence the heuristic alone assigns, used when no verdict applies.
    pub heuristic_confidence: u8,
}

/// The intervention decision engine for one monitoring session.
///
/// Plain single-owner state machine: the session task drives every cycle
/// and serializes all access. Nothing here suspends.
#[derive(Debug)]
pub struct DecisionEngine {
    buffer: EventBuffer,
    state: DecisionState,
    settings: EngineSettings,
    /// Latched after an idle-triggered evaluation so the idle timer does
    /// not refire until new activity arrives.
    idle_flushed: bool,
}

impl DecisionEngine {
    /// Build an engine from settings and (possibly rehydrated) state.
    pub fn new(settings: EngineSettings, state: DecisionState) -> Self {
        let buffer = EventBuffer::new(
            settings.max_buffer_size,
            Duration::from_secs(settings.max_event_age_secs),
        );
        Self {
            buffer,
            state,
            settings,
            idle_flushed: false,
        }
    }

    /// Run a cycle for a newly scored change.
    pub fn observe(&mut self, scored: ScoredChange, now: Instant) -> CycleOutcome {
        debug!(
            file = %scored.record.file_name(),
            score = scored.score,
            "observed change"
        );
        self.state.last_activity = Some(now);
        self.idle_flushed = false;
        self.buffer.push(scored);
        self.evaluate(now, false)
    }

    /// Run a cycle from the periodic idle timer.
    pub fn idle_tick(&mut self, now: Instant) -> CycleOutcome {
        let idle_elapsed = !self.idle_flushed
            && !self.buffer.is_empty()
            && self.state.last_activity.is_some_and(|last| {
                now.duration_since(last) >= Duration::from_secs(self.settings.idle_threshold_secs)
            });
        self.evaluate(now, idle_elapsed)
    }

    fn evaluate(&mut self, now: Instant, idle_triggered: bool) -> CycleOutcome {
        let _ = self.buffer.prune(now);

        if self.buffer.len() < self.settings.min_buffer_size {
            return CycleOutcome::Idle;
        }

        if let Some(last) = self.state.last_intervention {
            let cooldown = Duration::from_secs(self.settings.processing_cooldown_secs);
            let elapsed = now.duration_since(last);
            if elapsed < cooldown {
                // Score still accumulates in the buffer meanwhile
                return CycleOutcome::Cooldown {
                    remaining: cooldown - elapsed,
                };
            }
        }

        let total_score = self.buffer.total_score();
        let threshold = self.state.threshold;
        if total_score >= threshold || idle_triggered {
            if idle_triggered {
                self.idle_flushed = true;
            }
            let changes = self.buffer.snapshot();
            let summary = ChangeSummary::from_changes(&changes, threshold, idle_triggered);
            debug!(
                total_score,
                threshold,
                idle_triggered,
                changes = changes.len(),
                "heuristic gate passed"
            );
            CycleOutcome::Ready(EvaluationSnapshot {
                changes,
                summary,
                idle_triggered,
                heuristic_confidence: heuristic_confidence(total_score, threshold),
            })
        } else {
            CycleOutcome::Accumulating {
                total_score,
                threshold,
            }
        }
    }

    /// Whether `Ready` outcomes should be taken through the advisor gate.
    pub fn advisor_gate_enabled(&self) -> bool {
        self.settings.enable_llm_decision
    }

    /// Apply the advisor's verdict (or its absence) to a `Ready` snapshot
    /// and commit the result.
    ///
    /// `verdict = None` means the advisor gate is disabled or degraded for
    /// this cycle; the heuristic decision stands. With a verdict, the
    /// engine intervenes only if the advisor said yes with confidence at or
    /// above the configured bar.
    pub fn resolve(
        &mut self,
        snapshot: EvaluationSnapshot,
        verdict: Option<Verdict>,
        now: Instant,
    ) -> Decision {
        let (should_intervene, confidence) = match verdict {
            None => (true, snapshot.heuristic_confidence),
            Some(v) => (
                v.intervene && v.confidence >= self.settings.confidence_threshold,
                v.confidence,
            ),
        };

        if should_intervene {
            self.state.last_intervention = Some(now);
            self.state.interventions += 1;
            // The triggering changes are consumed; anything that arrived
            // during the advisor await goes with them.
            self.buffer.clear();
            info!(
                confidence,
                total_score = snapshot.summary.total_score,
                idle_triggered = snapshot.idle_triggered,
                "intervening"
            );
        } else {
            debug!(confidence, "advisor gate declined, retaining buffer");
        }

        Decision {
            should_intervene,
            confidence,
            changes: snapshot.changes,
            summary: snapshot.summary,
        }
    }

    /// Route a user rating to the adaptive controller.
    ///
    /// Returns `None` when adaptive learning is disabled.
    pub fn on_feedback(&mut self, signal: FeedbackSignal) -> Option<FeedbackOutcome> {
        if !self.settings.enable_adaptive_learning {
            debug!("adaptive learning disabled, feedback ignored");
            return None;
        }
        Some(apply_feedback(
            &mut self.state,
            signal,
            &self.settings.threshold,
        ))
    }

    /// Current decision state (for status display and persistence).
    pub fn state(&self) -> &DecisionState {
        &self.state
    }

    /// Current aggregate buffer score.
    pub fn total_score(&self) -> u32 {
        self.buffer.total_score()
    }

    /// Number of buffered changes.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

/// Confidence the heuristic alone assigns: half scale at exactly the
/// threshold, full scale at twice the threshold, never below 1.
fn heuristic_confidence(total_score: u32, threshold: u32) -> u8 {
    let scaled = (u64::from(total_score) * 10) / (2 * u64::from(threshold.max(1)));
    scaled.clamp(1, 10) as u8
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
