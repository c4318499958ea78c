//! Adaptive threshold controller.
//!
//! Positive feedback lowers the score threshold (the assistant speaks more
//! readily); negative feedback raises it (more conservative). Each feedback
//! event moves the threshold by the configured adjustment, linearly, and
//! the threshold never leaves `[min, max]`.

use muse_core::FeedbackSignal;
use tracing::debug;

use muse_settings::ThresholdSettings;

use crate::state::DecisionState;

/// What a feedback event did to the decision state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The threshold moved (or stayed pinned at a bound).
    Adjusted {
        /// Threshold before the feedback.
        previous: u32,
        /// Threshold after the feedback.
        current: u32,
    },
    /// No intervention has fired this session, so there is nothing to rate.
    NothingToRate,
}

/// Apply one feedback event to the decision state.
///
/// A no-op when no intervention has occurred this session. The tally only
/// counts feedback that actually rated something.
pub fn apply_feedback(
    state: &mut DecisionState,
    signal: FeedbackSignal,
    settings: &ThresholdSettings,
) -> FeedbackOutcome {
    if state.interventions == 0 {
        debug!("feedback before any intervention, ignoring");
        return FeedbackOutcome::NothingToRate;
    }

    let previous = state.threshold;
    match signal {
        FeedbackSignal::Positive => {
            state.threshold = previous.saturating_sub(settings.adjustment).max(settings.min);
            state.positive_feedback += 1;
        }
        FeedbackSignal::Negative => {
            state.threshold = previous.saturating_add(settings.adjustment).min(settings.max);
            state.negative_feedback += 1;
        }
    }

    debug!(
        previous,
        current = state.threshold,
        ?signal,
        "threshold adjusted from feedback"
    );
    FeedbackOutcome::Adjusted {
        previous,
        current: state.threshold,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rated_state(threshold: u32) -> DecisionState {
        let mut state = DecisionState::new(&ThresholdSettings::default());
        state.threshold = threshold;
        state.interventions = 1;
        state
    }

    #[test]
    fn positive_feedback_lowers_threshold() {
        let mut state = rated_state(5);
        let outcome = apply_feedback(
            &mut state,
            FeedbackSignal::Positive,
            &ThresholdSettings::default(),
        );
        assert_eq!(
            outcome,
            FeedbackOutcome::Adjusted {
                previous: 5,
                current: 4
            }
        );
        assert_eq!(state.positive_feedback, 1);
    }

    #[test]
    fn negative_feedback_raises_threshold() {
        let mut state = rated_state(5);
        let _ = apply_feedback(
            &mut state,
            FeedbackSignal::Negative,
            &ThresholdSettings::default(),
        );
        assert_eq!(state.threshold, 6);
        assert_eq!(state.negative_feedback, 1);
    }

    #[test]
    fn feedback_before_intervention_is_noop() {
        let mut state = DecisionState::new(&ThresholdSettings::default());
        let outcome = apply_feedback(
            &mut state,
            FeedbackSignal::Negative,
            &ThresholdSettings::default(),
        );
        assert_eq!(outcome, FeedbackOutcome::NothingToRate);
        assert_eq!(state.threshold, 5);
        assert_eq!(state.negative_feedback, 0);
    }

    #[test]
    fn five_negatives_cap_at_max() {
        let settings = ThresholdSettings {
            initial: 5,
            min: 2,
            max: 10,
            adjustment: 1,
        };
        let mut state = rated_state(5);
        for _ in 0..5 {
            let _ = apply_feedback(&mut state, FeedbackSignal::Negative, &settings);
        }
        assert_eq!(state.threshold, 10);

        // A sixth stays pinned
        let _ = apply_feedback(&mut state, FeedbackSignal::Negative, &settings);
        assert_eq!(state.threshold, 10);
    }

    #[test]
    fn positives_floor_at_min() {
        let settings = ThresholdSettings::default();
        let mut state = rated_state(3);
        for _ in 0..10 {
            let _ = apply_feedback(&mut state, FeedbackSignal::Positive, &settings);
        }
        assert_eq!(state.threshold, settings.min);
    }

    proptest! {
        #[test]
        fn threshold_never_leaves_bounds(
            signals in proptest::collection::vec(any::<bool>(), 0..100),
            adjustment in 1u32..4,
        ) {
            let settings = ThresholdSettings {
                initial: 5,
                min: 2,
                max: 15,
                adjustment,
            };
            let mut state = rated_state(5);
            for positive in signals {
                let signal = if positive {
                    FeedbackSignal::Positive
                } else {
                    FeedbackSignal::Negative
                };
                let _ = apply_feedback(&mut state, signal, &settings);
                prop_assert!(state.threshold >= settings.min);
                prop_assert!(state.threshold <= settings.max);
            }
        }
    }
}
