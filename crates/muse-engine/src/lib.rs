//! # muse-engine
//!
//! The intervention decision engine for the Muse assistant.
//!
//! The engine decides when the assistant should interrupt the developer
//! with a proactive observation. It is built from four pieces:
//!
//! - **Rule table** ([`rules`]): regex scoring rules compiled from settings,
//!   grouped by category, with broken patterns disabled at load
//! - **Scorer** ([`scorer`]): a pure function turning a change record into a
//!   scored change (each matching rule counted once)
//! - **Event buffer** ([`buffer`]): a count- and age-bounded rolling window
//!   of recent scored changes
//! - **Decision engine** ([`engine`]): the per-cycle state machine applying
//!   the minimum-size, cooldown, score-threshold, and idle-flush rules, with
//!   an optional advisor verdict as a second gate
//!
//! The adaptive threshold controller ([`adaptive`]) adjusts the score
//! threshold from explicit user feedback, and [`state`] persists the learned
//! sensitivity across sessions.
//!
//! The engine is single-owner: one task drives every cycle, and no engine
//! state is held across the advisor's network await (the `Ready` outcome
//! carries a copied snapshot instead).

#![deny(unsafe_code)]

pub mod adaptive;
pub mod buffer;
pub mod engine;
pub mod errors;
pub mod rules;
pub mod scorer;
pub mod state;

pub use buffer::EventBuffer;
pub use engine::{CycleOutcome, DecisionEngine, EvaluationSnapshot};
pub use errors::{EngineError, Result};
pub use rules::{RuleCategory, RuleTable};
pub use scorer::score;
pub use state::DecisionState;
