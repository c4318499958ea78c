//! # muse-core
//!
//! Foundation types for the Muse ambient assistant.
//!
//! This crate provides the shared vocabulary that all other Muse crates
//! depend on:
//!
//! - **Change records**: [`change::ChangeRecord`] describing one observed
//!   filesystem mutation, and [`change::ScoredChange`] pairing it with the
//!   score and tags the rule table assigned
//! - **Decisions**: [`decision::Decision`] emitted by the engine once per
//!   cycle, and [`decision::ChangeSummary`] handed to the insight generator
//! - **Feedback**: [`decision::FeedbackSignal`] from the user rating loop
//! - **Languages**: [`lang::language_for_path`], the extension map shared by
//!   language-scoped rules and symbol detection
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other muse crates.

#![deny(unsafe_code)]

pub mod change;
pub mod decision;
pub mod lang;

pub use change::{ChangeKind, ChangeRecord, ScoredChange, Tag};
pub use decision::{ChangeSummary, Decision, FeedbackSignal, Verdict};
pub use lang::{language_for_extension, language_for_path};
