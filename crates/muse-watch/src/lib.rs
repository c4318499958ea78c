//! # muse-watch
//!
//! Filesystem observation for the Muse assistant.
//!
//! Three pieces, applied in order to every raw filesystem event:
//!
//! - [`filter::ChangeFilter`] — drops paths under ignored directories,
//!   with unsupported extensions, or on the always-ignored file list
//! - [`classifier::Classifier`] — reads the file, diffs it against the
//!   previously seen revision, and produces a [`muse_core::ChangeRecord`]
//!   (silently dropping binary or unreadable content)
//! - [`watcher::WorkspaceWatcher`] — the recursive `notify` watch that
//!   drives both and delivers classified changes over a tokio channel

#![deny(unsafe_code)]

pub mod classifier;
pub mod errors;
pub mod filter;
pub mod watcher;

pub use classifier::Classifier;
pub use errors::{Result, WatchError};
pub use filter::ChangeFilter;
pub use watcher::WorkspaceWatcher;
