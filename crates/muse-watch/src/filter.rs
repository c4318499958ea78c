//! Path filtering for watcher events.
//!
//! Filtering happens before classification, so ignored paths never cost a
//! file read. A path passes when its extension is in the supported set,
//! no component matches an ignored pattern, and its file name is not on
//! the always-ignored list (the persisted state file lives there).

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;

use muse_settings::WatcherSettings;

use crate::errors::Result;

/// Decides which filesystem paths are worth classifying.
#[derive(Debug)]
pub struct ChangeFilter {
    extensions: Vec<String>,
    ignored: GlobSet,
    ignored_files: Vec<String>,
}

impl ChangeFilter {
    /// Build a filter from watcher settings.
    ///
    /// Each ignored pattern matches as a path component anywhere in the
    /// tree (`node_modules` ignores `a/node_modules/b.py`). An invalid
    /// pattern is warned about and skipped.
    pub fn from_settings(settings: &WatcherSettings) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &settings.ignored {
            for glob in [format!("**/{pattern}"), format!("**/{pattern}/**")] {
                match Glob::new(&glob) {
                    Ok(glob) => {
                        let _ = builder.add(glob);
                    }
                    Err(err) => {
                        warn!(pattern = %pattern, error = %err, "invalid ignore pattern, skipping");
                    }
                }
            }
        }
        Ok(Self {
            extensions: settings.extensions.clone(),
            ignored: builder.build()?,
            ignored_files: Vec::new(),
        })
    }

    /// Always ignore a specific file name, wherever it appears.
    #[must_use]
    pub fn ignore_file(mut self, name: impl Into<String>) -> Self {
        self.ignored_files.push(name.into());
        self
    }

    /// Whether a path should be classified.
    pub fn accepts(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if self.ignored_files.iter().any(|f| f == name) {
                return false;
            }
        }
        if self.ignored.is_match(path) {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
