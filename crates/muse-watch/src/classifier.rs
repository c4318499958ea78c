//! Change classification.
//!
//! Turns a raw filesystem mutation into a [`ChangeRecord`]: line delta
//! against the previously seen revision, the added lines as the scoring
//! fragment, and any newly defined symbol names. Content is cached per
//! path so the next mutation of the same file diffs against this one.
//!
//! Unreadable or non-UTF-8 content drops the change silently. Files over
//! the configured size cap are classified from metadata only, with an
//! empty fragment.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

use muse_core::{language_for_path, ChangeKind, ChangeRecord};
use regex::Regex;
use tracing::debug;

/// Stateful change classifier for one workspace.
#[derive(Debug)]
pub struct Classifier {
    cache: HashMap<PathBuf, String>,
    max_file_bytes: u64,
}

impl Classifier {
    /// Create a classifier with the given per-file size cap.
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            cache: HashMap::new(),
            max_file_bytes,
        }
    }

    /// Classify one mutation. Returns `None` when the change should be
    /// dropped (unreadable or binary content).
    pub fn classify(
        &mut self,
        path: &Path,
        kind: ChangeKind,
        now: Instant,
    ) -> Option<ChangeRecord> {
        match kind {
            ChangeKind::Deleted => {
                let previous = self.cache.remove(path);
                let removed_lines = previous.as_deref().map_or(0, count_lines);
                Some(ChangeRecord {
                    path: path.to_path_buf(),
                    kind,
                    line_delta: -removed_lines,
                    added_symbols: Vec::new(),
                    fragment: String::new(),
                    timestamp: now,
                })
            }
            ChangeKind::Created | ChangeKind::Modified => self.classify_content(path, kind, now),
        }
    }

    fn classify_content(
        &mut self,
        path: &Path,
        kind: ChangeKind,
        now: Instant,
    ) -> Option<ChangeRecord> {
        let size = std::fs::metadata(path).ok()?.len();
        if size > self.max_file_bytes {
            debug!(?path, size, "file over size cap, classifying from metadata");
            let _ = self.cache.remove(path);
            return Some(ChangeRecord {
                path: path.to_path_buf(),
                kind,
                line_delta: 0,
                added_symbols: Vec::new(),
                fragment: String::new(),
                timestamp: now,
            });
        }

        // Non-UTF-8 content means a binary file; drop the change
        let bytes = std::fs::read(path).ok()?;
        let content = String::from_utf8(bytes).ok()?;

        let previous = self.cache.insert(path.to_path_buf(), content.clone());
        let previous = previous.unwrap_or_default();

        let line_delta = count_lines(&content) - count_lines(&previous);
        let fragment = added_lines(&previous, &content);
        let added_symbols = detect_symbols(path, &fragment);

        Some(ChangeRecord {
            path: path.to_path_buf(),
            kind,
            line_delta,
            added_symbols,
            fragment,
            timestamp: now,
        })
    }
}

fn count_lines(content: &str) -> i64 {
    content.lines().count() as i64
}

/// Lines present in `current` but not in `previous`, in order. The whole
/// content for a file seen for the first time.
fn added_lines(previous: &str, current: &str) -> String {
    if previous.is_empty() {
        return current.to_string();
    }
    let old: HashSet<&str> = previous.lines().collect();
    current
        .lines()
        .filter(|line| !old.contains(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Function/method names defined in the fragment, per the file's language.
fn detect_symbols(path: &Path, fragment: &str) -> Vec<String> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            ("python", r"def\s+(\w+)\s*\("),
            ("rust", r"fn\s+(\w+)"),
            ("javascript", r"function\s+(\w+)\s*\("),
            ("typescript", r"function\s+(\w+)\s*\("),
            ("go", r"func\s+(\w+)\s*\("),
        ]
        .into_iter()
        .filter_map(|(lang, pattern)| Regex::new(pattern).ok().map(|re| (lang, re)))
        .collect()
    });

    let Some(language) = language_for_path(path) else {
        return Vec::new();
    };

    let mut symbols = Vec::new();
    for (lang, regex) in patterns {
        if *lang != language {
            continue;
        }
        for capture in regex.captures_iter(fragment) {
            if let Some(name) = capture.get(1) {
                let name = name.as_str().to_string();
                if !symbols.contains(&name) {
                    symbols.push(name);
                }
            }
        }
    }
    symbols
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
