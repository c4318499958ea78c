//! Change records and scored changes.
//!
//! A [`ChangeRecord`] is the classifier's description of one observed
//! filesystem mutation. The pattern scorer turns it into a [`ScoredChange`]
//! by matching the record's content fragment against the rule table.
//! Neither type is mutated after construction.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The kind of filesystem mutation a change record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A file was created.
    Created,
    /// An existing file's content changed.
    Modified,
    /// A file was removed.
    Deleted,
}

impl ChangeKind {
    /// Lowercase string form, matching the wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed filesystem mutation, as produced by the change classifier.
///
/// Immutable once built. Owned by whichever buffer slot holds it and
/// dropped when evicted from the event buffer.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    /// Path of the mutated file.
    pub path: PathBuf,
    /// What happened to the file.
    pub kind: ChangeKind,
    /// Net line count change against the previously seen revision.
    pub line_delta: i64,
    /// Symbol names newly present in this revision, in detection order.
    pub added_symbols: Vec<String>,
    /// Content fragment the scorer matches rules against (the added lines;
    /// whole content for created files, empty for deletions).
    pub fragment: String,
    /// Monotonic arrival time.
    pub timestamp: Instant,
}

impl ChangeRecord {
    /// Short display name of the mutated file.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Semantic tag assigned by the rule table, derived from which rule
/// categories matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    /// Security-relevant content (credentials, auth, crypto keywords).
    Security,
    /// Structural change (new functions, imports/includes).
    Architecture,
    /// Test code.
    Test,
    /// Error-handling code.
    ErrorHandling,
    /// Noise-level edit (comments, debug prints, trivial assignments).
    Minor,
}

impl Tag {
    /// Kebab-case string form, matching the wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Architecture => "architecture",
            Self::Test => "test",
            Self::ErrorHandling => "error-handling",
            Self::Minor => "minor",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change record plus the score and tags the rule table assigned.
///
/// The score is the sum of the point values of every matching rule, each
/// rule counted at most once per record. Never mutated after scoring.
#[derive(Debug, Clone)]
pub struct ScoredChange {
    /// The underlying change record.
    pub record: ChangeRecord,
    /// Aggregate rule-table score.
    pub score: u32,
    /// Tags derived from the matched rule categories.
    pub tags: BTreeSet<Tag>,
}

impl ScoredChange {
    /// Whether the only thing this change matched was noise-level rules.
    pub fn is_minor(&self) -> bool {
        self.tags.len() == 1 && self.tags.contains(&Tag::Minor)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
