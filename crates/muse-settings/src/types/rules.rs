//! Scoring rule table configuration.
//!
//! The rule table is data-driven: each category holds an ordered list of
//! `(pattern, points, language)` entries, and a `muse.toml` can replace any
//! category wholesale without code changes. The compiled defaults mirror
//! the patterns the assistant ships with.

use serde::{Deserialize, Serialize};

/// One scoring rule: a regex pattern worth a fixed number of points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleEntry {
    /// Regular expression matched against the change's content fragment.
    pub pattern: String,
    /// Points contributed when the pattern matches (counted once per change).
    pub points: u32,
    /// Language scope: `"all"`, or a language name the file's extension
    /// must map to (e.g. `"python"`, `"rust"`).
    pub language: String,
    /// Match case-insensitively.
    pub case_insensitive: bool,
}

impl Default for RuleEntry {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            points: 0,
            language: "all".to_string(),
            case_insensitive: false,
        }
    }
}

impl RuleEntry {
    fn new(pattern: &str, points: u32, language: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            points,
            language: language.to_string(),
            case_insensitive: false,
        }
    }

    fn case_insensitive(pattern: &str, points: u32, language: &str) -> Self {
        Self {
            case_insensitive: true,
            ..Self::new(pattern, points, language)
        }
    }
}

/// The full rule table, one list per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSettings {
    /// New function/method definitions.
    pub function_def: Vec<RuleEntry>,
    /// Imports and includes.
    pub import: Vec<RuleEntry>,
    /// Security-relevant keywords.
    pub security: Vec<RuleEntry>,
    /// Error-handling constructs.
    pub error_handling: Vec<RuleEntry>,
    /// Test code.
    pub test: Vec<RuleEntry>,
    /// Noise-level edits that should not accumulate toward interventions.
    pub minor: Vec<RuleEntry>,
}

impl Default for RulesSettings {
    fn default() -> Self {
        Self {
            function_def: vec![
                RuleEntry::new(r"^\s*def\s+\w+\s*\(", 3, "python"),
                RuleEntry::new(r"^\s*(pub\s+)?(async\s+)?fn\s+\w+", 3, "rust"),
                RuleEntry::new(r"\bfunction\s+\w+\s*\(", 3, "javascript"),
                RuleEntry::new(r"\bfunction\s+\w+\s*\(", 3, "typescript"),
                RuleEntry::new(r"\bconst\s+\w+\s*=\s*(async\s*)?\(", 2, "javascript"),
                RuleEntry::new(r"\bfunc\s+\w+\s*\(", 3, "go"),
                RuleEntry::new(r"^\s*class\s+\w+", 3, "all"),
            ],
            import: vec![
                RuleEntry::new(r"^\s*(import|from)\s+\w", 1, "python"),
                RuleEntry::new(r"^\s*use\s+\w", 1, "rust"),
                RuleEntry::new(r"^\s*import\s", 1, "javascript"),
                RuleEntry::new(r"^\s*import\s", 1, "typescript"),
                RuleEntry::new(r"^\s*#include\s", 1, "c"),
            ],
            security: vec![
                RuleEntry::case_insensitive(r"password", 3, "all"),
                RuleEntry::case_insensitive(r"secret", 3, "all"),
                RuleEntry::case_insensitive(r"credential", 3, "all"),
                RuleEntry::case_insensitive(r"\bauth", 3, "all"),
                RuleEntry::case_insensitive(r"\btoken\b", 2, "all"),
                RuleEntry::case_insensitive(r"\b(hash|encrypt|decrypt)", 2, "all"),
            ],
            error_handling: vec![
                RuleEntry::new(r"^\s*(try:|except\s|raise\s)", 2, "python"),
                RuleEntry::new(r"\b(Result<|Err\(|\.map_err\()", 2, "rust"),
                RuleEntry::new(r"\b(try\s*\{|catch\s*\()", 2, "javascript"),
                RuleEntry::new(r"\b(try\s*\{|catch\s*\()", 2, "typescript"),
                RuleEntry::new(r"\bif\s+err\s*!=\s*nil", 2, "go"),
            ],
            test: vec![
                RuleEntry::new(r"^\s*def\s+test_", 2, "python"),
                RuleEntry::new(r"#\[(tokio::)?test\]", 2, "rust"),
                RuleEntry::new(r"\b(describe|it|test)\s*\(", 2, "javascript"),
                RuleEntry::new(r"\b(describe|it|test)\s*\(", 2, "typescript"),
                RuleEntry::new(r"\bassert", 1, "all"),
            ],
            minor: vec![
                RuleEntry::new(r"^\s*(#|//|/\*)", 0, "all"),
                RuleEntry::new(r"\b(print\(|println!|console\.log)", 0, "all"),
                RuleEntry::new(r"^\s*\w+\s*=\s*\d+\s*$", 1, "all"),
            ],
        }
    }
}

impl RulesSettings {
    /// Total number of configured rules across all categories.
    pub fn len(&self) -> usize {
        self.function_def.len()
            + self.import.len()
            + self.security.len()
            + self.error_handling.len()
            + self.test.len()
            + self.minor.len()
    }

    /// Whether no rules are configured at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_populated() {
        let rules = RulesSettings::default();
        assert!(!rules.is_empty());
        assert!(!rules.function_def.is_empty());
        assert!(!rules.security.is_empty());
        assert!(!rules.minor.is_empty());
    }

    #[test]
    fn security_defaults_are_case_insensitive() {
        let rules = RulesSettings::default();
        assert!(rules.security.iter().all(|r| r.case_insensitive));
    }

    #[test]
    fn toml_replaces_category_wholesale() {
        let rules: RulesSettings = toml::from_str(
            r#"
            [[security]]
            pattern = "password"
            points = 3
            "#,
        )
        .unwrap();
        assert_eq!(rules.security.len(), 1);
        assert_eq!(rules.security[0].pattern, "password");
        assert_eq!(rules.security[0].points, 3);
        assert_eq!(rules.security[0].language, "all");
        // Unnamed categories keep defaults
        assert!(!rules.function_def.is_empty());
    }

    #[test]
    fn rule_entry_defaults() {
        let entry = RuleEntry::default();
        assert_eq!(entry.language, "all");
        assert_eq!(entry.points, 0);
        assert!(!entry.case_insensitive);
    }
}
