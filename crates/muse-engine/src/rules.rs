//! Compiled scoring rule table.
//!
//! Rule configuration is compiled once at load. An entry whose pattern is
//! not a valid regex is reported with a single `warn!` and disabled; scoring
//! proceeds as if the rule were absent. Compilation itself never fails.

use muse_core::Tag;
use regex::RegexBuilder;
use tracing::warn;

use muse_settings::{RuleEntry, RulesSettings};

/// Which configuration category a rule came from. Determines the tag the
/// rule contributes when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    /// New function/method definitions.
    FunctionDef,
    /// Imports and includes.
    Import,
    /// Security-relevant keywords.
    Security,
    /// Error-handling constructs.
    ErrorHandling,
    /// Test code.
    Test,
    /// Noise-level edits.
    Minor,
}

impl RuleCategory {
    /// The tag a matching rule of this category contributes.
    pub fn tag(self) -> Tag {
        match self {
            Self::FunctionDef | Self::Import => Tag::Architecture,
            Self::Security => Tag::Security,
            Self::ErrorHandling => Tag::ErrorHandling,
            Self::Test => Tag::Test,
            Self::Minor => Tag::Minor,
        }
    }
}

/// One compiled rule.
#[derive(Debug)]
pub struct CompiledRule {
    /// Compiled pattern.
    pub regex: regex::Regex,
    /// Points contributed when the pattern matches (counted once).
    pub points: u32,
    /// Language scope; `None` means the rule applies to every file.
    pub language: Option<String>,
    /// Category the rule was configured under.
    pub category: RuleCategory,
}

impl CompiledRule {
    /// Whether this rule applies to a file of the given detected language.
    pub fn applies_to(&self, language: Option<&str>) -> bool {
        match &self.language {
            None => true,
            Some(scope) => language == Some(scope.as_str()),
        }
    }
}

/// The full compiled rule table.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
    disabled: usize,
}

impl RuleTable {
    /// Compile a rule table from configuration.
    ///
    /// Invalid patterns are warned about once here and skipped.
    pub fn compile(settings: &RulesSettings) -> Self {
        let mut table = Self::default();
        table.compile_category(&settings.function_def, RuleCategory::FunctionDef);
        table.compile_category(&settings.import, RuleCategory::Import);
        table.compile_category(&settings.security, RuleCategory::Security);
        table.compile_category(&settings.error_handling, RuleCategory::ErrorHandling);
        table.compile_category(&settings.test, RuleCategory::Test);
        table.compile_category(&settings.minor, RuleCategory::Minor);
        table
    }

    fn compile_category(&mut self, entries: &[RuleEntry], category: RuleCategory) {
        for entry in entries {
            match RegexBuilder::new(&entry.pattern)
                .case_insensitive(entry.case_insensitive)
                .multi_line(true)
                .build()
            {
                Ok(regex) => self.rules.push(CompiledRule {
                    regex,
                    points: entry.points,
                    language: (entry.language != "all").then(|| entry.language.clone()),
                    category,
                }),
                Err(err) => {
                    warn!(
                        pattern = %entry.pattern,
                        ?category,
                        error = %err,
                        "invalid rule pattern, rule disabled"
                    );
                    self.disabled += 1;
                }
            }
        }
    }

    /// The compiled rules, in configuration order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Number of active rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules compiled successfully.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules disabled at compile time due to invalid patterns.
    pub fn disabled_count(&self) -> usize {
        self.disabled
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_compiles_fully() {
        let table = RuleTable::compile(&RulesSettings::default());
        assert!(!table.is_empty());
        assert_eq!(table.disabled_count(), 0);
        assert_eq!(table.len(), RulesSettings::default().len());
    }

    #[test]
    fn invalid_pattern_is_disabled_not_fatal() {
        let mut settings = RulesSettings::default();
        settings.security.push(RuleEntry {
            pattern: "[unclosed".to_string(),
            points: 3,
            language: "all".to_string(),
            case_insensitive: false,
        });
        let table = RuleTable::compile(&settings);
        assert_eq!(table.disabled_count(), 1);
        // Remaining rules unaffected
        assert_eq!(table.len(), RulesSettings::default().len());
    }

    #[test]
    fn language_scoping() {
        let table = RuleTable::compile(&RulesSettings::default());
        let python_def = table
            .rules()
            .iter()
            .find(|r| r.language.as_deref() == Some("python"))
            .unwrap();
        assert!(python_def.applies_to(Some("python")));
        assert!(!python_def.applies_to(Some("rust")));
        assert!(!python_def.applies_to(None));
    }

    #[test]
    fn all_scope_applies_everywhere() {
        let table = RuleTable::compile(&RulesSettings::default());
        let unscoped = table.rules().iter().find(|r| r.language.is_none()).unwrap();
        assert!(unscoped.applies_to(Some("python")));
        assert!(unscoped.applies_to(None));
    }

    #[test]
    fn case_insensitive_flag_respected() {
        let settings = RulesSettings {
            function_def: vec![],
            import: vec![],
            security: vec![RuleEntry {
                pattern: "password".to_string(),
                points: 3,
                language: "all".to_string(),
                case_insensitive: true,
            }],
            error_handling: vec![],
            test: vec![],
            minor: vec![],
        };
        let table = RuleTable::compile(&settings);
        assert!(table.rules()[0].regex.is_match("PASSWORD = input()"));
    }

    #[test]
    fn category_to_tag_mapping() {
        assert_eq!(RuleCategory::FunctionDef.tag(), Tag::Architecture);
        assert_eq!(RuleCategory::Import.tag(), Tag::Architecture);
        assert_eq!(RuleCategory::Security.tag(), Tag::Security);
        assert_eq!(RuleCategory::ErrorHandling.tag(), Tag::ErrorHandling);
        assert_eq!(RuleCategory::Test.tag(), Tag::Test);
        assert_eq!(RuleCategory::Minor.tag(), Tag::Minor);
    }
}
