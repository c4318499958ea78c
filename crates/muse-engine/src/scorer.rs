//! Pattern scorer.
//!
//! `score` is a pure function of the change record and the rule table: no
//! I/O, no hidden state, deterministic replay. Each matching rule
//! contributes its points exactly once per record regardless of how many
//! times its pattern occurs in the fragment.

use std::collections::BTreeSet;

use muse_core::{language_for_path, ChangeRecord, ScoredChange, Tag};

use crate::rules::RuleTable;

/// Score a change record against the rule table.
///
/// Language-scoped rules only apply when the record's file extension maps
/// to that language. A record whose only matches are minor-category rules
/// carries just the `minor` tag.
pub fn score(record: ChangeRecord, table: &RuleTable) -> ScoredChange {
    let language = language_for_path(&record.path);

    let mut total = 0u32;
    let mut tags: BTreeSet<Tag> = BTreeSet::new();

    for rule in table.rules() {
        if !rule.applies_to(language) {
            continue;
        }
        if rule.regex.is_match(&record.fragment) {
            total += rule.points;
            let _ = tags.insert(rule.category.tag());
        }
    }

    ScoredChange {
        record,
        score: total,
        tags,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use muse_core::ChangeKind;
    use muse_settings::{RuleEntry, RulesSettings};
    use std::path::PathBuf;
    use std::time::Instant;

    fn record(path: &str, fragment: &str) -> ChangeRecord {
        ChangeRecord {
            path: PathBuf::from(path),
            kind: ChangeKind::Modified,
            line_delta: 1,
            added_symbols: vec![],
            fragment: fragment.to_string(),
            timestamp: Instant::now(),
        }
    }

    fn single_rule_table(pattern: &str, points: u32) -> RuleTable {
        RuleTable::compile(&RulesSettings {
            function_def: vec![],
            import: vec![],
            security: vec![RuleEntry {
                pattern: pattern.to_string(),
                points,
                language: "all".to_string(),
                case_insensitive: false,
            }],
            error_handling: vec![],
            test: vec![],
            minor: vec![],
        })
    }

    #[test]
    fn single_match_scores_rule_points() {
        let table = single_rule_table("password", 3);
        let scored = score(record("config.py", "password = load()"), &table);
        assert_eq!(scored.score, 3);
        assert!(scored.tags.contains(&Tag::Security));
    }

    #[test]
    fn repeated_match_counts_once() {
        let table = single_rule_table("password", 3);
        let scored = score(
            record("config.py", "password = old_password\npassword2 = password"),
            &table,
        );
        assert_eq!(scored.score, 3);
    }

    #[test]
    fn no_match_scores_zero() {
        let table = single_rule_table("password", 3);
        let scored = score(record("main.py", "x = 1"), &table);
        assert_eq!(scored.score, 0);
        assert!(scored.tags.is_empty());
    }

    #[test]
    fn scoring_is_deterministic() {
        let table = RuleTable::compile(&RulesSettings::default());
        let first = score(record("auth.py", "def login(password):\n    pass"), &table);
        let second = score(record("auth.py", "def login(password):\n    pass"), &table);
        assert_eq!(first.score, second.score);
        assert_eq!(first.tags, second.tags);
    }

    #[test]
    fn language_scoped_rule_skips_other_languages() {
        let table = RuleTable::compile(&RulesSettings::default());
        // Python def syntax in a .rs file must not hit the python rule
        let scored = score(record("lib.rs", "def handler(x):"), &table);
        assert!(!scored.tags.contains(&Tag::Architecture));
    }

    #[test]
    fn function_def_and_security_tags_combine() {
        let table = RuleTable::compile(&RulesSettings::default());
        let scored = score(
            record("auth.py", "def check_password(pw):\n    return hash(pw)"),
            &table,
        );
        assert!(scored.tags.contains(&Tag::Architecture));
        assert!(scored.tags.contains(&Tag::Security));
        // def +3, password +3, hash/encrypt/decrypt +2
        assert_eq!(scored.score, 8);
    }

    #[test]
    fn minor_only_change_tagged_minor() {
        let table = RuleTable::compile(&RulesSettings::default());
        let scored = score(record("main.py", "# just a comment"), &table);
        assert!(scored.is_minor());
        assert_eq!(scored.score, 0);
    }

    #[test]
    fn default_rules_score_python_function() {
        let table = RuleTable::compile(&RulesSettings::default());
        let scored = score(record("app.py", "def process(data):\n    return data"), &table);
        assert_eq!(scored.score, 3);
        assert_eq!(scored.tags, BTreeSet::from([Tag::Architecture]));
    }

    #[test]
    fn unknown_extension_only_matches_unscoped_rules() {
        let table = RuleTable::compile(&RulesSettings::default());
        let scored = score(record("notes.txt", "the password is hunter2"), &table);
        assert!(scored.tags.contains(&Tag::Security));
        assert_eq!(scored.score, 3);
    }
}
