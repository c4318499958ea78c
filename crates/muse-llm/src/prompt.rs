//! Prompt construction and verdict parsing.
//!
//! Prompts are built from the [`ChangeSummary`] the engine hands out with a
//! `Ready` snapshot; nothing here touches the network. The judgment answer
//! is free text constrained to "YES/NO, confidence 1-10" and parsed
//! leniently: an explicit NO always wins, the last number 1-10 in the text
//! is the confidence, and a YES with no number defaults to 7.

use std::fmt::Write as _;
use std::sync::OnceLock;

use muse_core::{ChangeSummary, Verdict};
use regex::Regex;

/// Confidence assumed when the answer says YES without naming a number.
const DEFAULT_CONFIDENCE: u8 = 7;

/// System prompt for the judgment call.
pub const JUDGMENT_SYSTEM_PROMPT: &str =
    "You are a decision assistant for an ambient coding companion. \
     Answer briefly: YES/NO, confidence 1-10.";

/// System prompt for insight generation.
pub const INSIGHT_SYSTEM_PROMPT: &str =
    "You are an ambient pair programmer watching a developer work. \
     Offer one brief, concrete, big-picture observation about their recent \
     changes. Two or three sentences, no preamble.";

/// Render the shared change-context block both prompts open with.
fn change_context(summary: &ChangeSummary) -> String {
    let mut out = format!(
        "{} recent changes across {} file(s): {}. Aggregate score {} against threshold {}.",
        summary.change_count,
        summary.files.len(),
        summary.files.join(", "),
        summary.total_score,
        summary.threshold,
    );
    if !summary.tag_counts.is_empty() {
        let tags: Vec<String> = summary
            .tag_counts
            .iter()
            .map(|(tag, count)| format!("{tag} x{count}"))
            .collect();
        let _ = write!(out, " Tags: {}.", tags.join(", "));
    }
    if summary.idle_triggered {
        out.push_str(" The developer has gone quiet since these changes.");
    }
    out
}

/// Build the judgment prompt for [`crate::Advisor::assess`].
pub fn build_judgment_prompt(summary: &ChangeSummary) -> String {
    format!(
        "{} Is now a good time for big-picture input? Answer: YES/NO, confidence 1-10.",
        change_context(summary)
    )
}

/// Build the insight prompt for [`crate::Advisor::insight`].
pub fn build_insight_prompt(summary: &ChangeSummary) -> String {
    format!(
        "{} What is worth saying to the developer right now?",
        change_context(summary)
    )
}

/// Parse a judgment answer into a verdict.
///
/// Returns `None` when the text contains neither YES nor NO.
pub fn parse_verdict(response: &str) -> Option<Verdict> {
    static CONFIDENCE_RE: OnceLock<Regex> = OnceLock::new();
    static ANSWER_RE: OnceLock<Regex> = OnceLock::new();
    let confidence_re = CONFIDENCE_RE.get_or_init(|| {
        Regex::new(r"\b([1-9]|10)\b").unwrap_or_else(|_| unreachable!("static pattern"))
    });
    let answer_re = ANSWER_RE.get_or_init(|| {
        // Word boundaries so "now"/"nothing" do not read as NO
        Regex::new(r"(?i)\b(yes|no)\b").unwrap_or_else(|_| unreachable!("static pattern"))
    });

    let mut has_yes = false;
    let mut has_no = false;
    for answer in answer_re.find_iter(response) {
        if answer.as_str().eq_ignore_ascii_case("yes") {
            has_yes = true;
        } else {
            has_no = true;
        }
    }
    if !has_yes && !has_no {
        return None;
    }

    let confidence = confidence_re
        .find_iter(response)
        .last()
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .unwrap_or(DEFAULT_CONFIDENCE);

    Some(Verdict {
        // An explicit NO wins even alongside a YES
        intervene: !has_no,
        confidence,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
