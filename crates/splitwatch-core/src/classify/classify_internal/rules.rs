//! Verdict and reasoning extraction as ordered rule tables.
//!
//! Every rule is a pure function of the text after the ticker colon. Rules
//! are tried in table order and the first hit wins.

use crate::classify::PhraseSet;
use crate::model::{MatchConfidence, Verdict};

pub const REASONING_NOT_PROVIDED: &str = "(reasoning not distinctly provided)";
pub const REASONING_FALLBACK_UNCLEAR: &str = "(fallback parse, reasoning unclear)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VerdictMatch {
    pub(crate) verdict: Verdict,
    pub(crate) reasoning: String,
    pub(crate) confidence: MatchConfidence,
}

pub(crate) type VerdictRule = fn(&str, &[(Verdict, String); 3]) -> Option<VerdictMatch>;

/// Verdict rules in priority order. A line no rule accepts is "response unclear".
pub(crate) const VERDICT_RULES: &[(&str, VerdictRule)] = &[
    ("prefix", prefix_rule as VerdictRule),
    ("contains", contains_rule as VerdictRule),
];

pub(crate) type SeparatorRule = fn(&str) -> Option<&str>;

/// Separators allowed between the phrase and the reasoning, in priority order.
pub(crate) const SEPARATOR_RULES: &[(&str, SeparatorRule)] = &[
    ("pipe_label", strip_pipe_label as SeparatorRule),
    ("pipe", strip_pipe as SeparatorRule),
    ("label", strip_label as SeparatorRule),
    ("dash", strip_dash as SeparatorRule),
];

/// Apply the verdict rules to one answer.
pub(crate) fn classify_remainder(remainder: &str, phrases: &PhraseSet) -> (VerdictMatch, &'static str) {
    let normalized = phrases.normalized();
    let remainder = remainder.trim();
    for (name, rule) in VERDICT_RULES {
        if let Some(hit) = rule(remainder, &normalized) {
            return (hit, *name);
        }
    }
    (
        VerdictMatch {
            verdict: Verdict::ResponseUnclear,
            reasoning: remainder.to_string(),
            confidence: MatchConfidence::None,
        },
        "unclear",
    )
}

/// Phrase at the very start of the answer; the tail is reasoning.
pub(crate) fn prefix_rule(remainder: &str, phrases: &[(Verdict, String); 3]) -> Option<VerdictMatch> {
    phrases.iter().find_map(|(verdict, phrase)| {
        match_phrase_at(remainder, phrase).map(|end| VerdictMatch {
            verdict: *verdict,
            reasoning: extract_reasoning(&remainder[end..]),
            confidence: MatchConfidence::Exact,
        })
    })
}

/// Phrase anywhere in the answer; everything after it is reasoning.
pub(crate) fn contains_rule(remainder: &str, phrases: &[(Verdict, String); 3]) -> Option<VerdictMatch> {
    phrases.iter().find_map(|(verdict, phrase)| {
        remainder.char_indices().find_map(|(start, _)| {
            match_phrase_at(&remainder[start..], phrase).map(|end| {
                let tail = remainder[start + end..].trim();
                VerdictMatch {
                    verdict: *verdict,
                    reasoning: if tail.is_empty() {
                        REASONING_FALLBACK_UNCLEAR.to_string()
                    } else {
                        tail.to_string()
                    },
                    confidence: MatchConfidence::Fallback,
                }
            })
        })
    })
}

/// Strip the first matching separator from the text after a phrase.
pub(crate) fn extract_reasoning(tail: &str) -> String {
    let tail = tail.trim();
    if tail.is_empty() {
        return REASONING_NOT_PROVIDED.to_string();
    }
    let stripped = SEPARATOR_RULES
        .iter()
        .find_map(|(_, rule)| rule(tail))
        .map(str::trim)
        .unwrap_or(tail);
    if stripped.is_empty() {
        REASONING_NOT_PROVIDED.to_string()
    } else {
        stripped.to_string()
    }
}

fn strip_pipe_label(text: &str) -> Option<&str> {
    strip_pipe(text).and_then(|rest| strip_label(rest.trim_start()))
}

fn strip_pipe(text: &str) -> Option<&str> {
    text.strip_prefix('|')
}

fn strip_label(text: &str) -> Option<&str> {
    const LABEL: &str = "reasoning:";
    let head = text.get(..LABEL.len())?;
    head.eq_ignore_ascii_case(LABEL).then(|| &text[LABEL.len()..])
}

fn strip_dash(text: &str) -> Option<&str> {
    text.strip_prefix(['-', '\u{2013}', '\u{2014}'])
}

/// Match a normalized phrase at the start of `text`, ignoring case and
/// treating any whitespace run as one space. Returns the byte offset just
/// past the match.
pub(crate) fn match_phrase_at(text: &str, phrase: &str) -> Option<usize> {
    if phrase.is_empty() {
        return None;
    }
    let mut want = phrase.chars().peekable();
    let mut chars = text.char_indices().peekable();
    while let Some(&expected) = want.peek() {
        if expected == ' ' {
            want.next();
            let mut saw_space = false;
            while let Some(&(_, c)) = chars.peek() {
                if !c.is_whitespace() {
                    break;
                }
                saw_space = true;
                chars.next();
            }
            if !saw_space {
                return None;
            }
            continue;
        }
        let (_, c) = chars.next()?;
        for lower in c.to_lowercase() {
            if want.next() != Some(lower) {
                return None;
            }
        }
    }
    Some(chars.peek().map(|&(i, _)| i).unwrap_or(text.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases() -> [(Verdict, String); 3] {
        PhraseSet::default().normalized()
    }

    #[test]
    fn phrase_match_ignores_case_and_spacing() {
        assert_eq!(match_phrase_at("ROUND-UP   likely | x", "round-up likely"), Some(17));
        assert_eq!(match_phrase_at("Round-up\tLikely", "round-up likely"), Some(15));
        assert_eq!(match_phrase_at("Round-upLikely", "round-up likely"), None);
        assert_eq!(match_phrase_at("Round-up", "round-up likely"), None);
    }

    #[test]
    fn separator_priority() {
        assert_eq!(extract_reasoning(" | Reasoning: foo"), "foo");
        assert_eq!(extract_reasoning("|reasoning:foo"), "foo");
        assert_eq!(extract_reasoning("| foo"), "foo");
        assert_eq!(extract_reasoning("Reasoning: foo"), "foo");
        assert_eq!(extract_reasoning("- foo"), "foo");
        assert_eq!(extract_reasoning("\u{2014} foo"), "foo");
        assert_eq!(extract_reasoning("  because of the 8-K"), "because of the 8-K");
        assert_eq!(extract_reasoning(""), REASONING_NOT_PROVIDED);
        assert_eq!(extract_reasoning(" | Reasoning:  "), REASONING_NOT_PROVIDED);
    }

    #[test]
    fn prefix_rule_returns_exact() {
        let hit = prefix_rule("Cash-in-Lieu Likely - no rounding language", &phrases()).unwrap();
        assert_eq!(hit.verdict, Verdict::CashInLieuLikely);
        assert_eq!(hit.reasoning, "no rounding language");
        assert_eq!(hit.confidence, MatchConfidence::Exact);
        assert!(prefix_rule("Likely Cash-in-Lieu Likely", &phrases()).is_none());
    }

    #[test]
    fn contains_rule_takes_text_after_phrase() {
        let hit = contains_rule("I think Unable to Determine, sources conflict", &phrases()).unwrap();
        assert_eq!(hit.verdict, Verdict::UnableToDetermine);
        assert_eq!(hit.reasoning, ", sources conflict");
        assert_eq!(hit.confidence, MatchConfidence::Fallback);

        let hit = contains_rule("**Round-up Likely**", &phrases()).unwrap();
        assert_eq!(hit.verdict, Verdict::RoundUpLikely);
        assert_eq!(hit.reasoning, "**");

        let hit = contains_rule("probably round-up likely", &phrases()).unwrap();
        assert_eq!(hit.reasoning, REASONING_FALLBACK_UNCLEAR);
    }

    #[test]
    fn unmatched_remainder_is_unclear_and_verbatim() {
        let (hit, rule) = classify_remainder("  Maybe Both ", &PhraseSet::default());
        assert_eq!(rule, "unclear");
        assert_eq!(hit.verdict, Verdict::ResponseUnclear);
        assert_eq!(hit.reasoning, "Maybe Both");
    }

    #[test]
    fn rules_are_tried_in_order() {
        let (hit, rule) = classify_remainder("Round-up Likely, not Cash-in-Lieu Likely", &PhraseSet::default());
        assert_eq!(rule, "prefix");
        assert_eq!(hit.verdict, Verdict::RoundUpLikely);
        assert_eq!(hit.reasoning, ", not Cash-in-Lieu Likely");
    }
}
