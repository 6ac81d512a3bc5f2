use super::rules::classify_remainder;
use crate::classify::PhraseSet;
use crate::model::{ClassificationResult, MatchConfidence, Verdict};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Line boundaries in a response: `\n`, `\r` and the other Unicode line
/// and paragraph separators.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{b}', '\u{c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

fn enumeration_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s*").unwrap())
}

/// Parse a raw batch response into one result per requested ticker.
///
/// Total and deterministic: every requested ticker appears exactly once,
/// defaulting to "response missing"; unknown tickers are never added; the
/// first line for a ticker wins. Malformed input never errors.
pub fn parse_response(
    raw_text: &str,
    requested_tickers: &[String],
    phrases: &PhraseSet,
) -> BTreeMap<String, ClassificationResult> {
    let mut results: BTreeMap<String, ClassificationResult> = requested_tickers
        .iter()
        .map(|t| (t.clone(), ClassificationResult::missing()))
        .collect();
    let mut resolved: HashSet<&str> = HashSet::new();

    let raw_text = raw_text.strip_prefix('\u{feff}').unwrap_or(raw_text);
    for line in raw_text
        .split(LINE_BREAKS)
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        let line = match enumeration_prefix().find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        };
        let Some((token, remainder)) = line.split_once(':') else {
            continue;
        };
        let ticker = token.trim().trim_matches(|c: char| c == '*' || c == '`').trim();

        let Some(slot) = results.get_mut(ticker) else {
            debug!(ticker, "ignoring line for unrequested ticker");
            continue;
        };
        if resolved.contains(ticker) {
            debug!(ticker, "ignoring duplicate line, first answer kept");
            continue;
        }

        let (hit, rule) = classify_remainder(remainder, phrases);
        match hit.verdict {
            Verdict::ResponseUnclear => {
                warn!(ticker, answer = %hit.reasoning, "no known classification phrase in answer");
            }
            _ if rule == "contains" => {
                warn!(
                    ticker,
                    verdict = %hit.verdict,
                    "classification found but not at start of answer, parse may be inaccurate"
                );
            }
            _ => {}
        }

        *slot = ClassificationResult {
            verdict: hit.verdict,
            reasoning: hit.reasoning,
            confidence: hit.confidence,
        };
        resolved.insert(ticker);
    }

    results
}

/// Counts over a parsed batch, for logging and run summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub resolved: usize,
    pub fallback: usize,
    pub unclear: usize,
    pub missing: usize,
}

impl ParseSummary {
    pub fn from_results(results: &BTreeMap<String, ClassificationResult>) -> Self {
        let mut summary = Self::default();
        for result in results.values() {
            match result.verdict {
                Verdict::ResponseUnclear => summary.unclear += 1,
                Verdict::ResponseMissing => summary.missing += 1,
                v if v.is_model_verdict() => {
                    summary.resolved += 1;
                    if result.confidence == MatchConfidence::Fallback {
                        summary.fallback += 1;
                    }
                }
                _ => {}
            }
        }
        summary
    }
}
