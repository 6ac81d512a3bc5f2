use serde::{Deserialize, Serialize};
use std::fmt;

/// One reverse split awaiting classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitCandidate {
    pub ticker: String,
    /// Ratio exactly as scraped ("1:10", "1/20", "1-for-15").
    pub ratio: String,
    /// ISO date or "N/A". Only shown to the model, never parsed here.
    #[serde(default = "default_ex_date")]
    pub ex_date: String,
}

fn default_ex_date() -> String {
    "N/A".to_string()
}

impl SplitCandidate {
    pub fn new(ticker: impl Into<String>, ratio: impl Into<String>, ex_date: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ratio: ratio.into(),
            ex_date: ex_date.into(),
        }
    }

    /// Year prefix of the ex-date, or "recent" when the date has no dash.
    pub fn year(&self) -> &str {
        match self.ex_date.split_once('-') {
            Some((year, _)) if !year.is_empty() => year,
            _ => "recent",
        }
    }
}

/// Normalized classification value.
///
/// The first three variants are genuine model verdicts; the rest are
/// locally generated sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "round-up likely")]
    RoundUpLikely,
    #[serde(rename = "cash-in-lieu likely")]
    CashInLieuLikely,
    #[serde(rename = "unable to determine")]
    UnableToDetermine,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "response missing")]
    ResponseMissing,
    #[serde(rename = "response unclear")]
    ResponseUnclear,
    #[serde(rename = "api error")]
    ApiError,
    #[serde(rename = "disabled")]
    Disabled,
    #[serde(rename = "n/a (forward split)")]
    NotApplicable,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::RoundUpLikely => "round-up likely",
            Verdict::CashInLieuLikely => "cash-in-lieu likely",
            Verdict::UnableToDetermine => "unable to determine",
            Verdict::Pending => "pending",
            Verdict::ResponseMissing => "response missing",
            Verdict::ResponseUnclear => "response unclear",
            Verdict::ApiError => "api error",
            Verdict::Disabled => "disabled",
            Verdict::NotApplicable => "n/a (forward split)",
        }
    }

    /// True for verdicts that came out of the model rather than local fallbacks.
    pub fn is_model_verdict(&self) -> bool {
        matches!(
            self,
            Verdict::RoundUpLikely | Verdict::CashInLieuLikely | Verdict::UnableToDetermine
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the verdict was located in the model's line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Phrase found at the start of the answer.
    Exact,
    /// Phrase found somewhere inside the answer.
    Fallback,
    /// Sentinel; nothing matched.
    #[default]
    None,
}

/// Outcome for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub verdict: Verdict,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub confidence: MatchConfidence,
}

impl ClassificationResult {
    pub fn sentinel(verdict: Verdict, reasoning: impl Into<String>) -> Self {
        Self {
            verdict,
            reasoning: reasoning.into(),
            confidence: MatchConfidence::None,
        }
    }

    pub fn missing() -> Self {
        Self::sentinel(Verdict::ResponseMissing, "")
    }
}

/// A split row after validation, as written to the CSV report and webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecord {
    pub ticker: String,
    pub company_name: String,
    pub ratio: String,
    /// `%Y-%m-%d`.
    pub ex_date: String,
    pub exchange: String,
    pub classification: Verdict,
    #[serde(default)]
    pub reasoning: String,
}

impl SplitRecord {
    /// History key; a split is notified once per ticker and ex-date.
    pub fn notification_key(&self) -> String {
        format!("{}_{}", self.ticker, self.ex_date)
    }

    pub fn candidate(&self) -> SplitCandidate {
        SplitCandidate::new(&self.ticker, &self.ratio, &self.ex_date)
    }
}

/// Raw text returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}
