use crate::errors::ConfigError;
use crate::model::Verdict;
use serde::{Deserialize, Serialize};

/// The allowed answer phrases.
///
/// One value is handed to both the prompt builder and the parser, so the
/// text the model is told to emit is the text the parser looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseSet {
    pub round_up: String,
    pub cash_in_lieu: String,
    pub unable_to_determine: String,
}

impl Default for PhraseSet {
    fn default() -> Self {
        Self {
            round_up: "Round-up Likely".to_string(),
            cash_in_lieu: "Cash-in-Lieu Likely".to_string(),
            unable_to_determine: "Unable to Determine".to_string(),
        }
    }
}

impl PhraseSet {
    /// Phrases as written in the prompt, in matching priority order.
    pub fn entries(&self) -> [(Verdict, &str); 3] {
        [
            (Verdict::RoundUpLikely, self.round_up.as_str()),
            (Verdict::CashInLieuLikely, self.cash_in_lieu.as_str()),
            (Verdict::UnableToDetermine, self.unable_to_determine.as_str()),
        ]
    }

    /// Phrases in comparison form (see [`normalize_phrase`]).
    pub fn normalized(&self) -> [(Verdict, String); 3] {
        self.entries().map(|(v, p)| (v, normalize_phrase(p)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let normalized = self.normalized();
        for (verdict, phrase) in &normalized {
            if phrase.is_empty() {
                return Err(ConfigError::invalid(
                    "classifier.phrases",
                    format!("phrase for '{verdict}' is empty"),
                ));
            }
            if phrase.contains(':') {
                return Err(ConfigError::invalid(
                    "classifier.phrases",
                    format!("phrase '{phrase}' must not contain ':'"),
                ));
            }
        }
        for (i, (_, a)) in normalized.iter().enumerate() {
            for (_, b) in normalized.iter().skip(i + 1) {
                if a == b {
                    return Err(ConfigError::invalid(
                        "classifier.phrases",
                        format!("duplicate phrase '{a}'"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Lowercase and collapse every whitespace run to a single space.
pub fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_spacing() {
        assert_eq!(normalize_phrase("  Cash-in-Lieu \t Likely "), "cash-in-lieu likely");
    }

    #[test]
    fn default_set_is_valid() {
        PhraseSet::default().validate().unwrap();
    }

    #[test]
    fn rejects_duplicates_after_normalization() {
        let set = PhraseSet {
            round_up: "Likely".into(),
            cash_in_lieu: "  likely".into(),
            ..Default::default()
        };
        assert!(set.validate().is_err());
    }

    #[test]
    fn rejects_colon_and_empty() {
        let set = PhraseSet {
            unable_to_determine: "Unknown: maybe".into(),
            ..Default::default()
        };
        assert!(set.validate().is_err());
        let set = PhraseSet {
            round_up: "   ".into(),
            ..Default::default()
        };
        assert!(set.validate().is_err());
    }
}
