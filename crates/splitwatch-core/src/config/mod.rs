//! Run configuration: YAML file, then environment overrides, then validation.
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SPLITWATCH_URL` | Split table page URL |
//! | `SPLITWATCH_PROVIDER` | `gemini`, `openai` or `fake` |
//! | `SPLITWATCH_MODEL` | Classifier model identifier |
//! | `SPLITWATCH_TEMPERATURE` | Sampling temperature (0.0 - 2.0) |
//! | `SPLITWATCH_WEBHOOK_URL` | Chat webhook for new-split alerts |
//! | `SPLITWATCH_API_KEY` | Provider credential (falls back to `GEMINI_API_KEY` / `OPENAI_API_KEY`) |

use crate::classify::PhraseSet;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "splitwatch.yaml";
pub const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub classifier: ClassifierConfig,
    pub paths: PathsConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: Option<String>,
    /// `id` attribute of the split table.
    pub table_id: String,
    /// JSON rows dropped by an external scraper; takes precedence over `url`.
    pub rows_file: Option<PathBuf>,
    pub columns: ColumnConfig,
    /// Base URL of the quote search API used for exchange lookups.
    pub exchange_lookup_url: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            table_id: "latest_splits".to_string(),
            rows_file: None,
            columns: ColumnConfig::default(),
            exchange_lookup_url: None,
        }
    }
}

/// Zero-based cell positions within a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub ticker: usize,
    pub company: usize,
    pub ratio: usize,
    pub ex_date: usize,
    pub exchange: Option<usize>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            ticker: 0,
            company: 2,
            ratio: 3,
            ex_date: 4,
            exchange: None,
        }
    }
}

impl ColumnConfig {
    /// Shortest row that still holds every configured column.
    pub fn min_row_len(&self) -> usize {
        [self.ticker, self.company, self.ratio, self.ex_date]
            .into_iter()
            .chain(self.exchange)
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub base_url: Option<String>,
    /// Never read from or written to the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub phrases: PhraseSet,
    /// Canned answer for the `fake` provider.
    pub fake_response: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            temperature: 0.3,
            max_tokens: 2048,
            base_url: None,
            api_key: None,
            phrases: PhraseSet::default(),
            fake_response: None,
        }
    }
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("phrases", &self.phrases)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub csv: PathBuf,
    pub history: PathBuf,
    pub audit_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("upcoming_splits.csv"),
            history: PathBuf::from("notified_splits_history.log"),
            audit_log: PathBuf::from("ai_raw_responses.jsonl"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    /// Pause between consecutive webhook posts.
    pub delay_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            delay_ms: 2000,
        }
    }
}

impl AppConfig {
    /// Load, apply environment overrides and validate.
    ///
    /// `None` reads `splitwatch.yaml` from the working directory if present and
    /// falls back to defaults otherwise; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound {
                        path: p.to_path_buf(),
                    });
                }
                Self::from_file(p)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    info!(
                        path = DEFAULT_CONFIG_FILE,
                        "config file not found, using defaults"
                    );
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Overlay environment values. `lookup` is injected so tests need not touch
    /// the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("SPLITWATCH_URL") {
            self.source.url = Some(url);
        }
        if let Some(provider) = non_empty("SPLITWATCH_PROVIDER") {
            self.classifier.provider = provider.trim().to_ascii_lowercase();
        }
        if let Some(model) = non_empty("SPLITWATCH_MODEL") {
            self.classifier.model = model;
        }
        if let Some(temp) = non_empty("SPLITWATCH_TEMPERATURE").and_then(|v| v.trim().parse().ok()) {
            self.classifier.temperature = temp;
        }
        if let Some(url) = non_empty("SPLITWATCH_WEBHOOK_URL") {
            self.notify.webhook_url = Some(url);
        }

        let provider_key = match self.classifier.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            _ => "GEMINI_API_KEY",
        };
        let existing = self.classifier.api_key.take();
        self.classifier.api_key = non_empty("SPLITWATCH_API_KEY")
            .or_else(|| non_empty(provider_key))
            .or(existing);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let temp = self.classifier.temperature;
        if !temp.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&temp) {
            return Err(ConfigError::invalid(
                "classifier.temperature",
                format!("{temp} is outside 0.0..={MAX_TEMPERATURE}"),
            ));
        }
        if self.classifier.model.trim().is_empty() {
            return Err(ConfigError::invalid("classifier.model", "must not be empty"));
        }
        match self.classifier.provider.as_str() {
            "gemini" | "openai" | "fake" => {}
            other => {
                return Err(ConfigError::invalid(
                    "classifier.provider",
                    format!("unknown provider '{other}' (expected gemini, openai or fake)"),
                ))
            }
        }
        self.classifier.phrases.validate()?;

        let c = &self.source.columns;
        let mut positions = vec![c.ticker, c.company, c.ratio, c.ex_date];
        positions.extend(c.exchange);
        let total = positions.len();
        positions.sort_unstable();
        positions.dedup();
        if positions.len() != total {
            return Err(ConfigError::invalid(
                "source.columns",
                "column positions must be distinct",
            ));
        }
        Ok(())
    }
}
