mod classify_internal;
pub mod phrases;

pub use classify_internal::parse::{parse_response, ParseSummary};
pub use classify_internal::prompt::{build_prompt, BatchPrompt};
pub use classify_internal::rules::{REASONING_FALLBACK_UNCLEAR, REASONING_NOT_PROVIDED};
pub use phrases::{normalize_phrase, PhraseSet};

use crate::audit::AuditLog;
use crate::config::{AppConfig, ClassifierConfig};
use crate::model::{ClassificationResult, SplitCandidate};
use crate::providers::llm::{build_client, LlmClient};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// How a batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Nothing to classify; no prompt was built.
    Skipped,
    /// The response was received and parsed.
    Classified,
    /// No credentials; every ticker carries the disabled sentinel.
    Disabled,
    /// The call failed; every ticker carries the api error sentinel.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    pub results: BTreeMap<String, ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl BatchOutcome {
    pub fn skipped() -> Self {
        Self {
            status: BatchStatus::Skipped,
            results: BTreeMap::new(),
            model: None,
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&ClassificationResult> {
        self.results.get(ticker)
    }

    pub fn summary(&self) -> ParseSummary {
        ParseSummary::from_results(&self.results)
    }
}

/// Batch classifier.
///
/// The configuration is fixed at construction; whether the service is
/// enabled is decided once, by whether a client could be built.
#[derive(Clone)]
pub struct ClassifierService {
    config: ClassifierConfig,
    client: Option<Arc<dyn LlmClient>>,
    audit: Option<AuditLog>,
    disabled_reason: Option<String>,
}

impl ClassifierService {
    pub fn new(config: ClassifierConfig, client: Option<Arc<dyn LlmClient>>) -> Self {
        let disabled_reason = client
            .is_none()
            .then(|| "classifier client not configured".to_string());
        Self {
            config,
            client,
            audit: None,
            disabled_reason,
        }
    }

    /// Build the service and its provider client from the run configuration.
    ///
    /// Missing credentials disable the service rather than failing.
    pub fn from_config(app: &AppConfig) -> Self {
        let config = app.classifier.clone();
        let audit = AuditLog::new(app.paths.audit_log.clone());
        match build_client(&config) {
            Ok(client) => {
                info!(
                    provider = client.provider_name(),
                    model = client.model(),
                    "classifier configured"
                );
                Self::new(config, Some(client)).with_audit_log(audit)
            }
            Err(e) => {
                info!(reason = %e, "classification will be skipped");
                let mut svc = Self::new(config, None).with_audit_log(audit);
                svc.disabled_reason = Some(e.to_string());
                svc
            }
        }
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn phrases(&self) -> &PhraseSet {
        &self.config.phrases
    }

    /// Classify candidates with one model call.
    ///
    /// Never fails: errors become sentinel verdicts for every ticker.
    pub async fn classify_batch(&self, candidates: &[SplitCandidate]) -> BatchOutcome {
        classify_internal::run::classify_batch_impl(self, candidates).await
    }

    /// Parse a raw response against this service's phrase set.
    pub fn parse(
        &self,
        raw_text: &str,
        requested_tickers: &[String],
    ) -> BTreeMap<String, ClassificationResult> {
        parse_response(raw_text, requested_tickers, &self.config.phrases)
    }
}
