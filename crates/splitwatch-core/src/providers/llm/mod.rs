pub mod fake;
pub mod gemini;
pub mod openai;

use crate::config::ClassifierConfig;
use crate::errors::{ProviderError, ProviderResult};
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::sync::Arc;

pub use fake::FakeClient;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;

/// A generative-text service.
///
/// Implementations make exactly one attempt per call: no retry, no backoff
/// and no timeout beyond the transport default.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        context: Option<&[String]>,
    ) -> ProviderResult<LlmResponse>;

    fn provider_name(&self) -> &'static str;

    fn model(&self) -> &str;
}

/// Build the configured provider.
///
/// Returns `NotConfigured` when the provider needs an API key and none was
/// resolved, so the caller can disable the stage without attempting I/O.
pub fn build_client(config: &ClassifierConfig) -> ProviderResult<Arc<dyn LlmClient>> {
    let provider = config.provider.trim().to_ascii_lowercase();
    if provider == "fake" {
        let text = config.fake_response.clone().unwrap_or_default();
        return Ok(Arc::new(FakeClient::new(config.model.clone(), text)));
    }

    let api_key = match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => {
            return Err(ProviderError::NotConfigured {
                reason: format!("no API key for provider '{provider}'"),
            })
        }
    };

    match provider.as_str() {
        "gemini" => {
            let mut client = GeminiClient::new(
                config.model.clone(),
                api_key,
                config.temperature,
                config.max_tokens,
            );
            if let Some(base) = &config.base_url {
                client = client.with_base_url(base.clone());
            }
            Ok(Arc::new(client))
        }
        "openai" => {
            let mut client = OpenAIClient::new(
                config.model.clone(),
                api_key,
                config.temperature,
                config.max_tokens,
            );
            if let Some(base) = &config.base_url {
                client = client.with_base_url(base.clone());
            }
            Ok(Arc::new(client))
        }
        other => Err(ProviderError::NotConfigured {
            reason: format!("unknown provider '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let config = ClassifierConfig {
            provider: "gemini".into(),
            api_key: None,
            ..Default::default()
        };
        let err = build_client(&config).err().unwrap();
        assert!(err.is_not_configured());

        let config = ClassifierConfig {
            provider: "openai".into(),
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert!(build_client(&config).err().unwrap().is_not_configured());
    }

    #[test]
    fn fake_provider_needs_no_key() {
        let config = ClassifierConfig {
            provider: "fake".into(),
            api_key: None,
            fake_response: Some("ABCD: Round-up Likely".into()),
            ..Default::default()
        };
        let client = build_client(&config).unwrap();
        assert_eq!(client.provider_name(), "fake");
    }

    #[test]
    fn selects_provider_by_name() {
        let config = ClassifierConfig {
            provider: "OpenAI".into(),
            api_key: Some("sk-test".into()),
            model: "gpt-4o-mini".into(),
            ..Default::default()
        };
        let client = build_client(&config).unwrap();
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(client.model(), "gpt-4o-mini");
    }
}
