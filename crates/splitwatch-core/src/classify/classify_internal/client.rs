use super::prompt::{BatchPrompt, SYSTEM_PROMPT};
use crate::classify::ClassifierService;
use crate::errors::{ProviderError, ProviderResult};
use crate::model::LlmResponse;

/// The one model call for a batch. No retry on failure.
pub(crate) async fn call_classifier_impl(
    svc: &ClassifierService,
    prompt: &BatchPrompt,
) -> ProviderResult<LlmResponse> {
    let client = svc
        .client
        .as_ref()
        .ok_or_else(|| ProviderError::NotConfigured {
            reason: svc
                .disabled_reason
                .clone()
                .unwrap_or_else(|| "classifier client not initialized".to_string()),
        })?;

    let system = [SYSTEM_PROMPT.to_string()];
    client.complete(&prompt.text, Some(&system)).await
}
