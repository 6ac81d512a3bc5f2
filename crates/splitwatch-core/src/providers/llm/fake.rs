use super::LlmClient;
use crate::errors::ProviderResult;
use crate::model::LlmResponse;
use async_trait::async_trait;

/// Offline provider that answers every prompt with the same text.
pub struct FakeClient {
    model: String,
    text: String,
}

impl FakeClient {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(
        &self,
        _prompt: &str,
        _context: Option<&[String]>,
    ) -> ProviderResult<LlmResponse> {
        Ok(LlmResponse {
            text: self.text.clone(),
            provider: self.provider_name().to_string(),
            model: self.model.clone(),
            meta: serde_json::Value::Null,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
