use super::LlmClient;
use crate::errors::{ProviderError, ProviderResult};
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAIClient {
    pub model: String,
    api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(
        &self,
        prompt: &str,
        context: Option<&[String]>,
    ) -> ProviderResult<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut messages = Vec::new();
        if let Some(ctx) = context {
            for system in ctx {
                messages.push(json!({ "role": "system", "content": system }));
            }
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        crate::providers::network::check_outbound(&url)?;
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                self.provider_name(),
                status.as_u16(),
                error_text,
            ));
        }

        let json: serde_json::Value =
            resp.json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: self.provider_name().to_string(),
                    message: e.to_string(),
                })?;

        // choices[0].message.content; a null content is an empty answer.
        let choice = json
            .pointer("/choices/0/message")
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: self.provider_name().to_string(),
                message: "response missing choices[0].message".to_string(),
            })?;
        let text = choice
            .get("content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(LlmResponse {
            text,
            provider: self.provider_name().to_string(),
            model: self.model.clone(),
            meta: json.get("usage").cloned().unwrap_or_default(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::network::NetworkPolicyGuard;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn openai_client_respects_network_deny_policy() {
        let _guard = NetworkPolicyGuard::deny("unit test");
        let client = OpenAIClient::new("gpt-4o-mini".to_string(), "test-key".to_string(), 0.0, 8);
        let err = client
            .complete("hello", None)
            .await
            .expect_err("network deny policy should block outbound call");
        let msg = err.to_string();
        assert!(msg.contains("outbound network blocked by policy"));
        assert!(msg.contains("api.openai.com"));
    }
}
