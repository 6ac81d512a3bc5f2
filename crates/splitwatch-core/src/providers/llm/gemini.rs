use super::LlmClient;
use crate::errors::{ProviderError, ProviderResult};
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Generative Language (`generateContent`) client.
pub struct GeminiClient {
    pub model: String,
    api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
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

    fn invalid(&self, message: impl Into<String>) -> ProviderError {
        ProviderError::InvalidResponse {
            provider: self.provider_name().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        context: Option<&[String]>,
    ) -> ProviderResult<LlmResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_tokens,
            },
        });
        if let Some(ctx) = context.filter(|c| !c.is_empty()) {
            body["systemInstruction"] = json!({ "parts": [{ "text": ctx.join("\n") }] });
        }

        crate::providers::network::check_outbound(&url)?;
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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

        let json: serde_json::Value = resp.json().await.map_err(|e| self.invalid(e.to_string()))?;

        if let Some(reason) = json
            .pointer("/promptFeedback/blockReason")
            .and_then(|v| v.as_str())
        {
            return Err(self.invalid(format!("prompt blocked: {reason}")));
        }

        // A candidate may split its answer over several parts.
        let text = json
            .pointer("/candidates/0/content/parts")
            .and_then(|v| v.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            text,
            provider: self.provider_name().to_string(),
            model: self.model.clone(),
            meta: json.get("usageMetadata").cloned().unwrap_or_default(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
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
    async fn gemini_client_respects_network_deny_policy() {
        let _guard = NetworkPolicyGuard::deny("unit test");
        let client = GeminiClient::new(
            "gemini-1.5-flash-latest".to_string(),
            "test-key".to_string(),
            0.3,
            64,
        );
        let err = client.complete("hello", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::Blocked { .. }));
        assert!(err.to_string().contains("generativelanguage.googleapis.com"));
    }
}
