use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use claudechat_types::Message;

use crate::{CompletionClient, RequestConfig};

/// Client for the native Anthropic Messages API.
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        // Ensure base_url doesn't end with a slash
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn get_messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// The wire format only carries role and content; local timestamps stay
    /// on our side of the boundary.
    fn convert_messages_to_wire_format(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role,
                    "content": msg.content
                })
            })
            .collect()
    }

    /// Pull the assistant text out of a Messages API response body.
    fn extract_response_text(response_json: &Value) -> Result<String> {
        let content = response_json["content"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("No content in response"))?;

        let mut text = String::new();
        for item in content {
            if item["type"] == "text" {
                if let Some(text_content) = item["text"].as_str() {
                    text.push_str(text_content);
                }
            }
        }

        if text.is_empty() {
            return Err(anyhow::anyhow!("Response contained no text content"));
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, messages: &[Message], config: &RequestConfig) -> Result<String> {
        let wire_messages = Self::convert_messages_to_wire_format(messages);

        let request = serde_json::json!({
            "model": config.model,
            "system": config.system_prompt,
            "temperature": config.temperature,
            "max_tokens": config.max_tokens,
            "messages": wire_messages
        });

        let response = self
            .client
            .post(self.get_messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "API request failed: {} - {}",
                status,
                error_text
            ));
        }

        let response_text = response.text().await?;
        let response_json: Value = serde_json::from_str(&response_text)?;

        Self::extract_response_text(&response_json)
    }
}
