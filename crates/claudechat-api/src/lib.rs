//! Completion client boundary for claudechat
//!
//! The chat session talks to the remote model through the `CompletionClient`
//! trait; `AnthropicClient` is the production implementation against the
//! native Anthropic Messages API.

use anyhow::Result;
use async_trait::async_trait;

use claudechat_types::{
    Message, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE,
};

mod anthropic_client;

pub use anthropic_client::AnthropicClient;

/// Fixed generation parameters sent with every completion request. Opaque to
/// the session; it just passes them through.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// One-shot completion over the full message log. A single attempt per turn;
/// any failure is handled by the caller's rollback.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[Message], config: &RequestConfig) -> Result<String>;
}
