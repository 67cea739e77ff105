use clap::Parser;
use std::path::PathBuf;

use claudechat_api::RequestConfig;
use claudechat_types::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE,
};

/// CLI arguments for claudechat
#[derive(Parser)]
#[command(name = "claudechat")]
#[command(about = "Claude Chat - persistent terminal conversations")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Directory where conversation snapshots are stored
    #[arg(long, value_name = "DIR", default_value = "conversations")]
    pub conversations_dir: PathBuf,

    /// Resume a specific conversation id directly, skipping the menu
    #[arg(short, long, value_name = "ID")]
    pub resume: Option<String>,

    /// Model to use for completions
    #[arg(long, value_name = "MODEL", env = "CLAUDECHAT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL for the Anthropic API
    #[arg(
        long,
        value_name = "URL",
        env = "ANTHROPIC_BASE_URL",
        default_value = "https://api.anthropic.com"
    )]
    pub api_url: String,

    /// Override the system directive sent with every request
    #[arg(long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Sampling temperature
    #[arg(long, value_name = "TEMP", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Maximum output tokens per completion
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Seconds to wait for a completion before treating the turn as failed
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Cli {
    /// Fixed generation parameters for every turn of every session.
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            model: self.model.clone(),
            system_prompt: self
                .system
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}
