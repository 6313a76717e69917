use clap::Parser;

use crate::openai::Sampling;

/// Command line and environment configuration for the gateway.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "HTTP gateway turning prompts into completions")]
pub struct Config {
    /// Address to bind the HTTP server
    #[arg(long, env = "TALK_GATEWAY_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: String,

    /// API key for the completion provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Base URL of the completion provider
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    /// Completion model
    #[arg(long, env = "OPENAI_MODEL", default_value = "text-davinci-002")]
    pub model: String,

    /// Sampling temperature
    #[arg(long, env = "OPENAI_TEMPERATURE", default_value_t = 0.6)]
    pub temperature: f32,

    /// Maximum number of generated tokens
    #[arg(long, env = "OPENAI_MAX_TOKENS", default_value_t = 1500)]
    pub max_tokens: u32,
}

impl Config {
    pub fn sampling(&self) -> Sampling {
        Sampling {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
