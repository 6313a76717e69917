//! Completion backend for the OpenAI text-completion API.

use async_trait::async_trait;
use persona::{Completer, GenerationError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed sampling parameters applied to every request.
#[derive(Clone, Debug, PartialEq)]
pub struct Sampling {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            model: "text-davinci-002".into(),
            temperature: 0.6,
            max_tokens: 1500,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

/// [`Completer`] backed by `POST {base_url}/v1/completions`.
pub struct OpenAiCompleter {
    base_url: String,
    api_key: String,
    sampling: Sampling,
    client: Client,
}

impl OpenAiCompleter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        sampling: Sampling,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            sampling,
            client: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = CompletionRequest {
            model: &self.sampling.model,
            prompt,
            temperature: self.sampling.temperature,
            max_tokens: self.sampling.max_tokens,
        };
        debug!(model = %self.sampling.model, "requesting completion");
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "completion provider rejected request");
            return Err(GenerationError::Status(status.as_u16()));
        }
        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|_| GenerationError::InvalidResponse)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_string())
            .ok_or(GenerationError::InvalidResponse)
    }
}
