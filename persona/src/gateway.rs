//! Contract with the completion gateway.
//!
//! [`Completer`] turns a prompt into generated text. [`HttpGateway`] speaks
//! the gateway's wire contract: the raw prompt is POSTed as the request
//! body and the raw completion comes back as the response body.

use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),
    #[error("gateway responded with status {0}")]
    Status(u16),
    #[error("invalid response")]
    InvalidResponse,
}

/// Anything that can complete a text prompt.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Client for a running completion gateway endpoint.
#[derive(Clone)]
pub struct HttpGateway {
    url: String,
    client: Client,
}

impl HttpGateway {
    /// Create a client targeting `url` (e.g. `http://127.0.0.1:3000/api/generate`).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Completer for HttpGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(url = %self.url, len = prompt.len(), "posting prompt");
        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(prompt.to_string())
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16()));
        }
        resp.text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))
    }
}
