use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to a hosted embedding or completion API.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,
    #[error("provider unreachable: {0}")]
    Unreachable(String),
    #[error("credentials rejected by provider")]
    Unauthorized,
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => ProviderError::Unauthorized,
            429 => ProviderError::RateLimited,
            code => ProviderError::Status {
                status: code,
                message: body,
            },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::from_status(status, err.to_string())
        } else {
            ProviderError::Unreachable(err.to_string())
        }
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier, used in logs and status.
    fn model(&self) -> &str;

    /// Embeds every input, preserving order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn model(&self) -> &str;

    /// Generates a reply for a fully rendered prompt.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError>;
}
