//! OpenAI-compatible HTTP client for embeddings and chat completions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::provider::{CompletionProvider, EmbeddingProvider, ProviderError};
use super::types::{ChatMessage, ChatRequest};
use crate::core::config::{CompletionConfig, EmbeddingConfig, OpenAiConfig};

/// Shared transport: base URL, bearer credential and a client with a
/// request timeout. Cheap to clone.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            client,
        })
    }

    async fn post_json<T>(&self, path: &str, body: &serde_json::Value) -> Result<T, ProviderError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, text));
        }

        res.json::<T>().await.map_err(ProviderError::from)
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct OpenAiCompletion {
    client: OpenAiClient,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiCompletion {
    pub fn new(client: OpenAiClient, config: &CompletionConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletion {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(temperature)
            .with_max_tokens(self.max_tokens);

        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

        let payload: ChatCompletionResponse =
            self.client.post_json("/chat/completions", &body).await?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("no choices in completion".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(content)
    }
}

#[derive(Clone)]
pub struct OpenAiEmbeddings {
    client: OpenAiClient,
    model: String,
    dimensions: Option<usize>,
}

impl OpenAiEmbeddings {
    pub fn new(client: OpenAiClient, config: &EmbeddingConfig) -> Self {
        let dimensions = config
            .supports_dimension_request()
            .then_some(config.dimensions);
        Self {
            client,
            model: config.model.clone(),
            dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut body = json!({
            "model": self.model,
            "input": inputs,
        });
        if let (Some(dims), Some(obj)) = (self.dimensions, body.as_object_mut()) {
            obj.insert("dimensions".to_string(), json!(dims));
        }

        let mut payload: EmbeddingResponse = self.client.post_json("/embeddings", &body).await?;
        if payload.data.len() != inputs.len() {
            return Err(ProviderError::Malformed(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                payload.data.len()
            )));
        }

        payload.data.sort_by_key(|item| item.index);
        Ok(payload.data.into_iter().map(|item| item.embedding).collect())
    }
}
