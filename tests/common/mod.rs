#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use serde_json::Value;

use lavender_garden::core::config::AppConfig;
use lavender_garden::llm::{CompletionProvider, ProviderError};
use lavender_garden::rag::{
    OrchestratorSettings, PassageRetriever, PromptTemplate, RagOrchestrator, RetrievalError,
    ScoredPassage, StoreError, VectorStoreBackend,
};
use lavender_garden::state::AppState;

pub struct FixedRetriever {
    pub passages: Vec<String>,
}

#[async_trait]
impl PassageRetriever for FixedRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<ScoredPassage>, RetrievalError> {
        Ok(self
            .passages
            .iter()
            .enumerate()
            .map(|(i, text)| ScoredPassage {
                text: text.clone(),
                score: 1.0 - i as f32 * 0.1,
                source: None,
            })
            .collect())
    }
}

pub struct UnreachableRetriever;

#[async_trait]
impl PassageRetriever for UnreachableRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Vec<ScoredPassage>, RetrievalError> {
        Err(StoreError::Unavailable("connection refused".to_string()).into())
    }
}

/// Replies with a fixed answer and counts calls.
pub struct ScriptedCompletion {
    pub reply: String,
    pub calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub struct TimingOutCompletion;

#[async_trait]
impl CompletionProvider for TimingOutCompletion {
    fn model(&self) -> &str {
        "slow"
    }

    async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, ProviderError> {
        Err(ProviderError::Timeout)
    }
}

pub struct StaticStore;

#[async_trait]
impl VectorStoreBackend for StaticStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn similarity_search(
        &self,
        _query_embedding: &[f32],
        _k: usize,
    ) -> Result<Vec<ScoredPassage>, StoreError> {
        Ok(Vec::new())
    }

    async fn dimension(&self) -> Result<Option<usize>, StoreError> {
        Ok(None)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

pub fn build_state(
    config: AppConfig,
    retriever: Arc<dyn PassageRetriever>,
    completion: Arc<dyn CompletionProvider>,
) -> Arc<AppState> {
    let orchestrator = Arc::new(RagOrchestrator::new(
        retriever,
        completion,
        PromptTemplate::lavender(),
        OrchestratorSettings {
            temperature: config.completion.temperature,
            allow_empty_context: config.retrieval.allow_empty_context,
        },
    ));
    AppState::from_parts(config, Arc::new(StaticStore), orchestrator)
}

pub fn garden_state(reply: &str) -> Arc<AppState> {
    build_state(
        AppConfig::default(),
        Arc::new(FixedRetriever {
            passages: vec![
                "Roses bloom in June.".to_string(),
                "Lavender calms the mind.".to_string(),
            ],
        }),
        Arc::new(ScriptedCompletion::new(reply)),
    )
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}
