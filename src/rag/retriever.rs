use std::sync::Arc;

use async_trait::async_trait;

use super::error::RetrievalError;
use super::store::{ScoredPassage, VectorStoreBackend};
use crate::llm::EmbeddingProvider;

/// Given a query string, return the top-k relevant passages.
#[async_trait]
pub trait PassageRetriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<ScoredPassage>, RetrievalError>;
}

/// Embeds the query and searches a vector store backend.
pub struct VectorRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreBackend>,
    top_k: usize,
    dimensions: usize,
}

impl VectorRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreBackend>,
        top_k: usize,
        dimensions: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
            dimensions,
        }
    }
}

#[async_trait]
impl PassageRetriever for VectorRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<ScoredPassage>, RetrievalError> {
        let mut vectors = self
            .embedder
            .embed(&[query.to_string()])
            .await
            .map_err(RetrievalError::Embedding)?;

        let embedding = vectors.pop().ok_or_else(|| {
            RetrievalError::Embedding(crate::llm::ProviderError::EmptyResponse)
        })?;
        if embedding.len() != self.dimensions {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        let mut passages = self
            .store
            .similarity_search(&embedding, self.top_k)
            .await?;
        passages.truncate(self.top_k);

        tracing::debug!(
            "Retrieved {} passages from {} (top_k={})",
            passages.len(),
            self.store.name(),
            self.top_k
        );
        Ok(passages)
    }
}
