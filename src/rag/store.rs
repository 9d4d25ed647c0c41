//! The similarity-search contract both memory backends satisfy.
//!
//! The local backend is `SqliteMemoryStore` in the `sqlite` module; the
//! managed remote backend is `PineconeStore` in the `pinecone` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A passage returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub text: String,
    /// Similarity score (higher = better).
    pub score: f32,
    /// Where the passage came from, when the store records it.
    pub source: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vector store unreachable: {0}")]
    Unavailable(String),
    #[error("vector store query failed: {0}")]
    Query(String),
    #[error("vector store rejected credentials")]
    Unauthorized,
    #[error("vector store timed out")]
    Timeout,
    #[error("stored vectors have dimension {stored}, query has {query}")]
    DimensionMismatch { stored: usize, query: usize },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::Io(e) => StoreError::Unavailable(e.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connect() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Query(err.to_string())
        }
    }
}

#[async_trait]
pub trait VectorStoreBackend: Send + Sync {
    /// Backend name (e.g. "local", "pinecone").
    fn name(&self) -> &str;

    /// Top `k` passages for the query embedding, best first.
    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredPassage>, StoreError>;

    /// Dimension of the stored vectors, `None` while the store is empty
    /// or does not report it.
    async fn dimension(&self) -> Result<Option<usize>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
