use thiserror::Error;

use super::store::StoreError;
use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding request failed: {0}")]
    Embedding(#[source] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("embedding has dimension {actual}, vector store expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("no relevant passages found")]
    NoResults,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Why a turn was aborted. The transcript is never touched when this is returned.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl TurnError {
    pub fn kind(&self) -> &'static str {
        match self {
            TurnError::Retrieval(_) => "retrieval_failure",
            TurnError::Generation(_) => "generation_failure",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TurnError::Retrieval(RetrievalError::Embedding(ProviderError::Timeout))
                | TurnError::Retrieval(RetrievalError::Store(StoreError::Timeout))
                | TurnError::Generation(GenerationError::Provider(ProviderError::Timeout))
        )
    }
}
