use thiserror::Error;

use crate::rag::PromptError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to initialize model provider: {0}")]
    Provider(#[source] anyhow::Error),

    #[error("Invalid completion.prompt_template: {0}")]
    Prompt(#[source] PromptError),

    #[error("Failed to open vector store: {0}")]
    VectorStore(#[source] anyhow::Error),

    #[error("Vector store holds {stored}-dimensional vectors but embedding.dimensions is {configured}")]
    DimensionMismatch { stored: usize, configured: usize },

    #[error("Vector store was built with '{stored}' but embedding.model is '{configured}'; re-index before switching models")]
    EmbeddingModelMismatch { stored: String, configured: String },
}
