//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `VectorStoreBackend`: the similarity-search contract, with a local
//!   SQLite store and a managed Pinecone index behind it
//! - `VectorRetriever`: embeds a question and fetches the top-k passages
//! - `PromptTemplate`: renders persona, context and question into one prompt
//! - `RagOrchestrator`: runs retrieve → render → complete for one question

mod error;
mod orchestrator;
mod pinecone;
mod prompt;
mod retriever;
mod sqlite;
mod store;

pub use error::{GenerationError, RetrievalError, TurnError};
pub use orchestrator::{join_context, OrchestratorSettings, Question, RagOrchestrator};
pub use pinecone::PineconeStore;
pub use prompt::{PromptError, PromptTemplate, LAVENDER_PERSONA};
pub use retriever::{PassageRetriever, VectorRetriever};
pub use sqlite::{SqliteMemoryStore, StoredChunk};
pub use store::{ScoredPassage, StoreError, VectorStoreBackend};
