pub mod openai;
pub mod provider;
pub mod types;

pub use openai::{OpenAiClient, OpenAiCompletion, OpenAiEmbeddings};
pub use provider::{CompletionProvider, EmbeddingProvider, ProviderError};
pub use types::{ChatMessage, ChatRequest};
