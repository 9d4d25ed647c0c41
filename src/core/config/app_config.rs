//! Typed configuration, built once at startup and shared read-only.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    pub embedding: EmbeddingConfig,
    pub completion: CompletionConfig,
    pub retrieval: RetrievalConfig,
    pub vector_store: VectorStoreConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    /// Must equal the dimension the vector store was built with.
    pub dimensions: usize,
}

impl EmbeddingConfig {
    /// `text-embedding-3-*` models can be shortened server-side, older ones cannot.
    pub fn supports_dimension_request(&self) -> bool {
        self.model.starts_with("text-embedding-3")
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Custom prompt with `{context}` and `{question}` slots; the Lavender
    /// persona prompt when unset.
    pub prompt_template: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: None,
            prompt_template: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// When false an empty search result fails the turn instead of
    /// answering without context.
    pub allow_empty_context: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            allow_empty_context: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorBackendKind {
    #[default]
    Local,
    Pinecone,
}

impl VectorBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorBackendKind::Local => "local",
            VectorBackendKind::Pinecone => "pinecone",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorBackendKind,
    pub local: LocalStoreConfig,
    pub pinecone: PineconeConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalStoreConfig {
    /// Defaults to `<data_dir>/lavender_memory.db`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    pub index_host: String,
    pub api_key: Option<String>,
    pub namespace: Option<String>,
    pub text_key: String,
    pub api_version: String,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            index_host: String::new(),
            api_key: None,
            namespace: None,
            text_key: "text".to_string(),
            api_version: "2024-07".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum retained user/assistant pairs; 0 keeps everything.
    pub max_turns: usize,
    /// Idle sessions older than this are discarded; 0 disables pruning.
    pub idle_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: 100,
            idle_ttl_secs: 3600,
        }
    }
}
