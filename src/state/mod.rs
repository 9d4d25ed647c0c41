use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{AppConfig, AppPaths, VectorBackendKind};
use crate::llm::{OpenAiClient, OpenAiCompletion, OpenAiEmbeddings};
use crate::rag::{
    OrchestratorSettings, PineconeStore, PromptTemplate, RagOrchestrator, SqliteMemoryStore,
    VectorRetriever, VectorStoreBackend,
};
use crate::session::SessionRegistry;

pub mod error;

use error::InitializationError;

/// Application state shared across all routes and background tasks.
///
/// Contains references to:
/// - The configuration, read-only after startup
/// - The vector store backend selected by configuration
/// - The orchestrator every session answers through
/// - The registry of live chat sessions
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn VectorStoreBackend>,
    pub orchestrator: Arc<RagOrchestrator>,
    pub sessions: SessionRegistry,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Parsing the prompt template and building the OpenAI-compatible
    ///    embedding and completion clients
    /// 2. Opening the configured vector store backend
    /// 3. Checking the store against the configured embedding model
    /// 4. Wiring retriever, prompt template and orchestrator together
    pub async fn initialize(
        paths: &AppPaths,
        config: AppConfig,
    ) -> Result<Arc<Self>, InitializationError> {
        let template = match &config.completion.prompt_template {
            Some(raw) => PromptTemplate::new(raw).map_err(InitializationError::Prompt)?,
            None => PromptTemplate::lavender(),
        };

        let client = OpenAiClient::new(&config.openai)
            .map_err(|e| InitializationError::Provider(e.into()))?;
        if config.openai.api_key.is_none() {
            tracing::warn!("No OpenAI API key configured; provider calls will be rejected");
        }

        let embedder = Arc::new(OpenAiEmbeddings::new(client.clone(), &config.embedding));
        let completion = Arc::new(OpenAiCompletion::new(client, &config.completion));

        let store = open_store(paths, &config).await?;
        verify_dimension(store.as_ref(), config.embedding.dimensions).await?;

        let retriever = Arc::new(VectorRetriever::new(
            embedder,
            store.clone(),
            config.retrieval.top_k,
            config.embedding.dimensions,
        ));

        let orchestrator = Arc::new(RagOrchestrator::new(
            retriever,
            completion,
            template,
            OrchestratorSettings {
                temperature: config.completion.temperature,
                allow_empty_context: config.retrieval.allow_empty_context,
            },
        ));

        tracing::info!(
            "Using {} vector store, embeddings {} ({}d), completions {}",
            config.vector_store.backend.as_str(),
            config.embedding.model,
            config.embedding.dimensions,
            config.completion.model
        );

        Ok(Self::from_parts(config, store, orchestrator))
    }

    /// Assembles state from already-built parts.
    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn VectorStoreBackend>,
        orchestrator: Arc<RagOrchestrator>,
    ) -> Arc<Self> {
        let sessions = SessionRegistry::new(orchestrator.clone(), config.session.max_turns);
        Arc::new(AppState {
            config: Arc::new(config),
            store,
            orchestrator,
            sessions,
            started_at: Utc::now(),
        })
    }
}

async fn open_store(
    paths: &AppPaths,
    config: &AppConfig,
) -> Result<Arc<dyn VectorStoreBackend>, InitializationError> {
    match config.vector_store.backend {
        VectorBackendKind::Local => {
            let path = config
                .vector_store
                .local
                .path
                .clone()
                .unwrap_or_else(|| paths.memory_db_path.clone());
            let store = SqliteMemoryStore::open(&path)
                .await
                .map_err(|e| InitializationError::VectorStore(e.into()))?;

            let stored_model = store
                .embedding_model()
                .await
                .map_err(|e| InitializationError::VectorStore(e.into()))?;
            if let Some(stored) = stored_model {
                if stored != config.embedding.model {
                    return Err(InitializationError::EmbeddingModelMismatch {
                        stored,
                        configured: config.embedding.model.clone(),
                    });
                }
            }

            tracing::info!("Opened local memory store at {}", path.display());
            Ok(Arc::new(store))
        }
        VectorBackendKind::Pinecone => {
            let timeout = std::time::Duration::from_secs(config.openai.request_timeout_secs);
            let store = PineconeStore::new(&config.vector_store.pinecone, timeout)
                .map_err(|e| InitializationError::VectorStore(e.into()))?;
            Ok(Arc::new(store))
        }
    }
}

async fn verify_dimension(
    store: &dyn VectorStoreBackend,
    configured: usize,
) -> Result<(), InitializationError> {
    match store.dimension().await {
        Ok(Some(stored)) if stored != configured => {
            Err(InitializationError::DimensionMismatch { stored, configured })
        }
        Ok(_) => Ok(()),
        Err(err) => {
            // An unreachable remote index surfaces per turn instead.
            tracing::warn!("Could not read vector store dimension: {}", err);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::{PromptError, StoredChunk};

    fn local_config(dir: &std::path::Path, dimensions: usize) -> (AppPaths, AppConfig) {
        let paths = AppPaths::with_data_dir(dir.to_path_buf(), dir.to_path_buf());
        let mut config = AppConfig::default();
        config.embedding.dimensions = dimensions;
        (paths, config)
    }

    async fn seed(paths: &AppPaths, model: &str, embedding: Vec<f32>) {
        let store = SqliteMemoryStore::open(&paths.memory_db_path).await.unwrap();
        store.set_embedding_model(model).await.unwrap();
        store
            .insert(
                StoredChunk {
                    chunk_id: "c1".to_string(),
                    content: "lavender".to_string(),
                    source: String::new(),
                    metadata: None,
                },
                embedding,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn initializes_with_empty_local_store() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, config) = local_config(dir.path(), 1536);

        let state = AppState::initialize(&paths, config).await.unwrap();
        assert_eq!(state.store.name(), "local");
        assert!(state.sessions.is_empty());
        assert_eq!(state.orchestrator.completion_model(), "gpt-4o");
    }

    #[tokio::test]
    async fn rejects_template_without_context_slot() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, mut config) = local_config(dir.path(), 1536);
        config.completion.prompt_template = Some("Answer {question}".to_string());

        let err = AppState::initialize(&paths, config).await.err().unwrap();
        assert!(matches!(
            err,
            InitializationError::Prompt(PromptError::MissingSlot("context"))
        ));
    }

    #[tokio::test]
    async fn accepts_custom_template() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, mut config) = local_config(dir.path(), 1536);
        config.completion.prompt_template =
            Some("{{garden}} notes:\n{context}\nAsk: {question}".to_string());

        assert!(AppState::initialize(&paths, config).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_store_with_other_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, config) = local_config(dir.path(), 4);
        seed(&paths, "text-embedding-ada-002", vec![0.1, 0.2, 0.3]).await;

        let err = AppState::initialize(&paths, config).await.err().unwrap();
        assert!(matches!(
            err,
            InitializationError::DimensionMismatch { stored: 3, configured: 4 }
        ));
    }

    #[tokio::test]
    async fn rejects_store_built_with_other_model() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, config) = local_config(dir.path(), 3);
        seed(&paths, "text-embedding-3-large", vec![0.1, 0.2, 0.3]).await;

        let err = AppState::initialize(&paths, config).await.err().unwrap();
        assert!(matches!(err, InitializationError::EmbeddingModelMismatch { .. }));
    }
}
