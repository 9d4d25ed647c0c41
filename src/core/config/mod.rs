pub mod app_config;
pub mod paths;
pub mod service;
pub mod validation;

pub use app_config::{
    AppConfig, CompletionConfig, EmbeddingConfig, OpenAiConfig, PineconeConfig, RetrievalConfig,
    SessionConfig, VectorBackendKind,
};
pub use paths::AppPaths;
pub use service::{ConfigError, ConfigService};
