mod app_config;

pub use app_config::{
    secret_from_env, AdaptiveConfig, AppConfig, EmbeddingConfig, LlmConfig, LogFormat,
    LoggingConfig, PipelinesConfig, RerankerConfig, RouterConfig, SelfRagConfig, ServerConfig,
    VectorStoreConfig, WebSearchConfig,
};
