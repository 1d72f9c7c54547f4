use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::{CragConfig, DomainError, RetrievalStrategyKind};
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub reranker: RerankerConfig,
    #[serde(default)]
    pub web_search: WebSearchConfig,
    #[serde(default)]
    pub pipelines: PipelinesConfig,
    #[serde(default)]
    pub router: RouterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Chat completion endpoint used by every prompt chain
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Model for generation and classification
    pub model: String,
    /// Cheaper model for rewriting, scoring and refinement
    pub fast_model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VectorStoreConfig {
    /// Corpus loaded from a JSON file and embedded at startup
    InMemory { corpus_path: PathBuf },
    Pinecone {
        /// Index host, e.g. `https://my-index-abc123.svc.pinecone.io`
        index_host: String,
        api_key_env: String,
        #[serde(default)]
        namespace: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RerankerConfig {
    pub enabled: bool,
    /// Base URL of a `/rerank` cross-encoder endpoint
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub base_url: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelinesConfig {
    /// Per-request deadline; unset means unbounded
    pub request_timeout_secs: Option<u64>,
    pub adaptive: AdaptiveConfig,
    pub crag: CragConfig,
    pub self_rag: SelfRagConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    pub k: usize,
    pub rerank: bool,
    /// HyDE hypothetical document length in characters
    pub hyde_chunk_size: usize,
    /// Category label to strategy, e.g. `factual = "rewriting"`
    pub strategies: HashMap<String, RetrievalStrategyKind>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelfRagConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub enabled: bool,
    /// What the corpus covers; questions outside it take the fallback path
    pub topic: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o".to_string(),
            fast_model: "gpt-4o-mini".to_string(),
            temperature: 0.8,
            top_p: 0.5,
            timeout_secs: 60,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "text-embedding-3-small".to_string(),
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self::InMemory {
            corpus_path: PathBuf::from("data/corpus.json"),
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8081".to_string(),
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            max_results: 5,
        }
    }
}

impl Default for PipelinesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: Some(120),
            adaptive: AdaptiveConfig::default(),
            crag: CragConfig::default(),
            self_rag: SelfRagConfig::default(),
        }
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            k: 5,
            rerank: true,
            hyde_chunk_size: 500,
            strategies: HashMap::from([
                ("factual".to_string(), RetrievalStrategyKind::Rewriting),
                ("analytical".to_string(), RetrievalStrategyKind::Fusion),
            ]),
        }
    }
}

impl Default for SelfRagConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            topic: "how to influence others by improving interpersonal relationships: being \
                    genuinely interested in others, listening attentively and showing genuine \
                    appreciation"
                .to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Read a secret from the environment variable named in configuration
pub fn secret_from_env(var: &str) -> Result<String, DomainError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DomainError::configuration(format!(
            "Environment variable '{}' is not set",
            var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.temperature, 0.8);
        assert_eq!(config.llm.top_p, 0.5);
        assert_eq!(config.pipelines.crag.correct_threshold, 0.7);
        assert_eq!(config.pipelines.crag.incorrect_threshold, 0.3);
        assert_eq!(config.pipelines.self_rag.top_k, 3);
        assert_eq!(config.pipelines.adaptive.hyde_chunk_size, 500);
        assert!(matches!(config.vector_store, VectorStoreConfig::InMemory { .. }));
    }

    #[test]
    fn test_deserialize_partial_document() {
        let source = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                host = "127.0.0.1"
                port = 9000

                [vector_store]
                type = "pinecone"
                index_host = "https://idx.svc.pinecone.io"
                api_key_env = "PINECONE_API_KEY"

                [pipelines.crag]
                k = 3

                [pipelines.adaptive.strategies]
                factual = "hyde"
                analytical = "decomposition"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: AppConfig = source.try_deserialize().unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pipelines.crag.k, 3);
        assert_eq!(config.pipelines.crag.correct_threshold, 0.7);
        assert_eq!(
            config.pipelines.adaptive.strategies.get("factual"),
            Some(&RetrievalStrategyKind::Hyde)
        );
        assert!(matches!(
            config.vector_store,
            VectorStoreConfig::Pinecone { namespace: None, .. }
        ));
    }

    #[test]
    fn test_secret_from_env_missing() {
        let err = secret_from_env("PMP_RAG_TEST_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
