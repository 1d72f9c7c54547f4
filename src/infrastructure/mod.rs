//! Infrastructure layer - External service implementations and pipelines

pub mod adaptive;
pub mod crag;
pub mod embedding;
pub mod knowledge_base;
pub mod llm;
pub mod observability;
pub mod rerank;
pub mod routing;
pub mod self_rag;
pub mod services;
pub mod web_search;
