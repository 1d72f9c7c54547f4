//! PMP RAG API
//!
//! Question answering over a fixed knowledge corpus with three pipelines:
//! - Adaptive RAG: query classification, per-category retrieval strategy and
//!   optional cross-encoder rerank
//! - CRAG: relevance-scored retrieval with web search correction
//! - Self-RAG: per-context candidates critiqued for support and utility
//!
//! A topical router sends off-topic questions to a plain LLM answer.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use infrastructure::services::{RagContext, RagService};

use std::sync::Arc;

use anyhow::Context;

use api::state::AppState;

/// Connect every collaborator and wire the pipelines
pub async fn create_rag_service(config: &AppConfig) -> anyhow::Result<RagService> {
    let context = RagContext::from_config(config)
        .await
        .context("Failed to initialize RAG collaborators")?;

    RagService::new(&context, config).context("Invalid pipeline configuration")
}

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let rag_service = create_rag_service(config).await?;

    Ok(AppState::new(Arc::new(rag_service)))
}
