//! Infrastructure services

mod context;
mod rag_service;

pub use context::RagContext;
pub use rag_service::{
    PipelineDefaults, PipelineDetails, PipelineKind, RagService, SearchResponse, FALLBACK_PROMPT,
    OUT_OF_DOMAIN_PREFIX,
};
