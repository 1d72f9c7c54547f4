//! CRAG (Corrective RAG) domain
//!
//! Retrieved documents are scored for relevance and the best score decides
//! whether the corpus, the web, or both supply the knowledge for generation.

mod config;
mod pipeline;
mod scorer;

pub use config::{CragAction, CragConfig};
pub use pipeline::{
    best_document, retrieved_citation, CragAnswer, CragAssessment, RETRIEVED_DOCUMENT_TITLE,
};
pub use scorer::{DocumentScorer, ScoredDocument};

#[cfg(test)]
pub use scorer::mock::MockDocumentScorer;
