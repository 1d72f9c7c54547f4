//! Knowledge Base domain - similarity search over the answer corpus

mod document;
mod provider;

pub use document::{Document, Resource, RESOURCE_KEYS};
pub use provider::KnowledgeBaseProvider;

#[cfg(test)]
pub use provider::mock::MockKnowledgeBaseProvider;
