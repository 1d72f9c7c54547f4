//! Knowledge base provider implementations

mod factory;
mod in_memory;
mod pinecone;

pub use factory::KnowledgeBaseFactory;
pub use in_memory::InMemoryKnowledgeBase;
pub use pinecone::{PineconeConfig, PineconeKnowledgeBase};
