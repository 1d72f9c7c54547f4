//! Retrieved documents and the resources projected from them

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;

/// Metadata keys every corpus document carries
pub const RESOURCE_KEYS: [&str; 3] = ["topic", "title", "principle"];

/// A retrieved unit of the corpus. Read-only once produced by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier for the document
    pub id: String,
    /// Document content text
    pub content: String,
    /// Metadata key-value pairs
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    /// Create a new document
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata to the document
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Metadata value rendered as text; strings are taken as-is
    pub fn metadata_text(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Caller-facing projection of a document's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub topic: String,
    pub title: String,
    pub principle: String,
}

impl Resource {
    /// Project `topic`, `title` and `principle` out of a document.
    ///
    /// Any other metadata is ignored; a missing key is an error.
    pub fn from_document(document: &Document) -> Result<Self, DomainError> {
        let field = |key: &str| {
            document.metadata_text(key).ok_or_else(|| {
                DomainError::validation(format!(
                    "Document '{}' has no '{}' metadata",
                    document.id, key
                ))
            })
        };

        Ok(Self {
            topic: field("topic")?,
            title: field("title")?,
            principle: field("principle")?,
        })
    }

    /// Project every document, preserving order
    pub fn from_documents(documents: &[Document]) -> Result<Vec<Self>, DomainError> {
        documents.iter().map(Self::from_document).collect()
    }
}
