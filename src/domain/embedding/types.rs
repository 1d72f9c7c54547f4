//! Embedding request and response types

use serde::{Deserialize, Serialize};

/// Request to embed a batch of texts with one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
        }
    }

    /// Create a request for a single text
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(model, vec![text.into()])
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn inputs(&self) -> &[String] {
        &self.input
    }
}

/// Embedding vectors, one per input and in input order
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResponse {
    model: String,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingResponse {
    pub fn new(model: impl Into<String>, vectors: Vec<Vec<f32>>) -> Self {
        Self {
            model: model.into(),
            vectors,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn into_vectors(self) -> Vec<Vec<f32>> {
        self.vectors
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_request() {
        let request = EmbeddingRequest::single("text-embedding-3-small", "test");

        assert_eq!(request.model(), "text-embedding-3-small");
        assert_eq!(request.inputs(), ["test".to_string()]);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let similarity = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((similarity - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let similarity = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(similarity.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
