//! Cross-encoder served over HTTP (`POST /rerank`, text-embeddings-inference style)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{DomainError, PairwiseScorer};
use crate::infrastructure::llm::HttpClientTrait;

#[derive(Debug)]
pub struct HttpCrossEncoder<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RerankHit {
    index: usize,
    score: f32,
}

impl<C: HttpClientTrait> HttpCrossEncoder<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn rerank_url(&self) -> String {
        format!("{}/rerank", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> PairwiseScorer for HttpCrossEncoder<C> {
    async fn score(&self, query: &str, texts: &[String]) -> Result<Vec<f32>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({ "query": query, "texts": texts });
        let headers = vec![("Content-Type", "application/json")];
        let json = self.client.post_json(&self.rerank_url(), headers, &body).await?;

        let hits: Vec<RerankHit> = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("cross_encoder", format!("Failed to parse response: {}", e))
        })?;

        // The endpoint sorts by score; put scores back into input order
        let mut scores = vec![f32::NAN; texts.len()];
        for hit in hits {
            let slot = scores.get_mut(hit.index).ok_or_else(|| {
                DomainError::provider(
                    "cross_encoder",
                    format!("Score index {} out of range for {} texts", hit.index, texts.len()),
                )
            })?;
            *slot = hit.score;
        }

        if scores.iter().any(|s| s.is_nan()) {
            return Err(DomainError::provider(
                "cross_encoder",
                "Response did not score every text",
            ));
        }

        Ok(scores)
    }

    fn scorer_name(&self) -> &'static str {
        "http_cross_encoder"
    }
}
