//! SearXNG metasearch backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DomainError, WebSearchProvider};
use crate::infrastructure::llm::HttpClientTrait;

#[derive(Debug)]
pub struct SearxngWebSearch<C: HttpClientTrait> {
    client: C,
    base_url: String,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Record shape handed to the rest of the pipeline
#[derive(Debug, Serialize)]
struct SearchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    snippet: String,
}

impl<C: HttpClientTrait> SearxngWebSearch<C> {
    pub fn new(client: C, base_url: impl Into<String>, max_results: usize) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results,
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> WebSearchProvider for SearxngWebSearch<C> {
    async fn search(&self, query: &str) -> Result<String, DomainError> {
        let url = format!("{}/search", self.base_url);
        let params = [("q", query), ("format", "json")];

        let json = self
            .client
            .get_json(&url, vec![("Accept", "application/json")], &params)
            .await?;

        let response: SearxngResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("searxng", format!("Failed to parse response: {}", e))
        })?;

        let records: Vec<SearchRecord> = response
            .results
            .into_iter()
            .take(self.max_results)
            .map(|r| SearchRecord {
                title: r.title,
                link: r.url,
                snippet: r.content.unwrap_or_default(),
            })
            .collect();

        debug!(query = %query, results = records.len(), "Web search completed");

        serde_json::to_string(&records)
            .map_err(|e| DomainError::internal(format!("Failed to encode search results: {}", e)))
    }

    fn provider_name(&self) -> &'static str {
        "searxng"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::web_search::parse_search_results;
    use crate::infrastructure::llm::MockHttpClient;
    use serde_json::json;

    const URL: &str = "http://searx:8888/search";

    #[tokio::test]
    async fn test_results_map_to_citation_records() {
        let response = json!({
            "query": "dale carnegie",
            "results": [
                { "title": "Carnegie", "url": "https://example.org/c", "content": "Author" },
                { "url": "https://example.org/untitled", "content": "No title" },
                { "title": "Third", "url": "https://example.org/3", "content": "Dropped" }
            ]
        });
        let search = SearxngWebSearch::new(MockHttpClient::new().with_response(URL, response), "http://searx:8888", 2);

        let raw = search.search("dale carnegie").await.unwrap();
        let citations = parse_search_results(&raw).unwrap();

        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].title, "Carnegie");
        assert_eq!(citations[0].link, "https://example.org/c");
        assert_eq!(citations[1].title, "Untitled");
    }

    #[tokio::test]
    async fn test_search_error() {
        let search = SearxngWebSearch::new(MockHttpClient::new().with_error(URL, "down"), "http://searx:8888", 5);
        assert!(search.search("q").await.is_err());
    }
}
