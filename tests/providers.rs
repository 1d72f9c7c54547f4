//! HTTP-level tests of the provider adapters against wiremock servers

mod common;

use std::sync::Arc;

use common::{completion, KeywordEmbedder};
use pmp_rag_api::domain::{
    DomainError, EmbeddingProvider, EmbeddingRequest, KnowledgeBaseProvider, LlmProvider,
    LlmRequest, PairwiseScorer, WebSearchProvider,
};
use pmp_rag_api::infrastructure::embedding::OpenAiEmbeddingProvider;
use pmp_rag_api::infrastructure::knowledge_base::{PineconeConfig, PineconeKnowledgeBase};
use pmp_rag_api::infrastructure::llm::{HttpClient, OpenAiProvider};
use pmp_rag_api::infrastructure::rerank::HttpCrossEncoder;
use pmp_rag_api::infrastructure::web_search::SearxngWebSearch;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn openai_chat_sends_key_and_settings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"check": true}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::with_base_url(HttpClient::new(), "sk-test", server.uri());
    let request = LlmRequest::builder().user("Is this on topic?").json_output().build();

    let response = provider.chat("gpt-4o-mini", request).await.unwrap();

    assert_eq!(response.content(), r#"{"check": true}"#);
}

#[tokio::test]
async fn openai_http_error_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::with_base_url(HttpClient::new(), "sk-test", server.uri());
    let result = provider
        .chat("gpt-4o", LlmRequest::builder().user("hi").build())
        .await;

    assert!(matches!(result, Err(DomainError::Provider { .. })));
}

#[tokio::test]
async fn openai_embeddings_keep_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(KeywordEmbedder)
        .mount(&server)
        .await;

    let embedder = OpenAiEmbeddingProvider::with_base_url(
        HttpClient::new(),
        "sk-test",
        "text-embedding-3-small",
        server.uri(),
    );
    let request = EmbeddingRequest::new(
        "text-embedding-3-small",
        vec!["Smile.".to_string(), "Be a good listener.".to_string()],
    );

    let vectors = embedder.embed(request).await.unwrap().into_vectors();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0][1], 1.0);
    assert_eq!(vectors[1][0], 1.0);
}

#[tokio::test]
async fn searxng_results_become_citation_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "carnegie listening"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "title": "Listening", "url": "https://example.org/l", "content": "Be a good listener" },
                { "title": "Smiling", "url": "https://example.org/s", "content": "Smile" },
                { "title": "Names", "url": "https://example.org/n", "content": "Remember names" }
            ]
        })))
        .mount(&server)
        .await;

    let search = SearxngWebSearch::new(HttpClient::new(), server.uri(), 2);
    let raw = search.search("carnegie listening").await.unwrap();

    let records: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 2);
    assert_eq!(records[0]["link"], "https://example.org/l");
    assert_eq!(records[0]["snippet"], "Be a good listener");
}

#[tokio::test]
async fn cross_encoder_scores_return_in_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rerank"))
        .and(body_partial_json(json!({ "query": "how to listen" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "index": 1, "score": 0.92 },
            { "index": 0, "score": 0.15 }
        ])))
        .mount(&server)
        .await;

    let scorer = HttpCrossEncoder::new(HttpClient::new(), server.uri());
    let scores = scorer
        .score("how to listen", &["Smile.".to_string(), "Listen.".to_string()])
        .await
        .unwrap();

    assert_eq!(scores, vec![0.15, 0.92]);
}

#[tokio::test]
async fn pinecone_query_reads_text_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(KeywordEmbedder)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("Api-Key", "pc-test"))
        .and(body_partial_json(json!({ "topK": 2, "includeMetadata": true, "namespace": "book" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [{
                "id": "p1",
                "score": 0.9,
                "metadata": {
                    "text": "Become genuinely interested in other people.",
                    "topic": "Six ways to make people like you",
                    "title": "Interest",
                    "principle": "Principle 1"
                }
            }]
        })))
        .mount(&server)
        .await;

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbeddingProvider::with_base_url(
        HttpClient::new(),
        "sk-test",
        "text-embedding-3-small",
        server.uri(),
    ));
    let kb = PineconeKnowledgeBase::new(
        HttpClient::new(),
        PineconeConfig::new(server.uri(), "pc-test").with_namespace("book"),
        embedder,
    );

    let documents = kb
        .similarity_search(&["interest".to_string()], 2)
        .await
        .unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].content, "Become genuinely interested in other people.");
    assert!(!documents[0].metadata.contains_key("text"));
    assert_eq!(documents[0].metadata_text("title").as_deref(), Some("Interest"));
}
