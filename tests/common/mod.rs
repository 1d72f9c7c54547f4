//! Shared wiremock responders for the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::{Request, Respond, ResponseTemplate};

/// Answers chat completions by the first rule whose pattern occurs in the prompt
pub struct ChatResponder {
    rules: Vec<(&'static str, String)>,
}

impl ChatResponder {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn on(mut self, pattern: &'static str, reply: impl Into<String>) -> Self {
        self.rules.push((pattern, reply.into()));
        self
    }
}

pub fn prompt_of(request: &Request) -> String {
    let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
    body["messages"][0]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "model": "gpt-4o-mini",
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
    })
}

impl Respond for ChatResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let prompt = prompt_of(request);

        match self.rules.iter().find(|(pattern, _)| prompt.contains(pattern)) {
            Some((_, reply)) => ResponseTemplate::new(200).set_body_json(completion(reply)),
            None => ResponseTemplate::new(500).set_body_string(format!("no rule for: {prompt}")),
        }
    }
}

/// Embeds text as keyword presence over a tiny vocabulary
pub struct KeywordEmbedder;

pub const VOCABULARY: [&str; 3] = ["listen", "smile", "name"];

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    let mut vector: Vec<f32> = VOCABULARY
        .iter()
        .map(|word| if text.contains(word) { 1.0 } else { 0.0 })
        .collect();
    // keeps texts without any keyword off the zero vector
    vector.push(0.1);
    vector
}

impl Respond for KeywordEmbedder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let inputs: Vec<String> = body["input"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let data: Vec<Value> = inputs
            .iter()
            .enumerate()
            .map(|(index, text)| {
                json!({ "object": "embedding", "index": index, "embedding": keyword_vector(text) })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "model": "text-embedding-3-small",
            "data": data,
            "usage": { "prompt_tokens": 1, "total_tokens": 1 }
        }))
    }
}
