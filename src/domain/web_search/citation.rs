//! Source citations parsed from raw web search output

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

const UNTITLED: &str = "Untitled";

/// A `(title, link)` pair cited under a CRAG answer. `link` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub link: String,
}

impl SourceCitation {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }

    /// `title: link`, or just the title when there is no link
    pub fn render(&self) -> String {
        if self.link.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.title, self.link)
        }
    }
}

/// Render citations one per line
pub fn render_citations(citations: &[SourceCitation]) -> String {
    citations
        .iter()
        .map(SourceCitation::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a JSON array of `{title, link}` records.
///
/// Missing titles become "Untitled" and missing links become empty. Anything
/// that is not an array of objects is `MalformedCitationData`.
pub fn parse_search_results(raw: &str) -> Result<Vec<SourceCitation>, DomainError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| DomainError::malformed_citations(format!("not JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(DomainError::malformed_citations("expected a JSON array"));
    };

    items
        .iter()
        .map(|item| {
            let object = item
                .as_object()
                .ok_or_else(|| DomainError::malformed_citations("expected an array of objects"))?;

            let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

            Ok(SourceCitation {
                title: text("title").unwrap_or_else(|| UNTITLED.to_string()),
                link: text("link").unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(SourceCitation::new("Doc", "").render(), "Doc");
        assert_eq!(
            SourceCitation::new("Doc", "https://example.com").render(),
            "Doc: https://example.com"
        );
    }

    #[test]
    fn test_render_citations() {
        let citations = vec![
            SourceCitation::new("Retrieved document", ""),
            SourceCitation::new("Web", "https://w.example"),
        ];

        assert_eq!(
            render_citations(&citations),
            "Retrieved document\nWeb: https://w.example"
        );
    }

    #[test]
    fn test_parse_search_results() {
        let raw = r#"[
            {"title": "How to Win Friends", "link": "https://a.example", "snippet": "..."},
            {"link": "https://b.example"},
            {"title": "No link"}
        ]"#;

        let citations = parse_search_results(raw).unwrap();

        assert_eq!(
            citations,
            vec![
                SourceCitation::new("How to Win Friends", "https://a.example"),
                SourceCitation::new("Untitled", "https://b.example"),
                SourceCitation::new("No link", ""),
            ]
        );
    }

    #[test]
    fn test_parse_non_json() {
        let err = parse_search_results("snippet: some text, title: x").unwrap_err();
        assert!(matches!(err, DomainError::MalformedCitationData { .. }));
    }

    #[test]
    fn test_parse_non_array() {
        let err = parse_search_results(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, DomainError::MalformedCitationData { .. }));
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_search_results("[]").unwrap().is_empty());
    }
}
