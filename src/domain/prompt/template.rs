//! Prompt template parsing and rendering
//!
//! Supports variable syntax: `${var:variable-name:default-value}`
//! - `${var:name}` - Required variable, error if not provided
//! - `${var:name:default}` - Optional variable with default value
//!
//! Rendering is single-pass, so values that themselves contain `${var:...}`
//! (user queries, retrieved documents) are inserted verbatim.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

/// Regex to match variable patterns: ${var:name} or ${var:name:default}
static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{var:([a-zA-Z0-9][-_a-zA-Z0-9]*)(?::([^}]*))?\}").unwrap()
});

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },
}

/// A parsed variable from a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVariable {
    pub name: String,
    pub default: Option<String>,
}

impl PromptVariable {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
    variables: Vec<PromptVariable>,
}

impl PromptTemplate {
    /// Parse a template string and extract its variables
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut variables = Vec::new();
        let mut seen = HashSet::new();

        for cap in VARIABLE_PATTERN.captures_iter(&content) {
            let name = cap[1].to_string();

            if !seen.insert(name.clone()) {
                continue;
            }

            variables.push(PromptVariable {
                name,
                default: cap.get(2).map(|m| m.as_str().to_string()),
            });
        }

        Self { content, variables }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn variables(&self) -> &[PromptVariable] {
        &self.variables
    }

    /// Render the template with provided values
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String, TemplateError> {
        if let Some(missing) = self
            .variables
            .iter()
            .find(|v| v.is_required() && !values.contains_key(v.name.as_str()))
        {
            return Err(TemplateError::MissingVariable {
                name: missing.name.clone(),
            });
        }

        let rendered = VARIABLE_PATTERN.replace_all(&self.content, |cap: &Captures<'_>| {
            let name = &cap[1];
            values
                .get(name)
                .map(|v| v.to_string())
                .or_else(|| cap.get(2).map(|m| m.as_str().to_string()))
                .unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_parse_no_variables() {
        let template = PromptTemplate::new("Hello, world!");
        assert!(template.variables().is_empty());
    }

    #[test]
    fn test_parse_variable_with_default() {
        let template = PromptTemplate::new("Hello, ${var:name:World}!");
        let var = &template.variables()[0];

        assert_eq!(var.name, "name");
        assert!(!var.is_required());
        assert_eq!(var.default, Some("World".to_string()));
    }

    #[test]
    fn test_parse_duplicate_variables() {
        let template = PromptTemplate::new("${var:query} and ${var:query} again");
        assert_eq!(template.variables().len(), 1);
    }

    #[test]
    fn test_render_required_variable() {
        let template = PromptTemplate::new("Query: ${var:query}\nAnswer:");
        let result = template.render(&values(&[("query", "What is rapport?")])).unwrap();

        assert_eq!(result, "Query: What is rapport?\nAnswer:");
    }

    #[test]
    fn test_render_missing_required_variable() {
        let template = PromptTemplate::new("Hello, ${var:name}!");
        let result = template.render(&HashMap::new());

        assert_eq!(
            result,
            Err(TemplateError::MissingVariable {
                name: "name".to_string()
            })
        );
    }

    #[test]
    fn test_render_with_default() {
        let template = PromptTemplate::new("Size: ${var:chunk_size:500}");
        assert_eq!(template.render(&HashMap::new()).unwrap(), "Size: 500");
    }

    #[test]
    fn test_render_does_not_expand_inserted_values() {
        let template = PromptTemplate::new("Q: ${var:query} C: ${var:context}");
        let result = template
            .render(&values(&[("query", "${var:context}"), ("context", "ctx")]))
            .unwrap();

        assert_eq!(result, "Q: ${var:context} C: ctx");
    }
}
