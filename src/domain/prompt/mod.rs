//! Prompt templates and the prompt -> model -> parser chain

mod chain;
mod template;

pub use chain::{ModelSettings, PromptChain, extract_json};
pub use template::{PromptTemplate, PromptVariable, TemplateError};
