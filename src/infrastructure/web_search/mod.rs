//! Web search provider implementations

mod searxng;

pub use searxng::SearxngWebSearch;
