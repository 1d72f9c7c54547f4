//! Web search domain - external search used by CRAG

mod citation;
mod provider;

pub use citation::{parse_search_results, render_citations, SourceCitation};
pub use provider::WebSearchProvider;

#[cfg(test)]
pub use provider::mock::MockWebSearchProvider;
