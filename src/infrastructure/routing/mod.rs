//! Topical gate in front of every pipeline

mod topic_router;

pub use topic_router::{TopicRouter, ROUTING_PROMPT};
