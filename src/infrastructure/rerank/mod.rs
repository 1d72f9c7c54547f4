//! Pairwise scorer implementations

mod http_cross_encoder;

pub use http_cross_encoder::HttpCrossEncoder;
