//! CLI module for PMP RAG API
//!
//! - `serve`: HTTP server
//! - `ask`: run one question through a pipeline and print the JSON answer

pub mod ask;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// PMP RAG API - Adaptive RAG, CRAG and Self-RAG over a knowledge corpus
#[derive(Parser)]
#[command(name = "pmp-rag-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Answer one question and print the response as JSON
    Ask(ask::AskArgs),
}

/// Load `.env`, then the layered configuration
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    AppConfig::load().context("Failed to load configuration")
}
