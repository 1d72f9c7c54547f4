//! Ask command - one question through one pipeline, JSON on stdout

use clap::{Args, ValueEnum};

use crate::config::LoggingConfig;
use crate::domain::CategorySelector;
use crate::infrastructure::adaptive::AdaptiveOptions;
use crate::infrastructure::observability::init_tracing;
use crate::infrastructure::services::RagService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PipelineArg {
    /// Plain similarity search, prints the matched resources
    Search,
    Adaptive,
    Crag,
    SelfRag,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    #[arg(value_enum)]
    pub pipeline: PipelineArg,

    pub query: String,

    /// Documents to retrieve (`top_k` for Self-RAG)
    #[arg(long)]
    pub k: Option<usize>,

    /// Skip the cross-encoder rerank (adaptive only)
    #[arg(long)]
    pub no_rerank: bool,

    /// Auto, Factual or Analytical (adaptive only)
    #[arg(long)]
    pub category: Option<String>,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    // stdout carries the answer; only warnings go to the log
    let logging = LoggingConfig {
        level: "warn".to_string(),
        format: config.logging.format.clone(),
    };
    init_tracing(&logging, &config.observability.tracing);

    let service = crate::create_rag_service(&config).await?;
    let output = answer(&service, args).await?;

    println!("{}", output);
    Ok(())
}

async fn answer(service: &RagService, args: AskArgs) -> anyhow::Result<String> {
    let defaults = service.defaults();

    let json = match args.pipeline {
        PipelineArg::Search => {
            let k = args.k.unwrap_or(defaults.search_k);
            serde_json::to_string_pretty(&service.search_resources(&args.query, k).await?)?
        }
        PipelineArg::Adaptive => {
            let options = adaptive_options(&args, defaults.adaptive);
            serde_json::to_string_pretty(&service.adaptive(&args.query, options).await?)?
        }
        PipelineArg::Crag => {
            let k = args.k.unwrap_or(defaults.crag_k);
            serde_json::to_string_pretty(&service.crag(&args.query, k).await?)?
        }
        PipelineArg::SelfRag => {
            let top_k = args.k.unwrap_or(defaults.self_rag_top_k);
            serde_json::to_string_pretty(&service.self_rag(&args.query, top_k).await?)?
        }
    };

    Ok(json)
}

fn adaptive_options(args: &AskArgs, defaults: AdaptiveOptions) -> AdaptiveOptions {
    AdaptiveOptions {
        k: args.k.unwrap_or(defaults.k),
        rerank: defaults.rerank && !args.no_rerank,
        category: args
            .category
            .as_deref()
            .map(CategorySelector::parse)
            .unwrap_or(defaults.category),
    }
}
