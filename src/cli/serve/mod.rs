//! Serve command - runs the HTTP server until Ctrl+C or SIGTERM

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::observability::{init_metrics, init_tracing, shutdown_tracing};

/// Run the API server
pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    init_tracing(&config.logging, &config.observability.tracing);

    let metrics = init_metrics(&config.observability.metrics)
        .map(|handle| (handle, config.observability.metrics.path.clone()));
    let state = crate::create_app_state(&config).await?;
    let app = create_router(state, metrics);

    let addr = build_socket_addr(&config)?;
    info!("Starting RAG API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracing();
    info!("RAG API server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
