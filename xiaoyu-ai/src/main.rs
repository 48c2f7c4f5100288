//! xiaoyu-ai - Emotion & Orchestration Microservice
//!
//! Serves keyword and multimodal emotion analysis plus multi-role AI answers
//! for the child growth companion front end.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xiaoyu_ai::llm::openai::OpenAiClient;
use xiaoyu_ai::llm::LanguageModel;
use xiaoyu_ai::AppState;

/// Command-line arguments for xiaoyu-ai
#[derive(Parser, Debug)]
#[command(name = "xiaoyu-ai")]
#[command(about = "Emotion analysis and multi-role AI orchestration for Xiaoyu")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "XIAOYU_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides XIAOYU_PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "XIAOYU_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = xiaoyu_common::config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let default_filter = format!("xiaoyu_ai={0},xiaoyu_common={0},tower_http=info", config.logging.level);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting xiaoyu-ai v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let development = config.is_development();
    if development {
        warn!("Development mode: error details are returned to clients");
    }

    let llm: Option<Arc<dyn LanguageModel>> =
        match xiaoyu_ai::config::resolve_llm_settings(&config.llm) {
            Some(settings) => match OpenAiClient::new(settings) {
                Ok(client) => {
                    info!("Language model client ready: {}", client.model_name());
                    Some(Arc::new(client))
                }
                Err(e) => {
                    error!("Failed to create language model client: {}", e);
                    None
                }
            },
            None => None,
        };

    let state = AppState::new(&config.emotion, llm, development);
    let app = xiaoyu_ai::build_router(state);

    let port = xiaoyu_common::config::resolve_port(args.port, &config);
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
