//! EduScan API server.
//!
//! Usage:
//!   OPENROUTER_API_KEY=... eduscan-server --bind 0.0.0.0:5000

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use eduscan_core::{Config, StudyPipeline};
use eduscan_server::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "eduscan-server")]
#[command(about = "HTTP API for OCR-to-study-pack generation")]
struct Args {
    /// Bind address, e.g. 0.0.0.0:5000 (also: EDUSCAN_BIND)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eduscan_core=info".parse().unwrap())
                .add_directive("eduscan_server=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let bind_addr = args
        .bind
        .or_else(|| std::env::var("EDUSCAN_BIND").ok())
        .unwrap_or_else(|| "0.0.0.0:5000".to_string());

    // Missing credentials abort here, before a listener ever binds.
    let config = Config::from_env().context("configuration error")?;
    tracing::info!(model = %config.model_id, "configuration loaded");

    let pipeline = Arc::new(StudyPipeline::new(&config));
    let app = router(AppState { pipeline });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
