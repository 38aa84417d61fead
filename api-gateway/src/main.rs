// api-gateway/src/main.rs

//! API gateway binary.
//!
//! This binary exposes a small HTTP API on top of the `chain-manager` crate:
//!
//! - `GET /health`
//! - `GET /metrics`
//! - `GET /head`
//! - `GET /blocks/{hash}`
//! - `POST /blocks`
//!
//! It embeds a RocksDB-backed `ChainManager`, bootstraps it with the
//! genesis block on first start, and runs a Prometheus metrics exporter on
//! `/metrics`.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use tokio::signal;

use chain_manager::{
    BaseValidity, Block, BlockStore, ChainConfig, ChainManager, DefaultForkChoice,
    MetricsRegistry, RocksDbBlockStore, run_prometheus_http_server,
};
use config::ApiConfig;
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    // Basic tracing setup.
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "chain_gateway=info,chain_manager=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let api_cfg = ApiConfig::default();
    let chain_cfg = match std::env::args().nth(1) {
        Some(path) => ChainConfig::from_json_file(&path)
            .map_err(|e| format!("failed to load config from {path}: {e}"))?,
        None => ChainConfig::default(),
    };

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    if chain_cfg.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = chain_cfg.metrics.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr).await {
                tracing::error!("metrics HTTP server error: {e}");
            }
        });
        tracing::info!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Storage + chain manager
    // ---------------------------

    let store: Arc<dyn BlockStore> =
        Arc::new(RocksDbBlockStore::open(&chain_cfg.storage).map_err(|e| {
            format!(
                "failed to open RocksDB store at {}: {e}",
                chain_cfg.storage.path
            )
        })?);

    let manager = ChainManager::open(
        store,
        BaseValidity::new(&chain_cfg.consensus),
        DefaultForkChoice::default(),
    )
    .map_err(|e| format!("failed to restore chain state: {e}"))?
    .with_metrics(metrics.chain.clone());

    if manager.best_block().is_none() {
        let hash = manager
            .set_best_block(&Block::genesis())
            .map_err(|e| format!("failed to bootstrap genesis: {e}"))?;
        tracing::info!(%hash, "bootstrapped empty chain with genesis");
    }

    let app_state: SharedState = Arc::new(AppState {
        manager,
        metrics,
        process_timeout: api_cfg.process_timeout,
    });

    let app = routes::router(app_state);

    // ---------------------------
    // axum 0.8 server (hyper 1 / tokio 1.48 style)
    // ---------------------------

    tracing::info!("API gateway listening on http://{}", api_cfg.listen_addr);

    let listener = tokio::net::TcpListener::bind(api_cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", api_cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("API server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
