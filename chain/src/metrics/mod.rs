//! Metrics and instrumentation for the chain manager.
//!
//! This module defines Prometheus-compatible metrics for block processing
//! and exposes a small HTTP exporter that serves `/metrics` in Prometheus
//! text format.
//!
//! Typical usage in a node:
//!
//! ```ignore
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//! use chain_manager::metrics::{MetricsRegistry, run_prometheus_http_server};
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//! let addr: SocketAddr = "127.0.0.1:9898".parse()?;
//!
//! // Spawn the HTTP exporter in the background:
//! tokio::spawn(run_prometheus_http_server(registry.clone(), addr));
//!
//! // Hand the chain metrics to the manager:
//! let manager = ChainManager::with_store(store).with_metrics(registry.chain.clone());
//! ```

pub mod prometheus;

pub use self::prometheus::{ChainMetrics, MetricsRegistry, run_prometheus_http_server};
