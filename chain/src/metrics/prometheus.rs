//! Prometheus-backed metrics and HTTP exporter.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and a set of strongly-typed chain metrics, and an async HTTP
//! exporter that serves `/metrics` using `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use ::prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

/// Chain-manager Prometheus metrics.
///
/// These are registered into a [`Registry`] and updated by
/// [`crate::consensus::ChainManager`] when attached with `with_metrics`.
#[derive(Clone)]
pub struct ChainMetrics {
    /// Wall time of `process_new_block`, in seconds.
    pub process_block_seconds: Histogram,
    /// Blocks that became the new best block.
    pub blocks_accepted: IntCounter,
    /// Blocks verified but not promoted to best.
    pub blocks_valid: IntCounter,
    /// Blocks rejected for structural invalidity.
    pub blocks_invalid: IntCounter,
    /// Blocks whose ancestry could not be resolved from the store.
    pub ancestry_unresolved: IntCounter,
    /// Blocks newly added to the known-good set by ancestry walks.
    pub ancestors_walked: IntCounter,
    /// Height of the current best block.
    pub best_height: IntGauge,
}

impl ChainMetrics {
    /// Registers chain metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let process_block_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "chain_process_block_seconds",
                "Time to store, walk and fork-choose a new block in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )?;
        registry.register(Box::new(process_block_seconds.clone()))?;

        let counter = |name: &str, help: &str| -> Result<IntCounter, prometheus::Error> {
            let c = IntCounter::with_opts(Opts::new(name, help))?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };

        let blocks_accepted = counter(
            "chain_blocks_accepted",
            "Total number of blocks installed as the best block",
        )?;
        let blocks_valid = counter(
            "chain_blocks_valid",
            "Total number of verified blocks that did not become best",
        )?;
        let blocks_invalid = counter(
            "chain_blocks_invalid",
            "Total number of blocks rejected as structurally invalid",
        )?;
        let ancestry_unresolved = counter(
            "chain_ancestry_unresolved",
            "Total number of blocks with an ancestor missing from the store",
        )?;
        let ancestors_walked = counter(
            "chain_ancestors_walked",
            "Total number of blocks newly marked known-good by ancestry walks",
        )?;

        let best_height = IntGauge::with_opts(Opts::new(
            "chain_best_height",
            "Height of the current best block",
        ))?;
        registry.register(Box::new(best_height.clone()))?;

        Ok(Self {
            process_block_seconds,
            blocks_accepted,
            blocks_valid,
            blocks_invalid,
            ancestry_unresolved,
            ancestors_walked,
            best_height,
        })
    }
}

/// Wrapper around a Prometheus registry and the chain metrics.
///
/// This is the main handle you pass around in the node. It can be wrapped
/// in an [`Arc`] and shared across threads/tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub chain: ChainMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh underlying `Registry`
    /// and registers the chain metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("node".to_string()), None)?;
        let chain = ChainMetrics::register(&registry)?;
        Ok(Self { registry, chain })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics.
///
/// The server listens on `addr` and serves `GET /metrics` with the
/// Prometheus text exposition format. All other paths return 404.
///
/// ```ignore
/// let registry = Arc::new(MetricsRegistry::new()?);
/// let addr: SocketAddr = "127.0.0.1:9898".parse()?;
/// tokio::spawn(run_prometheus_http_server(registry.clone(), addr));
/// ```
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                tracing::warn!("prometheus HTTP connection error: {err}");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(route(req.method(), req.uri().path(), &metrics))
}

fn route(method: &Method, path: &str, metrics: &MetricsRegistry) -> Response<Full<Bytes>> {
    let (status, content_type, body) = match (method, path) {
        (&Method::GET, "/metrics") => (
            StatusCode::OK,
            "text/plain; version=0.0.4",
            metrics.gather_text(),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            "text/plain",
            "not found".to_string(),
        ),
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_metrics_register_and_record() {
        let registry = Registry::new();
        let metrics = ChainMetrics::register(&registry).expect("register metrics");

        metrics.process_block_seconds.observe(0.002);
        metrics.blocks_accepted.inc();
        metrics.best_height.set(7);

        let metric_families = registry.gather();
        assert!(!metric_families.is_empty());
    }

    #[test]
    fn registering_twice_fails() {
        let registry = Registry::new();
        ChainMetrics::register(&registry).expect("first registration");
        assert!(ChainMetrics::register(&registry).is_err());
    }

    #[test]
    fn metrics_endpoint_serves_text_format() {
        let registry = MetricsRegistry::new().expect("create metrics registry");
        registry.chain.blocks_invalid.inc();

        let resp = route(&Method::GET, "/metrics", &registry);
        assert_eq!(resp.status(), StatusCode::OK);

        let text = registry.gather_text();
        assert!(text.contains("node_chain_blocks_invalid 1"), "got: {text}");
    }

    #[test]
    fn unknown_path_is_404() {
        let registry = MetricsRegistry::new().expect("create metrics registry");
        let resp = route(&Method::GET, "/nope", &registry);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
