//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use chain_manager::{BaseValidity, BlockStore, ChainManager, DefaultForkChoice, MetricsRegistry};

/// Chain manager as embedded in the gateway; the store is type-erased so
/// the same handlers run over RocksDB in production and memory in tests.
pub type GatewayManager = ChainManager<Arc<dyn BlockStore>, BaseValidity, DefaultForkChoice>;

/// Shared state held by the API handlers.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor. The manager synchronizes internally, so no outer
/// lock is needed.
pub struct AppState {
    /// Embedded chain manager (storage + validators + fork choice).
    pub manager: GatewayManager,
    /// Metrics registry shared between the manager and the exporter.
    pub metrics: Arc<MetricsRegistry>,
    /// Budget for processing one submitted block.
    pub process_timeout: Duration,
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
