//! API gateway configuration.
//!
//! Configures the HTTP listen address and the per-request processing
//! budget. The underlying chain configuration is a
//! `chain_manager::ChainConfig`, loaded from a JSON file when a path is
//! given on the command line and defaulted otherwise.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the API gateway HTTP server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
    /// Upper bound on the ancestry walk for one submitted block.
    pub process_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            // All interfaces, so a container port mapping is reachable.
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            process_timeout: Duration::from_secs(5),
        }
    }
}
