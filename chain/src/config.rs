//! Top-level configuration for a chain-manager node.
//!
//! This module aggregates configuration for:
//!
//! - chain-acceptance limits (`ConsensusConfig`),
//! - storage (RocksDB path and creation flags),
//! - metrics exporter (enable flag + listen address).
//!
//! Every struct has sensible defaults and every field is optional when
//! loading from JSON, so a config file only needs to name what it changes.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::consensus::ConsensusConfig;
use crate::storage::RocksDbConfig;

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 9898)),
        }
    }
}

/// Errors raised while loading a [`ChainConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level configuration for a chain-manager node.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub consensus: ConsensusConfig,
    pub storage: RocksDbConfig,
    pub metrics: MetricsConfig,
}

impl ChainConfig {
    /// Parses a config from a JSON string. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
