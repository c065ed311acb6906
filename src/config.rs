//! # Configuration Management
//!
//! This module handles loading and managing configuration for the store
//! client. Configuration is loaded from TOML files and includes:
//! - The keyspace all operations address
//! - The store endpoints (host/port/connect timeout)
//! - Pool shape (connections per host, checkout wait budget)
//!
//! ## Example Configuration File (config.toml)
//! ```toml
//! keyspace = "Keyspace1"
//!
//! [[endpoints]]
//! host = "10.0.0.1"
//! port = 9160
//! timeout_millis = 1000
//!
//! [[endpoints]]
//! host = "10.0.0.2"
//! port = 9160
//! timeout_millis = 1000
//!
//! [pool]
//! connections_per_host = 4
//! wait_timeout_millis = 1000
//! ```

use std::path::Path;

use anyhow::Result;
use config::{Config as ConfigLib, File};
use serde::{Deserialize, Serialize};

/// One store endpoint the pool should maintain connections to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Hostname or IP of the storage node
    pub host: String,

    /// RPC port of the storage node
    pub port: u16,

    /// Connect timeout in milliseconds for dialing this endpoint
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
}

/// Shape of the connection pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Connections eagerly created per endpoint
    pub connections_per_host: usize,

    /// Cumulative time a checkout may wait for a free connection
    pub wait_timeout_millis: u64,
}

/// Main configuration structure for the store client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Keyspace all operations of this client address
    pub keyspace: String,

    /// Store endpoints; one sub-pool is kept per entry
    pub endpoints: Vec<EndpointConfig>,

    /// Connection pool shape
    pub pool: PoolSettings,
}

fn default_timeout_millis() -> u64 {
    1000
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = ConfigLib::builder().add_source(File::from(path)).build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// A configuration with sensible defaults for development and testing:
    /// one localhost endpoint, one connection per host, a one-second wait.
    pub fn default() -> Self {
        Self {
            keyspace: "Keyspace1".to_string(),
            endpoints: vec![EndpointConfig {
                host: "127.0.0.1".to_string(),
                port: 9160,
                timeout_millis: 1000,
            }],
            pool: PoolSettings {
                connections_per_host: 1,
                wait_timeout_millis: 1000,
            },
        }
    }
}
