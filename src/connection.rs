//! # Connections and Factories
//!
//! A `Connection` is one logical link to one store endpoint. It is created
//! closed by a `ConnectionFactory`, then opened and closed repeatedly over
//! its pooled lifetime; the pool guarantees it is never lent to two
//! borrowers at once.
//!
//! The actual link is produced by a `Transport`, the dial seam behind which
//! the store's wire protocol lives. Swapping transports (in-memory, real
//! network) requires no change to pool or worker code.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::error::{StoreError, StoreResult};
use crate::rpc::StoreRpc;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Dial seam: turns endpoint coordinates into a live RPC handle.
pub trait Transport: Send + Sync {
    fn dial(&self, host: &str, port: u16, timeout: Duration) -> Result<Arc<dyn StoreRpc>>;
}

/// Immutable endpoint configuration; produces closed connections on demand.
///
/// One factory per store endpoint.
#[derive(Clone)]
pub struct ConnectionFactory {
    host: String,
    port: u16,
    timeout: Duration,
    transport: Arc<dyn Transport>,
}

impl ConnectionFactory {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        timeout: Duration,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
            transport,
        }
    }

    /// Build a new, closed connection to this factory's endpoint.
    pub fn create_connection(&self) -> Connection {
        Connection {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            host: self.host.clone(),
            port: self.port,
            timeout: self.timeout,
            transport: Arc::clone(&self.transport),
            rpc: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// One logical link to a store endpoint.
///
/// Owns its RPC handle while open. The id identifies this connection's pool
/// slot across checkout and release.
pub struct Connection {
    id: u64,
    host: String,
    port: u16,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    rpc: Option<Arc<dyn StoreRpc>>,
}

impl Connection {
    /// Dial the endpoint. A no-op if the connection is already open.
    pub fn open(&mut self) -> StoreResult<()> {
        if self.rpc.is_some() {
            return Ok(());
        }
        let rpc = self
            .transport
            .dial(&self.host, self.port, self.timeout)
            .map_err(|e| {
                StoreError::operation(format!("unable to open connection to {}", self.host), e)
            })?;
        self.rpc = Some(rpc);
        Ok(())
    }

    /// Drop the link. Safe to call on a closed connection.
    pub fn close(&mut self) {
        self.rpc = None;
    }

    pub fn is_open(&self) -> bool {
        self.rpc.is_some()
    }

    /// The RPC handle, if the connection is open.
    pub fn rpc(&self) -> Option<Arc<dyn StoreRpc>> {
        self.rpc.clone()
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("open", &self.is_open())
            .finish()
    }
}
