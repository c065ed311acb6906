//! # Operation Worker
//!
//! The acquire/execute/release discipline. Every store-facing call in the
//! crate runs through `do_work`: borrow a connection from the pool, hand its
//! RPC handle to the unit of work, and release the connection back exactly
//! once whether the work succeeded or failed. This is the only place where
//! leakage of pooled connections is prevented.
//!
//! Failures inside the unit of work are wrapped into a single operation
//! error carrying the original cause. A failed *borrow* is surfaced as-is
//! (timeout or configuration error) and triggers no release, since nothing
//! was borrowed.

use std::sync::Arc;

use log::debug;

use crate::error::{StoreError, StoreResult};
use crate::pool::ConnectionPool;
use crate::rpc::StoreRpc;

/// Executes units of work against borrowed connections.
#[derive(Clone)]
pub struct OperationWorker {
    pool: Arc<ConnectionPool>,
}

impl OperationWorker {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// The pool this worker borrows from.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Borrow a connection, run `work` against its RPC handle, release.
    ///
    /// `description` names the operation in the wrapped error, e.g.
    /// "unable to perform insert operation".
    pub fn do_work<T>(
        &self,
        description: &str,
        work: impl FnOnce(&dyn StoreRpc) -> anyhow::Result<T>,
    ) -> StoreResult<T> {
        let connection = self.pool.get_connection()?;

        let result = match connection.rpc() {
            Some(rpc) => work(rpc.as_ref()),
            // The pool opens connections at checkout, so this only happens
            // if a transport handed back a closed link.
            None => Err(anyhow::anyhow!("borrowed connection is not open")),
        };

        // Release in every outcome; the borrow above is the single place a
        // connection enters this function.
        self.pool.release_connection(Some(connection));

        result.map_err(|e| {
            debug!("{} failed: {:#}", description, e);
            StoreError::operation(description, e)
        })
    }
}
