//! # colstore - Wide-Column Store Client
//!
//! Client-side access layer for a wide-column, distributed key/value store:
//! typed records map to rows and columns, a fixed-size connection pool
//! serves store-facing calls under a bounded wait, and a small in-memory
//! query facility (predicate filtering, set combination, sorting) sits on
//! top of coarse server-side range scans.
//!
//! ## Architecture Overview
//!
//! - **Connection pool**: one sub-pool per endpoint, random host selection
//!   at checkout, condition-variable wait with a cumulative timeout
//! - **Operation worker**: acquire/execute/release discipline; connections
//!   are released in every outcome and can never leak
//! - **Query engine**: per-clause server range scans, client-side predicate
//!   filtering, OR-composition into result sets
//! - **Result sets**: keyed union/intersection and field-based sorting
//! - **RPC seam**: the store's wire protocol hides behind the `StoreRpc`
//!   trait; an in-memory implementation backs tests and local development
//! - **Schema descriptors**: the `Entity` trait states each type's column
//!   family, key field, and column accessors explicitly

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod pool;
pub mod query;
pub mod result_set;
pub mod rpc;
pub mod schema;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export the main entry points for convenience
pub use client::StoreClient;
pub use config::Config;
pub use connection::{Connection, ConnectionFactory, Transport};
pub use error::{StoreError, StoreResult};
pub use pool::ConnectionPool;
pub use query::{Query, QueryClause, QueryConditional};
pub use result_set::ResultSet;
pub use rpc::{MemoryStore, MemoryTransport, StoreRpc};
pub use schema::{Entity, FieldValue};
pub use worker::OperationWorker;
