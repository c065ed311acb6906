//! # Store RPC Seam
//!
//! This module contains the boundary between the client and the storage
//! nodes:
//!
//! - **`types`**: the wire-level data model (columns, slices, key ranges,
//!   consistency levels, batched mutations)
//! - **`rpc_trait`**: the `StoreRpc` trait every transport must implement
//! - **`memory_store`**: a thread-safe in-memory implementation, useful for
//!   tests, benches, and local development
//!
//! The rest of the crate never talks to a storage node directly; everything
//! goes through `StoreRpc` handles borrowed from the connection pool.

pub mod memory_store;
pub mod rpc_trait;
pub mod types;

// Re-export the trait and common types for convenience
pub use memory_store::{MemoryStore, MemoryTransport};
pub use rpc_trait::StoreRpc;
pub use types::{
    Column, ConsistencyLevel, KeyRange, KeySlice, Mutation, RowMutations, SlicePredicate,
};
