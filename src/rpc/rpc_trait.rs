//! # Store RPC Trait
//!
//! This module defines the common interface every storage-node transport
//! must implement. The rest of the crate only ever sees `Arc<dyn StoreRpc>`
//! handles, so transports can be swapped without touching pool, worker, or
//! query code.
//!
//! ## Implementations
//!
//! - `MemoryStore`: thread-safe in-memory store for tests and local runs
//! - Future: a real network transport speaking the store's wire protocol
//!
//! Errors are deliberately `anyhow::Result`: whatever a transport throws is
//! wrapped into a single operation-failure error at the worker boundary.

use std::collections::BTreeMap;

use anyhow::Result;

use super::types::{Column, ConsistencyLevel, KeyRange, KeySlice, RowMutations, SlicePredicate};

/// Interface to one storage node.
///
/// All handles must be safe to share across threads; the pool guarantees a
/// handle is only *used* by one borrower at a time.
#[cfg_attr(test, mockall::automock)]
pub trait StoreRpc: Send + Sync {
    /// Point read of a single column. Absent columns are `Ok(None)`.
    fn get(
        &self,
        keyspace: &str,
        key: &str,
        family: &str,
        column: &str,
        consistency: ConsistencyLevel,
    ) -> Result<Option<Column>>;

    /// Read the columns of one key selected by the predicate.
    fn get_slice(
        &self,
        keyspace: &str,
        key: &str,
        family: &str,
        predicate: &SlicePredicate,
        consistency: ConsistencyLevel,
    ) -> Result<Vec<Column>>;

    /// Scan a key range, returning one slice per key that has at least one
    /// column selected by the predicate.
    fn get_range_slices(
        &self,
        keyspace: &str,
        family: &str,
        predicate: &SlicePredicate,
        range: &KeyRange,
        consistency: ConsistencyLevel,
    ) -> Result<Vec<KeySlice>>;

    /// Write one column.
    fn insert(
        &self,
        keyspace: &str,
        key: &str,
        family: &str,
        column: Column,
        consistency: ConsistencyLevel,
    ) -> Result<()>;

    /// Remove one column.
    fn remove(
        &self,
        keyspace: &str,
        key: &str,
        family: &str,
        column: &str,
        timestamp: u64,
        consistency: ConsistencyLevel,
    ) -> Result<()>;

    /// Apply a batch of column writes across rows and families.
    fn batch_mutate(
        &self,
        keyspace: &str,
        mutations: RowMutations,
        consistency: ConsistencyLevel,
    ) -> Result<()>;

    /// Describe the keyspace: column family name -> row count.
    fn describe(&self, keyspace: &str) -> Result<BTreeMap<String, u64>>;
}
