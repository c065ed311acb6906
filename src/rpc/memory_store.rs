//! # In-Memory Store
//!
//! A thread-safe, in-memory implementation of the `StoreRpc` interface using
//! `RwLock` over nested ordered maps. Rows are kept in key order so range
//! scans are deterministic.
//!
//! ## Thread Safety
//!
//! - **Multiple concurrent readers**: slice and range reads take a shared
//!   read lock
//! - **Single writer**: inserts, removes, and batch mutations take the
//!   exclusive write lock
//!
//! Column writes are reconciled by timestamp: a write older than the column
//! already stored is dropped, matching the store's last-write-wins rule.
//!
//! **Note**: nothing here is persistent; data is gone when the process
//! exits. This implementation backs tests, benches, and local development.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;

use crate::connection::Transport;
use crate::rpc::rpc_trait::StoreRpc;
use crate::rpc::types::{
    Column, ConsistencyLevel, KeyRange, KeySlice, RowMutations, SlicePredicate,
};

/// One row: column name -> column.
type Row = BTreeMap<String, Column>;
/// One column family: row key -> row.
type Family = BTreeMap<String, Row>;
/// One keyspace: family name -> family.
type Keyspace = BTreeMap<String, Family>;

/// Thread-safe in-memory store.
///
/// Cloning is cheap and every clone shares the same underlying data, so a
/// transport can hand out as many handles as the pool asks for.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<String, Keyspace>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(row: &Row, predicate: &SlicePredicate) -> Vec<Column> {
        match predicate {
            SlicePredicate::Columns(names) => names
                .iter()
                .filter_map(|name| row.get(name).cloned())
                .collect(),
            SlicePredicate::Range { start, finish } => row
                .values()
                .filter(|column| {
                    (start.is_empty() || column.name.as_str() >= start.as_str())
                        && (finish.is_empty() || column.name.as_str() <= finish.as_str())
                })
                .cloned()
                .collect(),
        }
    }

    fn in_range(key: &str, range: &KeyRange) -> bool {
        (range.start_key.is_empty() || key >= range.start_key.as_str())
            && (range.end_key.is_empty() || key <= range.end_key.as_str())
    }

    fn write_column(family: &mut Family, key: &str, column: Column) {
        let row = family.entry(key.to_string()).or_default();
        // Last write wins; drop stale writes.
        let stale = row
            .get(&column.name)
            .map_or(false, |existing| existing.timestamp > column.timestamp);
        if !stale {
            row.insert(column.name.clone(), column);
        }
    }
}

impl StoreRpc for MemoryStore {
    fn get(
        &self,
        keyspace: &str,
        key: &str,
        family: &str,
        column: &str,
        _consistency: ConsistencyLevel,
    ) -> Result<Option<Column>> {
        let data = self.data.read().unwrap();
        Ok(data
            .get(keyspace)
            .and_then(|ks| ks.get(family))
            .and_then(|fam| fam.get(key))
            .and_then(|row| row.get(column))
            .cloned())
    }

    fn get_slice(
        &self,
        keyspace: &str,
        key: &str,
        family: &str,
        predicate: &SlicePredicate,
        _consistency: ConsistencyLevel,
    ) -> Result<Vec<Column>> {
        let data = self.data.read().unwrap();
        Ok(data
            .get(keyspace)
            .and_then(|ks| ks.get(family))
            .and_then(|fam| fam.get(key))
            .map(|row| Self::select(row, predicate))
            .unwrap_or_default())
    }

    fn get_range_slices(
        &self,
        keyspace: &str,
        family: &str,
        predicate: &SlicePredicate,
        range: &KeyRange,
        _consistency: ConsistencyLevel,
    ) -> Result<Vec<KeySlice>> {
        let data = self.data.read().unwrap();
        let mut slices = Vec::new();
        if let Some(fam) = data.get(keyspace).and_then(|ks| ks.get(family)) {
            for (key, row) in fam {
                if !Self::in_range(key, range) {
                    continue;
                }
                let columns = Self::select(row, predicate);
                // Keys whose selected slice is empty are not reported.
                if !columns.is_empty() {
                    slices.push(KeySlice {
                        key: key.clone(),
                        columns,
                    });
                }
            }
        }
        Ok(slices)
    }

    fn insert(
        &self,
        keyspace: &str,
        key: &str,
        family: &str,
        column: Column,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        let mut data = self.data.write().unwrap();
        let fam = data
            .entry(keyspace.to_string())
            .or_default()
            .entry(family.to_string())
            .or_default();
        Self::write_column(fam, key, column);
        Ok(())
    }

    fn remove(
        &self,
        keyspace: &str,
        key: &str,
        family: &str,
        column: &str,
        timestamp: u64,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        let mut data = self.data.write().unwrap();
        if let Some(fam) = data.get_mut(keyspace).and_then(|ks| ks.get_mut(family)) {
            let mut drop_row = false;
            if let Some(row) = fam.get_mut(key) {
                // A removal older than the stored column is stale.
                let removable = row
                    .get(column)
                    .map_or(false, |existing| existing.timestamp <= timestamp);
                if removable {
                    row.remove(column);
                }
                drop_row = row.is_empty();
            }
            if drop_row {
                fam.remove(key);
            }
        }
        Ok(())
    }

    fn batch_mutate(
        &self,
        keyspace: &str,
        mutations: RowMutations,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        let mut data = self.data.write().unwrap();
        let ks = data.entry(keyspace.to_string()).or_default();
        for (key, families) in mutations {
            for (family, columns) in families {
                let fam = ks.entry(family).or_default();
                for mutation in columns {
                    Self::write_column(fam, &key, mutation.column);
                }
            }
        }
        Ok(())
    }

    fn describe(&self, keyspace: &str) -> Result<BTreeMap<String, u64>> {
        let data = self.data.read().unwrap();
        Ok(data
            .get(keyspace)
            .map(|ks| {
                ks.iter()
                    .map(|(name, fam)| (name.clone(), fam.len() as u64))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Transport which dials handles onto one shared in-memory store.
///
/// Every dialed handle sees the same data regardless of the endpoint it was
/// nominally dialed for, which is exactly what pool and client tests need.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    store: MemoryStore,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared store behind this transport.
    pub fn store(&self) -> MemoryStore {
        self.store.clone()
    }
}

impl Transport for MemoryTransport {
    fn dial(&self, _host: &str, _port: u16, _timeout: Duration) -> Result<Arc<dyn StoreRpc>> {
        Ok(Arc::new(self.store.clone()))
    }
}
