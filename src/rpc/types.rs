//! # Wire-Level Data Model
//!
//! Plain data carried across the `StoreRpc` seam. Rows live under a column
//! family and consist of named, timestamped columns; reads come back as
//! slices (the columns of one key) or key slices (one slice per key over a
//! key range).

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// One named, timestamped column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub value: String,
    /// Microseconds since the Unix epoch; newest timestamp wins on conflict.
    pub timestamp: u64,
}

impl Column {
    /// Create a column stamped with the current time.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp: now_micros(),
        }
    }
}

/// The columns of a single key, as returned by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySlice {
    pub key: String,
    pub columns: Vec<Column>,
}

/// Which columns a slice read should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlicePredicate {
    /// Exactly the named columns, when present.
    Columns(Vec<String>),
    /// All columns whose name falls in the range; empty bounds are unbounded.
    Range { start: String, finish: String },
}

impl SlicePredicate {
    /// Predicate selecting every column of a row.
    pub fn all() -> Self {
        Self::Range {
            start: String::new(),
            finish: String::new(),
        }
    }

    /// Predicate selecting a single named column.
    pub fn column(name: impl Into<String>) -> Self {
        Self::Columns(vec![name.into()])
    }
}

/// A key range for range-slice scans; empty bounds are unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub start_key: String,
    pub end_key: String,
}

impl KeyRange {
    /// The full key range.
    pub fn unbounded() -> Self {
        Self {
            start_key: String::new(),
            end_key: String::new(),
        }
    }
}

/// Replica-agreement strength requested for one store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyLevel {
    Any,
    One,
    Quorum,
    All,
}

/// A single column write inside a batch mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub column: Column,
}

/// Batched writes: row key -> column family -> mutations.
pub type RowMutations = HashMap<String, HashMap<String, Vec<Mutation>>>;

/// Current time in microseconds since the Unix epoch.
pub fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
