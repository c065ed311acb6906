//! # Store Client
//!
//! The caller-facing facade. A `StoreClient` owns a keyspace name, a
//! connection pool, and an operation worker; every call below borrows a
//! connection through the worker's acquire/execute/release discipline, so
//! no code path can leak a pooled connection.
//!
//! Typed operations (`get`, `insert`, `update`, `remove`, `get_all`, the
//! query engine) go through the `Entity` schema descriptor; untyped column
//! operations (`get_column_value`, `insert_column_value`,
//! `remove_column_value`, `count`) address rows directly by family, key,
//! and column name.
//!
//! Consistency levels mirror the store's write/read split: single-column
//! inserts at ANY, reads at ONE, removals and batch mutations at ALL, query
//! scans at ALL.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::config::Config;
use crate::connection::{ConnectionFactory, Transport};
use crate::error::{StoreError, StoreResult};
use crate::pool::ConnectionPool;
use crate::query::Query;
use crate::result_set::ResultSet;
use crate::rpc::types::now_micros;
use crate::rpc::{Column, ConsistencyLevel, KeyRange, Mutation, RowMutations, SlicePredicate};
use crate::schema::Entity;
use crate::worker::OperationWorker;

/// Client for one keyspace of a wide-column store.
pub struct StoreClient {
    keyspace: String,
    worker: OperationWorker,
}

impl StoreClient {
    pub fn new(keyspace: impl Into<String>, pool: Arc<ConnectionPool>) -> Self {
        Self {
            keyspace: keyspace.into(),
            worker: OperationWorker::new(pool),
        }
    }

    /// Wire a client from configuration: one connection factory per
    /// configured endpoint, all dialing through the given transport.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let factories = config
            .endpoints
            .iter()
            .map(|endpoint| {
                ConnectionFactory::new(
                    endpoint.host.clone(),
                    endpoint.port,
                    Duration::from_millis(endpoint.timeout_millis),
                    transport.clone(),
                )
            })
            .collect();
        let pool = Arc::new(ConnectionPool::new(
            config.pool.connections_per_host,
            Duration::from_millis(config.pool.wait_timeout_millis),
            factories,
        ));
        Self::new(config.keyspace.clone(), pool)
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub(crate) fn worker(&self) -> &OperationWorker {
        &self.worker
    }

    /// Entry point to the query engine.
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    /// Number of columns stored under one key.
    pub fn count(&self, family: &str, key: &str) -> StoreResult<usize> {
        let keyspace = self.keyspace.clone();
        let family = family.to_string();
        let key = key.to_string();
        let columns = self.worker.do_work("unable to perform count operation", move |rpc| {
            rpc.get_slice(
                &keyspace,
                &key,
                &family,
                &SlicePredicate::all(),
                ConsistencyLevel::One,
            )
        })?;
        debug!("key has a slice size of {}", columns.len());
        Ok(columns.len())
    }

    /// Load one typed record by key.
    ///
    /// A key with no stored columns still yields an instance; its fields
    /// simply stay unset.
    pub fn get<T: Entity>(&self, key: &str) -> StoreResult<T> {
        debug!("get {} key {}", T::column_family(), key);
        let keyspace = self.keyspace.clone();
        let owned_key = key.to_string();
        let columns = self.worker.do_work("unable to perform get operation", move |rpc| {
            rpc.get_slice(
                &keyspace,
                &owned_key,
                T::column_family(),
                &SlicePredicate::all(),
                ConsistencyLevel::One,
            )
        })?;
        T::from_row(key, &columns)
            .map_err(|e| StoreError::operation("unable to map row to entity", e))
    }

    /// Load every record of the entity's column family.
    pub fn get_all<T: Entity + Clone>(&self) -> StoreResult<ResultSet<T>> {
        debug!("get all {}", T::column_family());
        let keyspace = self.keyspace.clone();
        let slices = self.worker.do_work("unable to perform get all operation", move |rpc| {
            rpc.get_range_slices(
                &keyspace,
                T::column_family(),
                &SlicePredicate::all(),
                &KeyRange::unbounded(),
                ConsistencyLevel::One,
            )
        })?;

        let mut results = ResultSet::new();
        for slice in &slices {
            let entity = T::from_row(&slice.key, &slice.columns)
                .map_err(|e| StoreError::operation("unable to map row to entity", e))?;
            results.results.push(entity);
        }
        Ok(results)
    }

    /// Read one column value. Absent columns are `Ok(None)`, not errors.
    pub fn get_column_value(
        &self,
        family: &str,
        key: &str,
        column: &str,
    ) -> StoreResult<Option<String>> {
        let keyspace = self.keyspace.clone();
        let family = family.to_string();
        let key = key.to_string();
        let column = column.to_string();
        let found = self
            .worker
            .do_work("unable to perform get column value operation", move |rpc| {
                rpc.get(&keyspace, &key, &family, &column, ConsistencyLevel::One)
            })?;
        Ok(found.map(|column| column.value))
    }

    /// Persist a typed record: one column write per set field.
    pub fn insert<T: Entity>(&self, entity: &T) -> StoreResult<()> {
        debug!("insert into {}", T::column_family());
        let key = Self::key_of(entity)?;
        let columns: Vec<Column> = entity
            .columns()
            .into_iter()
            .map(|(name, value)| Column::new(name, value.to_column_string()))
            .collect();

        let keyspace = self.keyspace.clone();
        self.worker.do_work("unable to perform insert operation", move |rpc| {
            for column in columns {
                rpc.insert(&keyspace, &key, T::column_family(), column, ConsistencyLevel::Any)?;
            }
            Ok(())
        })
    }

    /// Write one column value.
    pub fn insert_column_value(
        &self,
        family: &str,
        key: &str,
        column: &str,
        value: &str,
    ) -> StoreResult<()> {
        let keyspace = self.keyspace.clone();
        let family = family.to_string();
        let key = key.to_string();
        let column = Column::new(column, value);
        self.worker
            .do_work("unable to perform insert column value operation", move |rpc| {
                rpc.insert(&keyspace, &key, &family, column, ConsistencyLevel::Any)
            })
    }

    /// Remove a typed record: read its slice, then remove every column.
    pub fn remove<T: Entity>(&self, key: &str) -> StoreResult<()> {
        debug!("remove {} key {}", T::column_family(), key);
        let keyspace = self.keyspace.clone();
        let key = key.to_string();
        self.worker.do_work("unable to perform remove operation", move |rpc| {
            let columns = rpc.get_slice(
                &keyspace,
                &key,
                T::column_family(),
                &SlicePredicate::all(),
                ConsistencyLevel::One,
            )?;
            for column in columns {
                rpc.remove(
                    &keyspace,
                    &key,
                    T::column_family(),
                    &column.name,
                    now_micros(),
                    ConsistencyLevel::All,
                )?;
            }
            Ok(())
        })
    }

    /// Remove one column value.
    pub fn remove_column_value(&self, family: &str, key: &str, column: &str) -> StoreResult<()> {
        let keyspace = self.keyspace.clone();
        let family = family.to_string();
        let key = key.to_string();
        let column = column.to_string();
        self.worker
            .do_work("unable to perform remove column value operation", move |rpc| {
                rpc.remove(&keyspace, &key, &family, &column, now_micros(), ConsistencyLevel::All)
            })
    }

    /// Rewrite a typed record with one batched mutation of all set fields.
    pub fn update<T: Entity>(&self, entity: &T) -> StoreResult<()> {
        debug!("update {}", T::column_family());
        let key = Self::key_of(entity)?;
        let mutations: Vec<Mutation> = entity
            .columns()
            .into_iter()
            .map(|(name, value)| Mutation {
                column: Column::new(name, value.to_column_string()),
            })
            .collect();

        let mut family_updates = HashMap::new();
        family_updates.insert(T::column_family().to_string(), mutations);
        let mut row_updates: RowMutations = HashMap::new();
        row_updates.insert(key, family_updates);

        let keyspace = self.keyspace.clone();
        self.worker.do_work("unable to perform update operation", move |rpc| {
            rpc.batch_mutate(&keyspace, row_updates, ConsistencyLevel::All)
        })
    }

    /// Human-readable dump of the keyspace schema.
    pub fn describe(&self) -> StoreResult<String> {
        let keyspace = self.keyspace.clone();
        let families = self.worker.do_work("unable to perform describe operation", move |rpc| {
            rpc.describe(&keyspace)
        })?;

        let mut out = format!("Keyspace: {}\n", self.keyspace);
        for (family, rows) in families {
            let _ = writeln!(out, "  {family}: {rows} rows");
        }
        Ok(out)
    }

    fn key_of<T: Entity>(entity: &T) -> StoreResult<String> {
        if T::key_field().is_none() {
            return Err(StoreError::configuration(format!(
                "type mapped to column family '{}' has no designated key field",
                T::column_family()
            )));
        }
        entity.key().ok_or_else(|| {
            StoreError::configuration(format!(
                "entity of column family '{}' has no key value",
                T::column_family()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{memory_client, Orphan, Person};

    const CF: &str = "People";

    #[test]
    fn test_column_value_round_trip() {
        let client = memory_client();
        client.insert_column_value(CF, "alice", "age", "31").unwrap();
        assert_eq!(
            client.get_column_value(CF, "alice", "age").unwrap(),
            Some("31".to_string())
        );

        client.remove_column_value(CF, "alice", "age").unwrap();
        assert_eq!(client.get_column_value(CF, "alice", "age").unwrap(), None);
    }

    #[test]
    fn test_absent_column_is_not_an_error() {
        let client = memory_client();
        assert_eq!(client.get_column_value(CF, "nobody", "age").unwrap(), None);
    }

    #[test]
    fn test_count_counts_columns() {
        let client = memory_client();
        assert_eq!(client.count(CF, "alice").unwrap(), 0);
        client.insert_column_value(CF, "alice", "age", "31").unwrap();
        client.insert_column_value(CF, "alice", "city", "Oslo").unwrap();
        assert_eq!(client.count(CF, "alice").unwrap(), 2);
    }

    #[test]
    fn test_entity_round_trip() {
        let client = memory_client();
        client.insert(&Person::with_city("alice", 31, "Oslo")).unwrap();

        let loaded: Person = client.get("alice").unwrap();
        assert_eq!(loaded.name, "alice");
        assert_eq!(loaded.age, Some(31));
        assert_eq!(loaded.city, Some("Oslo".to_string()));
    }

    #[test]
    fn test_get_unknown_key_yields_bare_entity() {
        let client = memory_client();
        let loaded: Person = client.get("ghost").unwrap();
        assert_eq!(loaded.name, "ghost");
        assert_eq!(loaded.age, None);
        assert_eq!(loaded.city, None);
    }

    #[test]
    fn test_insert_skips_unset_fields() {
        let client = memory_client();
        client.insert(&Person::new("bob", 25)).unwrap();
        assert_eq!(client.get_column_value(CF, "bob", "city").unwrap(), None);
        assert_eq!(
            client.get_column_value(CF, "bob", "age").unwrap(),
            Some("25".to_string())
        );
    }

    #[test]
    fn test_insert_without_key_value_is_a_configuration_error() {
        let client = memory_client();
        let err = client.insert(&Person::keyless(31)).unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));

        let err = client.insert(&Orphan::new("a")).unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[test]
    fn test_get_all_returns_every_row() {
        let client = memory_client();
        client.insert(&Person::new("alice", 31)).unwrap();
        client.insert(&Person::new("bob", 25)).unwrap();

        let everyone: ResultSet<Person> = client.get_all().unwrap();
        assert_eq!(everyone.len(), 2);
    }

    #[test]
    fn test_update_rewrites_columns() {
        let client = memory_client();
        client.insert(&Person::with_city("alice", 31, "Oslo")).unwrap();

        client.update(&Person::with_city("alice", 32, "Lima")).unwrap();
        let loaded: Person = client.get("alice").unwrap();
        assert_eq!(loaded.age, Some(32));
        assert_eq!(loaded.city, Some("Lima".to_string()));
    }

    #[test]
    fn test_remove_clears_the_row() {
        let client = memory_client();
        client.insert(&Person::with_city("alice", 31, "Oslo")).unwrap();
        client.remove::<Person>("alice").unwrap();

        assert_eq!(client.count(CF, "alice").unwrap(), 0);
        let everyone: ResultSet<Person> = client.get_all().unwrap();
        assert!(everyone.is_empty());
    }

    #[test]
    fn test_describe_names_keyspace_and_families() {
        let client = memory_client();
        client.insert(&Person::new("alice", 31)).unwrap();

        let description = client.describe().unwrap();
        assert!(description.contains("Keyspace: Keyspace1"));
        assert!(description.contains("People: 1 rows"));
    }
}
