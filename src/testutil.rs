//! Shared test fixtures: a sample entity, a keyless entity, and a client
//! wired onto the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use crate::client::StoreClient;
use crate::connection::ConnectionFactory;
use crate::pool::ConnectionPool;
use crate::rpc::{Column, MemoryTransport};
use crate::schema::{Entity, FieldValue};

/// Sample record mapped to the "People" column family, keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: Option<i64>,
    pub city: Option<String>,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_string(),
            age: Some(age),
            city: None,
        }
    }

    pub fn with_city(name: &str, age: i64, city: &str) -> Self {
        Self {
            name: name.to_string(),
            age: Some(age),
            city: Some(city.to_string()),
        }
    }

    /// A person whose key field was never set.
    pub fn keyless(age: i64) -> Self {
        Self {
            name: String::new(),
            age: Some(age),
            city: None,
        }
    }
}

impl Entity for Person {
    fn column_family() -> &'static str {
        "People"
    }

    fn key_field() -> Option<&'static str> {
        Some("name")
    }

    fn field_names() -> &'static [&'static str] {
        &["name", "age", "city"]
    }

    fn key(&self) -> Option<String> {
        if self.name.is_empty() {
            None
        } else {
            Some(self.name.clone())
        }
    }

    fn columns(&self) -> Vec<(String, FieldValue)> {
        let mut columns = Vec::new();
        if let Some(age) = self.age {
            columns.push(("age".to_string(), FieldValue::Int(age)));
        }
        if let Some(city) = &self.city {
            columns.push(("city".to_string(), FieldValue::Str(city.clone())));
        }
        columns
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "name" => Some(FieldValue::Str(self.name.clone())),
            "age" => self.age.map(FieldValue::Int),
            "city" => self.city.clone().map(FieldValue::Str),
            _ => None,
        }
    }

    fn from_row(key: &str, columns: &[Column]) -> anyhow::Result<Self> {
        let mut person = Self {
            name: key.to_string(),
            age: None,
            city: None,
        };
        for column in columns {
            match column.name.as_str() {
                "age" => person.age = Some(column.value.parse()?),
                "city" => person.city = Some(column.value.clone()),
                _ => {}
            }
        }
        Ok(person)
    }
}

/// Record type without a designated key field.
#[derive(Debug, Clone, PartialEq)]
pub struct Orphan {
    pub label: String,
}

impl Orphan {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl Entity for Orphan {
    fn column_family() -> &'static str {
        "Orphans"
    }

    fn key_field() -> Option<&'static str> {
        None
    }

    fn field_names() -> &'static [&'static str] {
        &["label"]
    }

    fn key(&self) -> Option<String> {
        None
    }

    fn columns(&self) -> Vec<(String, FieldValue)> {
        vec![("label".to_string(), FieldValue::Str(self.label.clone()))]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "label" => Some(FieldValue::Str(self.label.clone())),
            _ => None,
        }
    }

    fn from_row(_key: &str, columns: &[Column]) -> anyhow::Result<Self> {
        let label = columns
            .iter()
            .find(|column| column.name == "label")
            .map(|column| column.value.clone())
            .unwrap_or_default();
        Ok(Self { label })
    }
}

/// Initialize logging for tests. Control verbosity with RUST_LOG, e.g.
/// `RUST_LOG=debug cargo test`. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A client over a fresh in-memory store: one endpoint, two connections.
pub fn memory_client() -> StoreClient {
    init_logging();
    let transport = Arc::new(MemoryTransport::new());
    let factory = ConnectionFactory::new("node-a", 9160, Duration::from_millis(100), transport);
    let pool = Arc::new(ConnectionPool::new(
        2,
        Duration::from_millis(500),
        vec![factory],
    ));
    StoreClient::new("Keyspace1", pool)
}
