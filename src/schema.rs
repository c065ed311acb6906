//! # Entity Schema Descriptors
//!
//! The mapping seam between typed records and rows. Each persistable type
//! implements `Entity`, an explicit schema descriptor exposing its column
//! family, its designated key field, and accessors for its column values.
//! There is no runtime type inspection; everything the mapping needs is
//! stated explicitly per type (written by hand or by a registration step).
//!
//! Column values travel as strings on the wire; `FieldValue` carries the
//! typed side of the conversion and the comparison rules used by result-set
//! sorting.

use std::cmp::Ordering;

use crate::rpc::Column;

/// A typed field value as seen by sorting and column conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Wire representation of this value.
    pub fn to_column_string(&self) -> String {
        match self {
            FieldValue::Str(s) => s.clone(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// Ordering used by `ResultSet::ascending_by`/`descending_by`:
    /// case-insensitive for strings, numeric for integers, and equal for
    /// everything else (including mismatched types).
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Str(a), FieldValue::Str(b)) => {
                a.to_lowercase().cmp(&b.to_lowercase())
            }
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

/// Schema descriptor for one persistable record type.
///
/// `key_field` may be `None` for types without a designated key; such types
/// can be read and written but cannot participate in keyed set combination,
/// which reports a configuration error instead.
pub trait Entity: Sized + Send {
    /// Column family this type maps to.
    fn column_family() -> &'static str;

    /// Name of the designated key field, if the type has one.
    fn key_field() -> Option<&'static str>;

    /// Every field name this type maps to a column.
    fn field_names() -> &'static [&'static str];

    /// Value of the designated key field, if set.
    fn key(&self) -> Option<String>;

    /// The (column name, value) pairs to persist. Unset fields are omitted.
    fn columns(&self) -> Vec<(String, FieldValue)>;

    /// Typed value of one named field, if the field is set.
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Build an instance from a row's key and column values. Fields without
    /// a matching column stay unset; a column that cannot be converted to
    /// its field's type is an error.
    fn from_row(key: &str, columns: &[Column]) -> anyhow::Result<Self>;
}
