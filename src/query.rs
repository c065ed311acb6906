//! # Query Engine
//!
//! Client-side predicate queries layered on top of coarse server-side range
//! scans. For each clause the engine runs one unbounded range-slice scan
//! over the entity's column family (requesting only the clause's column, at
//! consistency ALL), filters the returned rows in memory, materializes each
//! surviving key into a full record with one point fetch, and folds the
//! per-clause sets together with `ResultSet::or`.
//!
//! Because per-clause sets are combined with `or`, supplying several clauses
//! computes a logical **OR** across clauses, not an AND: every record
//! satisfying any one clause is returned once, keyed by the entity key. A
//! caller wanting a conjunction runs one `execute` per clause and combines
//! the sets with [`ResultSet::and`].
//!
//! Queries are not transactional: each clause scans the store at a
//! different point in time, and the point fetches happen later still, so
//! concurrent writers can produce read skew within one `execute` call.

use log::debug;

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::result_set::ResultSet;
use crate::rpc::{ConsistencyLevel, KeyRange, SlicePredicate};
use crate::schema::Entity;

/// Comparison operator of one query clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryConditional {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
}

/// One predicate: field, operator, literal comparison value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryClause {
    pub field: String,
    pub conditional: QueryConditional,
    pub value: String,
}

impl QueryClause {
    pub fn new(
        field: impl Into<String>,
        conditional: QueryConditional,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            conditional,
            value: value.into(),
        }
    }
}

/// Query handle bound to one client.
pub struct Query<'a> {
    client: &'a StoreClient,
}

impl<'a> Query<'a> {
    pub(crate) fn new(client: &'a StoreClient) -> Self {
        Self { client }
    }

    /// Run one scan-filter-materialize pass per clause and OR the results.
    ///
    /// At least one clause is required. Any RPC, decode, or mapping failure
    /// aborts the whole call; partial results are discarded.
    pub fn execute<T: Entity + Clone>(&self, clauses: &[QueryClause]) -> StoreResult<ResultSet<T>> {
        if clauses.is_empty() {
            return Err(StoreError::configuration(
                "at least one query clause is required",
            ));
        }
        self.run(clauses).map_err(|e| match e {
            // Misconfiguration and pool exhaustion keep their own taxonomy.
            err @ (StoreError::Configuration(_) | StoreError::Timeout(_)) => err,
            err => StoreError::operation("query operation failed", err.into()),
        })
    }

    fn run<T: Entity + Clone>(&self, clauses: &[QueryClause]) -> StoreResult<ResultSet<T>> {
        let family = T::column_family();
        let mut consolidated = ResultSet::new();

        for clause in clauses {
            debug!(
                "query scan over {}: {} {:?} {}",
                family, clause.field, clause.conditional, clause.value
            );
            let predicate = SlicePredicate::column(clause.field.clone());
            let keyspace = self.client.keyspace().to_string();
            let slices = self.client.worker().do_work("query scan failed", move |rpc| {
                rpc.get_range_slices(
                    &keyspace,
                    family,
                    &predicate,
                    &KeyRange::unbounded(),
                    ConsistencyLevel::All,
                )
            })?;

            let mut clause_results = ResultSet::new();
            for slice in &slices {
                let matched = slice
                    .columns
                    .iter()
                    .find(|column| column.name == clause.field)
                    .map(|column| clause_matches(clause, &column.value))
                    .transpose()
                    .map_err(|e| StoreError::operation("unable to evaluate query clause", e))?
                    .unwrap_or(false);
                if matched {
                    // One additional point fetch per surviving key.
                    clause_results.results.push(self.client.get::<T>(&slice.key)?);
                }
            }
            consolidated = consolidated.or(&clause_results)?;
        }
        Ok(consolidated)
    }
}

/// Evaluate one clause against a decoded column value.
///
/// A value composed entirely of digits compares as an integer, everything
/// else as a string. EQUAL/NOT_EQUAL are string comparisons; the four
/// ordering operators require both sides to be numeric.
fn clause_matches(clause: &QueryClause, value: &str) -> anyhow::Result<bool> {
    match clause.conditional {
        QueryConditional::Equal => Ok(value == clause.value),
        QueryConditional::NotEqual => Ok(value != clause.value),
        ordering => {
            let stored = parse_numeric(value)?;
            let literal = parse_numeric(&clause.value)?;
            Ok(match ordering {
                QueryConditional::GreaterThan => stored > literal,
                QueryConditional::GreaterThanEqual => stored >= literal,
                QueryConditional::LessThan => stored < literal,
                QueryConditional::LessThanEqual => stored <= literal,
                QueryConditional::Equal | QueryConditional::NotEqual => unreachable!(),
            })
        }
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn parse_numeric(value: &str) -> anyhow::Result<i64> {
    if !is_numeric(value) {
        anyhow::bail!("ordering comparison requires a numeric value, got '{value}'");
    }
    Ok(value.parse::<i64>()?)
}
