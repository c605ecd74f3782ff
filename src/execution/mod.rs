//! Query execution.
//!
//! Runs generated statements, saved query text and guarded raw text against
//! a [`GraphStore`], and gives typed access to the rows that come back.

pub mod guard;

use std::collections::HashMap;

use crate::cypher::Statement;
use crate::model::*;
use crate::storage::GraphStore;
use crate::{Error, Result};

pub use guard::WriteGuard;

/// Query execution result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Projected column names, in RETURN order.
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl QueryResult {
    /// Build a result from positional rows.
    pub fn from_rows<C, R>(columns: impl IntoIterator<Item = C>, rows: impl IntoIterator<Item = R>) -> Self
    where
        C: Into<String>,
        R: IntoIterator<Item = Value>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| ResultRow { values: columns.iter().cloned().zip(row).collect() })
            .collect();
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row values in column order, skipping columns a row does not carry.
    pub fn ordered_values<'a>(&'a self, row: &'a ResultRow) -> impl Iterator<Item = &'a Value> + 'a {
        self.columns.iter().filter_map(move |c| row.values.get(c))
    }
}

/// A single row in the result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    pub values: HashMap<String, Value>,
}

impl ResultRow {
    /// Get a typed value from the row.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T> {
        let val = self.values.get(key)
            .ok_or_else(|| Error::NotFound(format!("Column '{key}'")))?;
        T::from_value(val)
    }

    /// Like [`get`](Self::get), but a missing column reads as `Null`.
    pub fn get_or_null<T: FromValue>(&self, key: &str) -> Result<T> {
        T::from_value(self.values.get(key).unwrap_or(&Value::Null))
    }
}

/// Convert from Value to concrete types.
pub trait FromValue: Sized {
    fn from_value(val: &Value) -> Result<Self>;
}

fn type_error(expected: &str, val: &Value) -> Error {
    Error::TypeError { expected: expected.into(), got: val.type_name().into() }
}

impl FromValue for Value {
    fn from_value(val: &Value) -> Result<Self> {
        Ok(val.clone())
    }
}

impl FromValue for Node {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Node(n) => Ok(*n.clone()),
            _ => Err(type_error("Node", val)),
        }
    }
}

impl FromValue for Relationship {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Relationship(r) => Ok(*r.clone()),
            _ => Err(type_error("Relationship", val)),
        }
    }
}

impl FromValue for String {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::String(s) => Ok(s.clone()),
            _ => Err(type_error("String", val)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(val: &Value) -> Result<Self> {
        val.as_int().ok_or_else(|| type_error("Integer", val))
    }
}

impl FromValue for u64 {
    fn from_value(val: &Value) -> Result<Self> {
        val.as_int()
            .and_then(|i| u64::try_from(i).ok())
            .ok_or_else(|| type_error("non-negative Integer", val))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => Err(type_error("List", val)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Run a generated statement with its bound parameters.
pub async fn run_statement<G: GraphStore + ?Sized>(store: &G, statement: &Statement) -> Result<QueryResult> {
    let cypher = statement.cypher();
    tracing::debug!(query = %cypher, params = statement.parameters.len(), "running generated statement");
    store.run_read(&cypher, statement.parameters.clone()).await
}

/// Run stored query text as-is, with no parameters.
pub async fn run_saved<G: GraphStore + ?Sized>(store: &G, cypher: &str) -> Result<QueryResult> {
    tracing::info!(query = %cypher, "executing saved query");
    store.run_read(cypher, PropertyMap::new()).await
}

/// Run ad-hoc query text after the write-keyword guard accepts it.
pub async fn run_raw<G: GraphStore + ?Sized>(store: &G, guard: &WriteGuard, cypher: &str) -> Result<QueryResult> {
    guard.check(cypher)?;
    tracing::info!(query = %cypher, "executing raw query");
    store.run_read(cypher, PropertyMap::new()).await
}
