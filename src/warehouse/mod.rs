//! Warehouse access: the "run this SQL, get back rows" seam.
//!
//! Everything above this module builds SQL text and consumes `QueryResult`.
//! `BigQueryClient` is the production implementation; tests use
//! `mock::MockWarehouse`, which records submitted statements.

mod auth;
mod bigquery;
#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

pub use auth::TokenSource;
pub use bigquery::BigQueryClient;

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("Warehouse returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed warehouse response: {0}")]
    ResponseParsing(String),
    #[error("Cannot obtain access token: {0}")]
    Credentials(String),
    #[error("Query did not complete within {0}s")]
    Timeout(u64),
}

// ═══════════════════════════════════════════════════════════
// Trait
// ═══════════════════════════════════════════════════════════

/// A read-only analytical warehouse.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Run one standard-SQL statement and collect every result row.
    async fn query(&self, sql: &str) -> Result<QueryResult, WarehouseError>;
}

#[async_trait]
impl<W: Warehouse + ?Sized> Warehouse for Arc<W> {
    async fn query(&self, sql: &str) -> Result<QueryResult, WarehouseError> {
        (**self).query(sql).await
    }
}

// ═══════════════════════════════════════════════════════════
// Result set
// ═══════════════════════════════════════════════════════════

/// Column-named result set. An empty result from a failed lookup has no
/// columns; an empty result from a real query keeps its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, values: Vec<Vec<Value>>) -> Self {
        let columns: Arc<[String]> = columns.into();
        let rows = values
            .into_iter()
            .map(|values| Row {
                columns: Arc::clone(&columns),
                values,
            })
            .collect();
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for QueryResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// One result row with typed, name-based accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn value(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Cell rendered as text. `None` for NULL or a missing column.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.value(column)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn integer(&self, column: &str) -> Option<i64> {
        match self.value(column)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn float(&self, column: &str) -> Option<f64> {
        match self.value(column)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Calendar date from a DATE cell or the date part of a timestamp.
    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        let text = self.text(column)?;
        let head = text.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> QueryResult {
        QueryResult::new(
            vec!["date".into(), "escalation_observation".into(), "count".into()],
            vec![
                vec![json!("2025-03-01"), json!("Gasping"), json!(4)],
                vec![json!("2025-04-01T10:00:00+00:00"), Value::Null, json!("7")],
            ],
        )
    }

    #[test]
    fn columns_and_rows_are_exposed() {
        let result = sample();
        assert_eq!(result.len(), 2);
        assert!(result.has_column("count"));
        assert!(!result.has_column("hospital_name"));
        assert_eq!(result.columns()[1], "escalation_observation");
    }

    #[test]
    fn typed_accessors_coerce_cells() {
        let result = sample();
        let first = &result.rows()[0];
        assert_eq!(first.text("escalation_observation").as_deref(), Some("Gasping"));
        assert_eq!(first.integer("count"), Some(4));
        assert_eq!(first.float("count"), Some(4.0));
        assert_eq!(first.date("date"), NaiveDate::from_ymd_opt(2025, 3, 1));

        let second = &result.rows()[1];
        assert_eq!(second.text("escalation_observation"), None);
        assert_eq!(second.integer("count"), Some(7));
        assert_eq!(second.date("date"), NaiveDate::from_ymd_opt(2025, 4, 1));
    }

    #[test]
    fn missing_column_yields_none() {
        let result = sample();
        assert_eq!(result.rows()[0].text("nope"), None);
        assert_eq!(result.rows()[0].integer("nope"), None);
    }

    #[test]
    fn empty_result_has_no_columns() {
        let result = QueryResult::empty();
        assert!(result.is_empty());
        assert!(result.columns().is_empty());
    }
}
