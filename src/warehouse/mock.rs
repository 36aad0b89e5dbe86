//! In-memory warehouse for tests: canned results keyed by SQL fragments.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{QueryResult, Warehouse, WarehouseError};

#[derive(Default)]
pub struct MockWarehouse {
    responses: Vec<(String, QueryResult)>,
    failure: Option<String>,
    log: Mutex<Vec<String>>,
}

impl MockWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any statement containing `needle` with `result`.
    /// The first matching registration wins.
    pub fn respond(mut self, needle: &str, result: QueryResult) -> Self {
        self.responses.push((needle.to_string(), result));
        self
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Every statement submitted so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Warehouse for MockWarehouse {
    async fn query(&self, sql: &str) -> Result<QueryResult, WarehouseError> {
        if let Ok(mut log) = self.log.lock() {
            log.push(sql.to_string());
        }
        if let Some(message) = &self.failure {
            return Err(WarehouseError::Http(message.clone()));
        }
        Ok(self
            .responses
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default())
    }
}

/// Build a result set from string column names and JSON rows.
pub fn result(columns: &[&str], rows: Vec<Vec<Value>>) -> QueryResult {
    QueryResult::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}
