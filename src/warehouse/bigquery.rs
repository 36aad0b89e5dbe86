//! BigQuery REST client (`jobs.query` + `jobs.getQueryResults`).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::auth::TokenSource;
use super::{QueryResult, Warehouse, WarehouseError};
use crate::config::WarehouseConfig;

/// Server-side wait per request before BigQuery answers `jobComplete: false`.
const POLL_WAIT_MS: u64 = 10_000;
const PAGE_SIZE: u32 = 10_000;

pub struct BigQueryClient {
    http: reqwest::Client,
    endpoint: String,
    project: String,
    location: Option<String>,
    timeout: Duration,
    tokens: TokenSource,
}

// ── Wire types ──────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
    max_results: u32,
    request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    schema: Option<TableSchema>,
    job_reference: Option<JobReference>,
    #[serde(default)]
    rows: Vec<TableRow>,
    page_token: Option<String>,
    job_complete: Option<bool>,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

impl QueryResponse {
    fn is_complete(&self) -> bool {
        self.job_complete.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, Deserialize)]
struct FieldSchema {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    message: String,
}

// ── Client ──────────────────────────────────────────────

impl BigQueryClient {
    pub async fn new(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        let tokens = TokenSource::from_config(config).await?;
        tracing::info!(credentials = tokens.kind(), project = %config.project, "BigQuery client ready");
        Self::with_tokens(config, tokens)
    }

    pub fn with_tokens(config: &WarehouseConfig, tokens: TokenSource) -> Result<Self, WarehouseError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.timeout + Duration::from_millis(POLL_WAIT_MS))
            .build()
            .map_err(|e| WarehouseError::Http(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            project: config.project.clone(),
            location: config.location.clone(),
            timeout: config.timeout,
            tokens,
        })
    }

    fn queries_url(&self) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/queries",
            self.endpoint, self.project
        )
    }

    async fn submit(&self, sql: &str) -> Result<QueryResponse, WarehouseError> {
        let body = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            timeout_ms: POLL_WAIT_MS,
            max_results: PAGE_SIZE,
            request_id: Uuid::new_v4().to_string(),
            location: self.location.as_deref(),
        };
        let request = self.http.post(self.queries_url()).json(&body);
        self.send(request).await
    }

    async fn fetch_results(
        &self,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> Result<QueryResponse, WarehouseError> {
        let url = format!("{}/{}", self.queries_url(), job.job_id);
        let mut params: Vec<(&str, String)> = vec![
            ("timeoutMs", POLL_WAIT_MS.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        if let Some(location) = job.location.as_deref().or(self.location.as_deref()) {
            params.push(("location", location.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let request = self.http.get(url).query(&params);
        self.send(request).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<QueryResponse, WarehouseError> {
        let token = self.tokens.token().await?;
        let response = request.bearer_auth(token).send().await.map_err(|e| {
            if e.is_timeout() {
                WarehouseError::Timeout(self.timeout.as_secs())
            } else {
                WarehouseError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WarehouseError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<QueryResponse>()
            .await
            .map_err(|e| WarehouseError::ResponseParsing(e.to_string()))
    }
}

#[async_trait]
impl Warehouse for BigQueryClient {
    async fn query(&self, sql: &str) -> Result<QueryResult, WarehouseError> {
        let started = Instant::now();
        let mut page = self.submit(sql).await?;

        if !page.is_complete() {
            let job = page.job_reference.clone().ok_or_else(|| {
                WarehouseError::ResponseParsing("incomplete job without jobReference".into())
            })?;
            while !page.is_complete() {
                if started.elapsed() > self.timeout {
                    return Err(WarehouseError::Timeout(self.timeout.as_secs()));
                }
                tracing::debug!(job_id = %job.job_id, "Waiting for query job");
                page = self.fetch_results(&job, None).await?;
            }
        }

        for warning in &page.errors {
            tracing::warn!(message = %warning.message, "Warehouse reported a job message");
        }

        let schema = page.schema.clone().ok_or_else(|| {
            WarehouseError::ResponseParsing("completed job without schema".into())
        })?;
        let mut values = decode_rows(&schema, &page.rows)?;

        while let Some(token) = page.page_token.take() {
            let job = page.job_reference.clone().ok_or_else(|| {
                WarehouseError::ResponseParsing("paged result without jobReference".into())
            })?;
            page = self.fetch_results(&job, Some(&token)).await?;
            values.extend(decode_rows(&schema, &page.rows)?);
            if page.job_reference.is_none() {
                page.job_reference = Some(job);
            }
        }

        let columns = schema.fields.iter().map(|f| f.name.clone()).collect();
        tracing::debug!(
            rows = values.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Warehouse query finished"
        );
        Ok(QueryResult::new(columns, values))
    }
}

// ── Cell decoding ───────────────────────────────────────

fn decode_rows(schema: &TableSchema, rows: &[TableRow]) -> Result<Vec<Vec<Value>>, WarehouseError> {
    rows.iter()
        .map(|row| {
            if row.f.len() != schema.fields.len() {
                return Err(WarehouseError::ResponseParsing(format!(
                    "row has {} cells, schema has {} fields",
                    row.f.len(),
                    schema.fields.len()
                )));
            }
            Ok(schema
                .fields
                .iter()
                .zip(&row.f)
                .map(|(field, cell)| decode_field(field, &cell.v))
                .collect())
        })
        .collect()
}

fn decode_field(field: &FieldSchema, raw: &Value) -> Value {
    if field.mode.as_deref() == Some("REPEATED") {
        if let Value::Array(items) = raw {
            return Value::Array(
                items
                    .iter()
                    .map(|item| coerce_scalar(&field.field_type, item.get("v").unwrap_or(item)))
                    .collect(),
            );
        }
    }
    coerce_scalar(&field.field_type, raw)
}

/// BigQuery's REST API returns every scalar as a string.
fn coerce_scalar(field_type: &str, raw: &Value) -> Value {
    let Value::String(text) = raw else {
        return raw.clone();
    };
    match field_type {
        "INTEGER" | "INT64" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| raw.clone()),
        "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => text
            .parse::<f64>()
            .ok()
            .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
            .unwrap_or_else(|| raw.clone()),
        "BOOLEAN" | "BOOL" => match text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => raw.clone(),
        },
        "TIMESTAMP" => timestamp_to_rfc3339(text).map(Value::String).unwrap_or_else(|| raw.clone()),
        _ => raw.clone(),
    }
}

fn timestamp_to_rfc3339(epoch_seconds: &str) -> Option<String> {
    let secs = epoch_seconds.parse::<f64>().ok()?;
    let micros = (secs * 1_000_000.0).round() as i64;
    let dt = DateTime::from_timestamp_micros(micros)?;
    Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
