//! Shared state and response bodies for the dashboard API.

use std::sync::Arc;

use serde::Serialize;

use crate::charts::Figure;
use crate::dashboard::{ChartBundle, Dashboard, FilterOptions};

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub dashboard: Arc<Dashboard>,
}

impl ApiContext {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub table_html: String,
    pub row_count: usize,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Figures travel as JSON strings; the page script `JSON.parse`s each one.
#[derive(Debug, Serialize)]
pub struct ChartsResponse {
    pub monthly_trend: String,
    pub escalation_dist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurse_wise_trend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChartsResponse {
    pub fn from_bundle(bundle: &ChartBundle) -> Result<Self, serde_json::Error> {
        Ok(Self {
            monthly_trend: bundle.monthly_trend.to_json()?,
            escalation_dist: bundle.escalation_dist.to_json()?,
            nurse_wise_trend: bundle
                .nurse_wise_trend
                .as_ref()
                .map(Figure::to_json)
                .transpose()?,
            error: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub chart: String,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub filter_options: FilterOptions,
    pub monthly_trend: String,
    pub escalation_dist: String,
}
