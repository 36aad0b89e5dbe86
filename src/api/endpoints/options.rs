//! Dropdown options and the landing-page overview.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, OverviewResponse};
use crate::dashboard::FilterOptions;

/// `GET /api/filter-options`
pub async fn filter_options(
    State(ctx): State<ApiContext>,
) -> Result<Json<FilterOptions>, ApiError> {
    Ok(Json(ctx.dashboard.filter_options().await?))
}

/// `GET /api/overview`: options plus charts for the last 90 days.
pub async fn overview(State(ctx): State<ApiContext>) -> Result<Json<OverviewResponse>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let overview = ctx.dashboard.overview(today).await?;

    Ok(Json(OverviewResponse {
        filter_options: overview.filter_options,
        monthly_trend: overview.monthly_trend.to_json()?,
        escalation_dist: overview.escalation_dist.to_json()?,
    }))
}
