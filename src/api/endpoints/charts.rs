//! Chart endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ChartResponse, ChartsResponse};
use crate::charts::LOAD_ERROR_TITLE;
use crate::dashboard::ChartBundle;
use crate::filters::{DashboardFilter, FilterParams};

/// `GET /api/charts`: monthly trend, distribution and (for camera and
/// educating-nurse selections) the nurse-wise trend.
pub async fn bundle(
    State(ctx): State<ApiContext>,
    Query(params): Query<FilterParams>,
) -> Result<(StatusCode, Json<ChartsResponse>), ApiError> {
    let filter = DashboardFilter::parse(&params)?;
    tracing::debug!(
        escalation = filter.escalation.label(),
        exclude_camera = filter.exclude_camera,
        "Chart request"
    );

    match ctx.dashboard.charts(&filter).await {
        Ok(bundle) => Ok((StatusCode::OK, Json(ChartsResponse::from_bundle(&bundle)?))),
        Err(e) => {
            tracing::error!(error = %e, "Chart data failed");
            let mut body = ChartsResponse::from_bundle(&ChartBundle::notice(LOAD_ERROR_TITLE))?;
            body.error = Some(e.to_string());
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)))
        }
    }
}

/// `GET /api/charts/impact-score`
pub async fn impact_score(
    State(ctx): State<ApiContext>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ChartResponse>, ApiError> {
    let filter = DashboardFilter::parse(&params)?;
    let figure = ctx.dashboard.impact_score_chart(&filter).await?;
    Ok(Json(ChartResponse {
        chart: figure.to_json()?,
    }))
}

/// `GET /api/charts/camera-roles`: always the last 30 days.
pub async fn camera_roles(
    State(ctx): State<ApiContext>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ChartResponse>, ApiError> {
    let filter = DashboardFilter::parse(&params)?;
    let figure = ctx.dashboard.camera_user_role_chart(&filter).await?;
    Ok(Json(ChartResponse {
        chart: figure.to_json()?,
    }))
}
