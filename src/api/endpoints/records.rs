//! Filtered record listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, FilterResponse};
use crate::filters::{DashboardFilter, FilterParams};
use crate::records::{RecordTable, ERROR_ROW_HTML};

/// `GET /api/filter`: HTML table of up to 1000 matching records.
///
/// Warehouse failures still answer with the table shape (an error row and
/// no columns) so the page can render them in place.
pub async fn filter(
    State(ctx): State<ApiContext>,
    Query(params): Query<FilterParams>,
) -> Result<(StatusCode, Json<FilterResponse>), ApiError> {
    let filter = DashboardFilter::parse(&params)?;

    match ctx.dashboard.filtered_records(&filter).await {
        Ok(result) => {
            let table = RecordTable::project(&result, &filter.escalation);
            tracing::debug!(
                escalation = filter.escalation.label(),
                rows = table.row_count(),
                columns = table.columns.len(),
                "Record table built"
            );
            Ok((
                StatusCode::OK,
                Json(FilterResponse {
                    table_html: table.to_html(),
                    row_count: table.row_count(),
                    columns: table.columns,
                    error: None,
                }),
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "Record listing failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FilterResponse {
                    table_html: ERROR_ROW_HTML.to_string(),
                    row_count: 0,
                    columns: Vec::new(),
                    error: Some(e.to_string()),
                }),
            ))
        }
    }
}
