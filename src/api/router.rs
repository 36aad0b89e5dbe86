//! Dashboard API router.
//!
//! Routes are nested under `/api/`. Middleware stack (outermost → innermost):
//! 1. Request log → 2. `Cache-Control: no-store`

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::dashboard::Dashboard;

/// Build the dashboard API router over `dashboard`.
pub fn dashboard_router(dashboard: Dashboard) -> Router {
    build_router(ApiContext::new(dashboard))
}

fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/filter", get(endpoints::records::filter))
        .route("/filter-options", get(endpoints::options::filter_options))
        .route("/overview", get(endpoints::options::overview))
        .route("/charts", get(endpoints::charts::bundle))
        .route("/charts/impact-score", get(endpoints::charts::impact_score))
        .route("/charts/camera-roles", get(endpoints::charts::camera_roles))
        .with_state(ctx)
        // Innermost first, outermost last
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(axum::middleware::from_fn(middleware::request_log::log_request));

    Router::new().nest("/api", api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::TableRefs;
    use crate::warehouse::mock::{result, MockWarehouse};

    fn app(mock: MockWarehouse) -> (Router, Arc<MockWarehouse>) {
        let mock = Arc::new(mock);
        let dashboard = Dashboard::new(mock.clone(), TableRefs::default());
        (dashboard_router(dashboard), mock)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_version_and_headers() {
        let (app, _) = app(MockWarehouse::new());
        let response = app.oneshot(get_request("/api/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
        assert!(response.headers().contains_key("X-Request-Id"));

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn filter_returns_table_for_impact_cases() {
        let mock = MockWarehouse::new().respond(
            "impact_cases",
            result(
                &["impact_score", "email_address", "unrelated"],
                vec![vec![json!(5), json!("n@h.org"), json!("x")]],
            ),
        );
        let (app, mock) = app(mock);

        let response = app
            .oneshot(get_request("/api/filter?escalation=Impact%20Cases&email=n%40h.org"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["row_count"], 1);
        assert_eq!(json["columns"], json!(["email_address", "impact_score"]));
        assert!(json["table_html"].as_str().unwrap().contains("<td>n@h.org</td>"));
        assert!(json.get("error").is_none());
        assert!(mock.queries()[0].contains("email_address = 'n@h.org'"));
    }

    #[tokio::test]
    async fn filter_failure_returns_error_row() {
        let (app, _) = app(MockWarehouse::failing("quota exceeded"));
        let response = app.oneshot(get_request("/api/filter")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["row_count"], 0);
        assert_eq!(json["columns"], json!([]));
        assert!(json["table_html"].as_str().unwrap().contains("Error loading data"));
        assert!(json["error"].as_str().unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn malformed_date_is_rejected_without_querying() {
        let (app, mock) = app(MockWarehouse::new());
        let response = app
            .oneshot(get_request("/api/charts?date=2025-13-45"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(mock.queries().is_empty());
    }

    #[tokio::test]
    async fn charts_are_json_strings() {
        let (app, _) = app(MockWarehouse::new());
        let response = app.oneshot(get_request("/api/charts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let trend: Value = serde_json::from_str(json["monthly_trend"].as_str().unwrap()).unwrap();
        assert_eq!(trend["layout"]["title"]["text"], "Monthly Escalation Trends");
        assert!(json.get("nurse_wise_trend").is_none());
    }

    #[tokio::test]
    async fn excluded_camera_charts_are_notices() {
        let (app, mock) = app(MockWarehouse::new());
        let response = app
            .oneshot(get_request(
                "/api/charts?escalation=Camera+Annotation+Events&exclude_camera=true",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        for key in ["monthly_trend", "escalation_dist", "nurse_wise_trend"] {
            let figure: Value = serde_json::from_str(json[key].as_str().unwrap()).unwrap();
            assert_eq!(
                figure["layout"]["title"]["text"],
                "No data (Camera Annotations excluded)"
            );
        }
        assert!(mock.queries().is_empty());
    }

    #[tokio::test]
    async fn chart_failure_returns_error_figures() {
        let (app, _) = app(MockWarehouse::failing("timeout"));
        let response = app.oneshot(get_request("/api/charts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        let figure: Value = serde_json::from_str(json["escalation_dist"].as_str().unwrap()).unwrap();
        assert_eq!(figure["layout"]["title"]["text"], "Error loading chart data");
        assert!(json["nurse_wise_trend"].is_string());
        assert!(json["error"].as_str().unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn filter_options_lists_pseudo_escalations() {
        let (app, _) = app(MockWarehouse::new());
        let response = app.oneshot(get_request("/api/filter-options")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(
            json["escalations"],
            json!(["Impact Cases", "Camera Annotation Events"])
        );
    }

    #[tokio::test]
    async fn filter_options_failure_is_structured() {
        let (app, _) = app(MockWarehouse::failing("denied"));
        let response = app.oneshot(get_request("/api/filter-options")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "WAREHOUSE_ERROR");
    }

    #[tokio::test]
    async fn overview_returns_options_and_charts() {
        let (app, _) = app(MockWarehouse::new());
        let response = app.oneshot(get_request("/api/overview")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json["filter_options"]["escalations"].is_array());
        assert!(json["monthly_trend"].is_string());
        assert!(json["escalation_dist"].is_string());
    }

    #[tokio::test]
    async fn single_chart_endpoints() {
        let mock = MockWarehouse::new().respond(
            "SELECT user_role",
            result(&["user_role", "count"], vec![vec![json!("nurse"), json!(2)]]),
        );
        let (app, _) = app(mock);

        let response = app
            .clone()
            .oneshot(get_request("/api/charts/camera-roles"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let chart: Value = serde_json::from_str(json["chart"].as_str().unwrap()).unwrap();
        assert_eq!(chart["data"][0]["x"], json!(["nurse"]));

        let response = app
            .oneshot(get_request("/api/charts/impact-score"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn single_charts_skip_warehouse_when_camera_excluded() {
        let (app, mock) = app(MockWarehouse::failing("must not be called"));
        for uri in [
            "/api/charts/camera-roles?escalation=Camera+Annotation+Events&exclude_camera=true",
            "/api/charts/impact-score?escalation=Camera+Annotation+Events&exclude_camera=true",
        ] {
            let response = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            let chart: Value = serde_json::from_str(json["chart"].as_str().unwrap()).unwrap();
            assert_eq!(chart["data"], json!([]));
        }
        assert!(mock.queries().is_empty());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _) = app(MockWarehouse::new());
        let response = app.oneshot(get_request("/api/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
