//! Request logging middleware.
//!
//! Tags every request with a fresh request id, echoes it back in
//! `X-Request-Id`, and logs method, path, status and latency once the
//! handler has answered.

use std::time::Instant;

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

pub async fn log_request(req: Request<axum::body::Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%request_id, %method, %path, status, latency_ms, "Request failed");
    } else {
        tracing::info!(%request_id, %method, %path, status, latency_ms, "Request served");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
