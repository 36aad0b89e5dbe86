//! API middleware.
//!
//! Execution order (outermost → innermost):
//! 1. Request log: request id, method, path, status, latency
//! 2. `Cache-Control: no-store` (set in the router via tower-http)

pub mod request_log;
