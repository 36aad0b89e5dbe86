//! Dashboard HTTP API.
//!
//! Exposes the dashboard service as JSON endpoints for the browser page.
//! Routes are nested under `/api/`; `dashboard_router()` returns a `Router`
//! that `server::serve` mounts.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::dashboard_router;
pub use server::{serve, ServerError};
pub use types::ApiContext;
