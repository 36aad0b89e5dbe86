pub mod aggregate; // Monthly merge, stats, top-N
pub mod api; // HTTP endpoints
pub mod charts; // Plotly figures
pub mod config;
pub mod dashboard; // Filter → queries → charts
pub mod filters;
pub mod records; // Record table layouts
pub mod sql;
pub mod warehouse; // BigQuery client

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Warehouse(#[from] warehouse::WarehouseError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Load configuration, connect the warehouse client and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    let config = config::AppConfig::from_env();
    let development = config.as_ref().map(|c| c.development).unwrap_or(false);

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter(development))),
        )
        .init();

    let config = config?;
    tracing::info!(
        "{} starting v{}",
        config::APP_NAME,
        config::APP_VERSION
    );
    tracing::info!(
        project = %config.warehouse.project,
        nursing = %config.tables.nursing_pod,
        impact = %config.tables.impact_cases,
        camera = %config.tables.camera_events,
        "Warehouse tables"
    );

    let client = warehouse::BigQueryClient::new(&config.warehouse).await?;
    let dashboard = dashboard::Dashboard::new(Arc::new(client), config.tables.clone());

    api::serve(&config.bind_addr(), api::dashboard_router(dashboard)).await?;
    Ok(())
}
