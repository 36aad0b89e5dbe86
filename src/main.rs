use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match escalation_dashboard::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("escalation-dashboard: {e}");
            ExitCode::FAILURE
        }
    }
}
