use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use overdue_report::registry::RegistryClient;
use overdue_report::report::ReportStore;
use overdue_report::telemetry::init_telemetry;
use overdue_report::{AppState, Config, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let telemetry_guard = init_telemetry(&config)?;

    tracing::info!(
        port = config.port,
        environment = %config.environment,
        "Starting overdue-report"
    );

    let registry = Arc::new(RegistryClient::new(
        config.registry_base_url.clone(),
        &config.registry_api_key,
    )?);

    let reports = ReportStore::new(&config.reports_dir);
    tokio::fs::create_dir_all(reports.dir()).await?;

    tracing::info!(
        registry = %config.registry_base_url,
        reports_dir = %reports.dir().display(),
        "Registry client initialized"
    );

    let state = AppState {
        config: config.clone(),
        registry,
        reports,
    };

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    telemetry_guard.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
