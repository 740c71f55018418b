use std::net::SocketAddr;
use std::process::ExitCode;

use pgpulse::app;
use pgpulse::config::{AppConfig, LogFormat};
use pgpulse::db::{DbHandle, PgConnector};
use pgpulse::telemetry::init_tracing;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    init_tracing(LogFormat::from_env());
    let config = AppConfig::from_env();
    info!(?config, "Configuration loaded");

    let db = DbHandle::new(config.query_timeout);
    let connector = PgConnector::new(config.database.connect_options());
    let establish_task = db.spawn_establish(connector, config.retry);

    // The connection task runs alongside the server; `/api/ready` reports on it.
    tokio::spawn(async move {
        if let Err(e) = establish_task.await {
            error!(?e, "Database connection task aborted");
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, ?e, "Failed to bind listen address");
            return ExitCode::FAILURE;
        }
    };

    info!("Server starting at http://{}", addr);

    let served = axum::serve(listener, app(db.clone()).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;

    match served {
        Ok(()) => {
            info!("Server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(?e, "Server error");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => warn!("Received SIGTERM, initiating graceful shutdown"),
    }
}
