use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smaawa_monitor::common::AppState;
use smaawa_monitor::config::Config;
use smaawa_monitor::refresh;
use smaawa_monitor::routes;
use smaawa_monitor::smaawa::SmaawaClient;
use smaawa_monitor::store::{FileStore, LocationStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,smaawa_monitor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting smaawa-monitor...");

    let config = Config::from_env()?;
    tracing::info!(
        deployment = ?config.deployment,
        api_base = %config.api_base_url,
        refresh_interval = config.refresh_interval_seconds,
        host = %config.api_host,
        port = config.api_port,
        "Configuration loaded"
    );

    let client = SmaawaClient::new(&config)?;

    let locations = LocationStore::load(Box::new(FileStore::new(&config.location_store_path)));
    tracing::info!(path = %config.location_store_path.display(), "Location store opened");

    let state = AppState::new(config.clone(), client, locations);

    tokio::spawn(refresh::scheduler::run_refresh_loop(state.clone()));

    let app = routes::build_router(state);

    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
