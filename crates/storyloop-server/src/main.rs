//! # Storyloop Server
//!
//! Main entry point: loads configuration, wires the application and
//! serves the REST API until a shutdown signal arrives.

use anyhow::Context;
use std::net::SocketAddr;
use storyloop_config::ConfigLoader;
use storyloop_core::telemetry::{init_telemetry, shutdown_telemetry};
use storyloop_rest::create_router;
use storyloop_server::{
    di::AppContainer,
    startup::{init_metrics, print_banner, print_startup_info, shutdown_signal},
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {:#}", e);
        eprintln!("Application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config_loader = ConfigLoader::from_default_location().context("loading configuration")?;
    let config = config_loader.get().await;

    init_telemetry(&config.observability.telemetry(&config.app.name)).context("initializing telemetry")?;
    print_banner();
    info!("Starting Storyloop Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);
    info!("Storage backend: {:?}", config.database.backend);

    let metrics = init_metrics(&config.observability)?;
    let container = AppContainer::build(&config, metrics).await.context("wiring application")?;
    let router = create_router(container.state.clone(), &config.server, container.throttle.clone());

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    print_startup_info(&addr);

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    container.shutdown().await;
    shutdown_telemetry();
    info!("Server shutdown complete");
    Ok(())
}
