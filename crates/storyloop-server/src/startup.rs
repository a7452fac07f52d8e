//! Server startup utilities.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use storyloop_config::ObservabilityConfig;
use storyloop_core::{StoryError, StoryResult};
use tokio::signal;
use tracing::{info, warn};

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
   _____ __                   __
  / ___// /_____  _______  __/ /___  ____  ____
  \__ \/ __/ __ \/ ___/ / / / / __ \/ __ \/ __ \
 ___/ / /_/ /_/ / /  / /_/ / / /_/ / /_/ / /_/ /
/____/\__/\____/_/   \__, /_/\____/\____/ .___/
                    /____/             /_/
    "#
    );
}

/// Prints server startup information.
pub fn print_startup_info(addr: &str) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}/api/v1", addr);
    info!("Health:    http://{}/health", addr);
    info!("Metrics:   http://{}/metrics", addr);
    info!("API Docs:  http://{}/swagger-ui", addr);
    info!("{}", separator);
}

/// Installs the Prometheus recorder and registers the application counters.
///
/// Returns `None` when metrics are disabled.
pub fn init_metrics(config: &ObservabilityConfig) -> StoryResult<Option<PrometheusHandle>> {
    if !config.metrics_enabled {
        info!("Metrics disabled");
        return Ok(None);
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| StoryError::Configuration(format!("Failed to install metrics recorder: {}", e)))?;
    storyloop_service::register_metrics();
    Ok(Some(handle))
}

/// Resolves when the process is asked to stop.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_metrics_install_nothing() {
        let config = ObservabilityConfig {
            metrics_enabled: false,
            ..ObservabilityConfig::default()
        };
        assert!(init_metrics(&config).unwrap().is_none());
    }
}
