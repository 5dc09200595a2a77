//! Startup orchestration.
//!
//! Builds the metrics registry, launches registration as an independent
//! task, then binds the listener and serves. Registration can neither delay
//! nor prevent the listener from starting.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics::MetricsRegistry;
use crate::registration::{Registrar, RegistrationReport};

/// Fatal startup errors. Registration problems are never among them.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build metrics registry: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the service until `shutdown` fires.
pub async fn run(
    config: ServiceConfig,
    register: bool,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    let metrics = Arc::new(MetricsRegistry::new()?);

    if register && config.registration.enabled {
        spawn_registration(&config, metrics.clone());
    } else {
        tracing::info!("Scrape target registration disabled");
    }

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    HttpServer::new(config, metrics)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}

/// Launch the registration pipeline on its own task.
///
/// Returns `None` when the registrar cannot be built; the error is logged.
pub fn spawn_registration(
    config: &ServiceConfig,
    metrics: Arc<MetricsRegistry>,
) -> Option<JoinHandle<RegistrationReport>> {
    let registrar = match Registrar::new(&config.registration, config.listener.port, metrics) {
        Ok(registrar) => registrar,
        Err(e) => {
            tracing::error!(error = %e, "Scrape target registration skipped");
            return None;
        }
    };

    Some(tokio::spawn(async move {
        let report = registrar.register().await;
        tracing::debug!(
            target_address = %report.address,
            complete = report.is_complete(),
            "Registration finished"
        );
        report
    }))
}
