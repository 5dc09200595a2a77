//! Scrape target self-registration.
//!
//! # Data Flow
//! ```text
//! address.rs (pick advertised host:port)
//!     → scrape_config.rs (add target to the job's first target group)
//!     → reload.rs (POST the collector's reload endpoint)
//! ```
//!
//! # Design Decisions
//! - Runs once per process, independently of the HTTP listener
//! - Every failure is logged and recorded; none is returned to the process
//! - Reload is sent only after the target is known to be in the file
//!   (added or already present); a missing job skips it

pub mod address;
pub mod reload;
pub mod scrape_config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

use crate::config::RegistrationConfig;
use crate::observability::metrics::MetricsRegistry;

pub use address::NetworkAddress;
pub use reload::{ReloadError, ReloadNotifier};
pub use scrape_config::{ScrapeConfigError, TargetChange};

/// Outcome of one registration run.
#[derive(Debug)]
pub struct RegistrationReport {
    pub address: NetworkAddress,
    pub mutation: Result<TargetChange, ScrapeConfigError>,
    /// `None` when the reload was skipped.
    pub reload: Option<Result<StatusCode, ReloadError>>,
}

impl RegistrationReport {
    /// Target is in the scrape config and the collector accepted the reload.
    pub fn is_complete(&self) -> bool {
        self.mutation.is_ok()
            && matches!(&self.reload, Some(Ok(status)) if status.is_success())
    }
}

/// Runs the resolve → mutate → reload pipeline.
pub struct Registrar {
    scrape_config_path: PathBuf,
    job_name: String,
    port: u16,
    notifier: ReloadNotifier,
    metrics: Arc<MetricsRegistry>,
}

impl Registrar {
    pub fn new(
        config: &RegistrationConfig,
        port: u16,
        metrics: Arc<MetricsRegistry>,
    ) -> Result<Self, ReloadError> {
        let notifier = ReloadNotifier::new(
            &config.reload_url,
            Duration::from_secs(config.reload_timeout_secs),
        )?;
        Ok(Self {
            scrape_config_path: PathBuf::from(&config.scrape_config_path),
            job_name: config.job_name.clone(),
            port,
            notifier,
            metrics,
        })
    }

    /// Register this instance using the host's interfaces.
    pub async fn register(&self) -> RegistrationReport {
        let address = address::resolve(self.port);
        tracing::info!(target_address = %address, "Detected target address");
        self.register_address(address).await
    }

    /// Register an already-resolved address.
    pub async fn register_address(&self, address: NetworkAddress) -> RegistrationReport {
        let mutation = self.mutate(&address).await;

        match &mutation {
            Ok(change) => {
                self.metrics.record_registration(change.as_str());
                tracing::info!(
                    target_address = %address,
                    job = %self.job_name,
                    path = %self.scrape_config_path.display(),
                    change = change.as_str(),
                    "Scrape config updated"
                );
            }
            Err(e) => {
                self.metrics.record_registration(e.kind());
                tracing::error!(
                    target_address = %address,
                    job = %self.job_name,
                    error = %e,
                    "Scrape target registration failed"
                );
            }
        }

        let reload = match mutation {
            Ok(_) => Some(self.reload().await),
            Err(_) => None,
        };

        RegistrationReport {
            address,
            mutation,
            reload,
        }
    }

    /// File I/O runs on the blocking pool so serving is not stalled.
    async fn mutate(&self, address: &NetworkAddress) -> Result<TargetChange, ScrapeConfigError> {
        let path = self.scrape_config_path.clone();
        let job_name = self.job_name.clone();
        let target = address.to_string();

        tokio::task::spawn_blocking(move || {
            scrape_config::register_target(&path, &job_name, &target)
        })
        .await?
    }

    async fn reload(&self) -> Result<StatusCode, ReloadError> {
        let result = self.notifier.notify().await;
        match &result {
            Ok(status) if status.is_success() => {
                tracing::info!(url = %self.notifier.url(), status = %status, "Collector reload triggered");
            }
            Ok(status) => {
                tracing::warn!(url = %self.notifier.url(), status = %status, "Collector rejected reload");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error triggering collector reload");
            }
        }
        result
    }
}
