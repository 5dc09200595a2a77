//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Self-registration into the collector's scrape config.
    pub registration: RegistrationConfig,

    /// Synthetic latency endpoint settings.
    pub workload: WorkloadConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind (all interfaces by default).
    pub host: String,

    /// Port to bind. Overridden by the `PORT` environment variable.
    pub port: u16,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl ListenerConfig {
    /// Bind address in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 30,
        }
    }
}

/// Scrape target self-registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Run registration at startup.
    pub enabled: bool,

    /// Path to the collector's YAML scrape configuration.
    pub scrape_config_path: String,

    /// Name of the scrape job this instance registers into.
    pub job_name: String,

    /// Collector endpoint that triggers a configuration reload.
    pub reload_url: String,

    /// Timeout for the reload request in seconds.
    pub reload_timeout_secs: u64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scrape_config_path: "prometheus.yml".to_string(),
            job_name: "prometheus".to_string(),
            reload_url: "http://localhost:9090/-/reload".to_string(),
            reload_timeout_secs: 5,
        }
    }
}

/// Synthetic workload served on `/slow`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Candidate delays in milliseconds; one is picked at random per call.
    pub delays_ms: Vec<u64>,

    /// Probability in [0, 1] that a call fails instead of sleeping.
    pub failure_rate: f64,

    /// Messages a failing call picks from.
    pub failure_messages: Vec<String>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            delays_ms: vec![100, 150, 200, 300, 600, 500, 1000, 1400, 2500],
            failure_rate: 0.125,
            failure_messages: vec![
                "DB Payment Failure".to_string(),
                "DB Server is Down".to_string(),
                "Access Denied".to_string(),
                "Not Found Error".to_string(),
            ],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [listener]
            port = 9100

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 9100);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.registration.job_name, "prometheus");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.workload.delays_ms.len(), 9);
    }

    #[test]
    fn test_bind_address() {
        let listener = ListenerConfig::default();
        assert_eq!(listener.bind_address(), "0.0.0.0:8000");
    }
}
