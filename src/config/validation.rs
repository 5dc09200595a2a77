//! Configuration validation.
//!
//! Serde handles syntactic checks; this module checks value ranges and
//! cross-field constraints. All errors are returned, not just the first.

use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    let registration = &config.registration;
    if registration.job_name.trim().is_empty() {
        errors.push(ValidationError::new("registration.job_name", "must not be empty"));
    }
    if registration.scrape_config_path.trim().is_empty() {
        errors.push(ValidationError::new(
            "registration.scrape_config_path",
            "must not be empty",
        ));
    }
    match Url::parse(&registration.reload_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "registration.reload_url",
            format!("unsupported scheme `{}`", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "registration.reload_url",
            format!("invalid URL: {}", e),
        )),
    }

    let workload = &config.workload;
    if workload.delays_ms.is_empty() {
        errors.push(ValidationError::new("workload.delays_ms", "must not be empty"));
    }
    if !(0.0..=1.0).contains(&workload.failure_rate) {
        errors.push(ValidationError::new(
            "workload.failure_rate",
            "must be between 0 and 1",
        ));
    }
    if workload.failure_rate > 0.0 && workload.failure_messages.is_empty() {
        errors.push(ValidationError::new(
            "workload.failure_messages",
            "must not be empty when failure_rate is non-zero",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
