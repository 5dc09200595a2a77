//! Collector reload signal.
//!
//! A single `POST` with an empty body. The caller gets the outcome back and
//! decides what to log; nothing here retries.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

/// Reload request could not be delivered.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("invalid reload URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("collector unreachable at {url}: {source}")]
    Unreachable {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

/// Sends reload signals to the collector.
#[derive(Debug, Clone)]
pub struct ReloadNotifier {
    client: Client,
    url: Url,
}

impl ReloadNotifier {
    pub fn new(reload_url: &str, timeout: Duration) -> Result<Self, ReloadError> {
        let url = Url::parse(reload_url).map_err(|e| ReloadError::InvalidUrl {
            url: reload_url.to_string(),
            reason: e.to_string(),
        })?;
        // The collector is a local collaborator; never route through a proxy.
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(ReloadError::Client)?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send one reload request. Any HTTP status counts as delivered.
    pub async fn notify(&self) -> Result<StatusCode, ReloadError> {
        let response = self
            .client
            .post(self.url.clone())
            .send()
            .await
            .map_err(|source| ReloadError::Unreachable {
                url: self.url.clone(),
                source,
            })?;
        Ok(response.status())
    }
}
