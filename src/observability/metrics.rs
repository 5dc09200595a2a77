//! Metrics collection and exposition.
//!
//! # Metrics
//! - `total_req` (counter): every request served
//! - `http_express_req_res_time` (histogram, ms): latency by method, route, status
//! - `scrape_registration_total` (counter): startup registration outcomes
//! - `process_*`: CPU, memory, file descriptors and start time of this process,
//!   sampled on every render
//!
//! # Design Decisions
//! - The registry is an explicit object owned by startup and shared via `Arc`;
//!   no process-global recorder is installed
//! - Updates go through the `metrics` facade scoped to this registry's recorder
//! - Histogram buckets are in milliseconds to match existing dashboards

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use metrics_process::Collector;

pub const TOTAL_REQUESTS: &str = "total_req";
pub const REQUEST_LATENCY: &str = "http_express_req_res_time";
pub const REGISTRATION_OUTCOMES: &str = "scrape_registration_total";

/// Latency histogram buckets, milliseconds.
pub const LATENCY_BUCKETS_MS: &[f64] = &[1.0, 50.0, 100.0, 200.0, 400.0, 500.0, 800.0, 1000.0, 2000.0];

/// Content type of the text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Process-scoped metrics registry.
pub struct MetricsRegistry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    process: Collector,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(REQUEST_LATENCY.to_string()), LATENCY_BUCKETS_MS)?
            .build_recorder();
        let handle = recorder.handle();

        let registry = Self {
            recorder,
            handle,
            process: Collector::default(),
        };
        registry.describe();
        Ok(registry)
    }

    fn describe(&self) {
        metrics::with_local_recorder(&self.recorder, || {
            describe_counter!(TOTAL_REQUESTS, "Tells total requests");
            describe_histogram!(
                REQUEST_LATENCY,
                Unit::Milliseconds,
                "This tells how much time is taken by req and res"
            );
            describe_counter!(
                REGISTRATION_OUTCOMES,
                "Scrape target self-registration attempts by outcome"
            );
            self.process.describe();
        });
    }

    /// Record one completed request.
    pub fn record_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        metrics::with_local_recorder(&self.recorder, || {
            counter!(TOTAL_REQUESTS).increment(1);
            histogram!(
                REQUEST_LATENCY,
                "method" => method.to_string(),
                "route" => route.to_string(),
                "status_code" => status.to_string()
            )
            .record(elapsed.as_secs_f64() * 1000.0);
        });
    }

    /// Record the outcome of a registration attempt.
    pub fn record_registration(&self, outcome: &'static str) {
        metrics::with_local_recorder(&self.recorder, || {
            counter!(REGISTRATION_OUTCOMES, "outcome" => outcome).increment(1);
        });
    }

    /// Current snapshot in the text exposition format.
    pub fn render(&self) -> String {
        metrics::with_local_recorder(&self.recorder, || self.process.collect());
        self.handle.render()
    }
}
