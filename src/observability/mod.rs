//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → GET /metrics (collector scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use metrics::MetricsRegistry;
