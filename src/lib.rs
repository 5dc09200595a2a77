//! Scrape Beacon: a small instrumented HTTP service that registers itself
//! as a scrape target with its metrics collector at startup.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registration;
pub mod workload;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::MetricsRegistry;
pub use registration::{Registrar, RegistrationReport};
