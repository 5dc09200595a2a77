//! Scrape Beacon service.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────┐
//!                   │                 SCRAPE BEACON                │
//!                   │                                              │
//!   startup ───────▶│  registration (once, own task)               │
//!                   │    address → scrape_config → reload ─────────┼──▶ collector
//!                   │                                              │    /-/reload
//!                   │                                              │
//!   Client Request  │  ┌─────────┐   ┌────────┐   ┌────────────┐   │
//!   ────────────────┼─▶│ request │──▶│ timing │──▶│  handlers  │   │
//!                   │  │   id    │   │observer│   │ / /slow    │   │
//!   ◀───────────────┼──│ + trace │◀──│        │◀──│ /metrics   │   │
//!                   │  └─────────┘   └───┬────┘   └─────┬──────┘   │
//!                   │                    ▼              │          │
//!                   │              MetricsRegistry ◀────┘          │
//!                   └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use scrape_beacon::config::resolve_config;
use scrape_beacon::lifecycle::{signals, startup, Shutdown};
use scrape_beacon::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "scrape-beacon")]
#[command(about = "Instrumented HTTP service that registers itself as a scrape target", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip scrape target registration for this run.
    #[arg(long)]
    no_register: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref())?;

    init_logging(&config.observability);

    tracing::info!("scrape-beacon v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        scrape_config = %config.registration.scrape_config_path,
        job = %config.registration.job_name,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::trigger_on_signal(shutdown.clone());

    startup::run(config, !cli.no_register, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
