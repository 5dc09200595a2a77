use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

use scrape_beacon::config::RegistrationConfig;
use scrape_beacon::registration::{address, scrape_config, Registrar, ReloadNotifier};
use scrape_beacon::MetricsRegistry;

#[derive(Parser)]
#[command(name = "scrape-beacon-ctl")]
#[command(about = "Operator CLI for scrape target registration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the address this host would advertise
    Address {
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
    /// List the targets of a scrape job
    Targets {
        #[arg(short, long, default_value = "prometheus.yml")]
        file: PathBuf,
        #[arg(short, long, default_value = "prometheus")]
        job: String,
    },
    /// Run the registration pipeline once
    Register {
        #[arg(short, long, default_value = "prometheus.yml")]
        file: PathBuf,
        #[arg(short, long, default_value = "prometheus")]
        job: String,
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
        #[arg(long, default_value = "http://localhost:9090/-/reload")]
        reload_url: String,
    },
    /// Ask the collector to reload its configuration
    Reload {
        #[arg(short, long, default_value = "http://localhost:9090/-/reload")]
        url: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Address { port } => {
            println!("{}", address::resolve(port));
        }
        Commands::Targets { file, job } => {
            let document = scrape_config::load_document(&file)?;
            let targets = scrape_config::job_targets(&document, &job)?;
            print_json(&json!({ "job": job, "targets": targets }))?;
        }
        Commands::Register { file, job, port, reload_url } => {
            let config = RegistrationConfig {
                enabled: true,
                scrape_config_path: file.to_string_lossy().into_owned(),
                job_name: job,
                reload_url,
                ..RegistrationConfig::default()
            };
            let registrar = Registrar::new(&config, port, Arc::new(MetricsRegistry::new()?))?;
            let report = registrar.register().await;

            let mutation = match &report.mutation {
                Ok(change) => json!({ "ok": change.as_str() }),
                Err(e) => json!({ "error": e.to_string() }),
            };
            let reload = match &report.reload {
                None => json!("skipped"),
                Some(Ok(status)) => json!({ "status": status.as_u16() }),
                Some(Err(e)) => json!({ "error": e.to_string() }),
            };
            print_json(&json!({
                "address": report.address.as_str(),
                "mutation": mutation,
                "reload": reload,
            }))?;
        }
        Commands::Reload { url } => {
            let notifier = ReloadNotifier::new(&url, Duration::from_secs(5))?;
            let status = notifier.notify().await?;
            println!("Reload request returned {}", status);
            if !status.is_success() {
                return Err(format!("collector rejected reload with {}", status).into());
            }
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
