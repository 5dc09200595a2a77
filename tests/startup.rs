//! Startup keeps serving whatever happens to registration.

use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use scrape_beacon::config::ServiceConfig;
use scrape_beacon::lifecycle::{startup, Shutdown};

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Poll `/metrics` until a line containing `needle` shows up.
async fn wait_for_metric(addr: SocketAddr, needle: &str) -> String {
    let client = client();
    for _ in 0..50 {
        let body = client
            .get(format!("http://{}/metrics", addr))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        if let Some(line) = body.lines().find(|line| line.contains(needle)) {
            return line.to_string();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("metric {needle} never appeared");
}

fn config_for(addr: SocketAddr, scrape_config_path: String, reload_url: String) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.host = addr.ip().to_string();
    config.listener.port = addr.port();
    config.registration.scrape_config_path = scrape_config_path;
    config.registration.reload_url = reload_url;
    config.registration.reload_timeout_secs = 1;
    config
}

#[tokio::test]
async fn test_serves_when_registration_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prometheus.yml");
    let garbage = "scrape_configs: [unterminated\n";
    fs::write(&path, garbage).unwrap();

    let addr = common::closed_port();
    let config = config_for(
        addr,
        path.to_string_lossy().into_owned(),
        format!("http://{}/-/reload", common::closed_port()),
    );

    let shutdown = Shutdown::new();
    let server = tokio::spawn(startup::run(config, true, shutdown.clone()));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client().get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let line = wait_for_metric(addr, r#"scrape_registration_total{outcome="unreadable"}"#).await;
    assert!(line.ends_with(" 1"));
    assert_eq!(fs::read_to_string(&path).unwrap(), garbage);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_registers_alongside_serving() {
    let (collector, _) = common::start_mock_collector(200).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prometheus.yml");
    fs::write(&path, common::SCRAPE_CONFIG).unwrap();

    let addr = common::closed_port();
    let config = config_for(
        addr,
        path.to_string_lossy().into_owned(),
        format!("http://{}/-/reload", collector),
    );

    let shutdown = Shutdown::new();
    let server = tokio::spawn(startup::run(config, true, shutdown.clone()));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let line = wait_for_metric(addr, r#"scrape_registration_total{outcome="added"}"#).await;
    assert!(line.ends_with(" 1"));
    assert!(fs::read_to_string(&path)
        .unwrap()
        .contains(&format!(":{}", addr.port())));

    shutdown.trigger();
    assert!(tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .is_ok());
}

#[tokio::test]
async fn test_bind_failure_is_fatal() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();
    let mut config = config_for(addr, "prometheus.yml".into(), "http://127.0.0.1:9/-/reload".into());
    config.registration.enabled = false;

    let result = startup::run(config, true, Shutdown::new()).await;
    assert!(matches!(result, Err(startup::StartupError::Bind { .. })));
}
