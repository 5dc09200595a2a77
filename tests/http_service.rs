//! HTTP surface tests over a real socket.

use std::time::Duration;

use scrape_beacon::config::ServiceConfig;

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn total_requests(body: &str) -> u64 {
    body.lines()
        .find(|line| line.starts_with("total_req "))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.workload.delays_ms = vec![20];
    config.workload.failure_rate = 0.0;
    config
}

#[tokio::test]
async fn test_metrics_counts_prior_requests() {
    let (addr, shutdown) = common::start_service(test_config()).await;
    let client = client();

    for _ in 0..2 {
        let res = client.get(format!("http://{}/", addr)).send().await.unwrap();
        assert_eq!(res.status(), 200);
    }

    // A scrape sees requests completed before it, not itself.
    let res = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let body = res.text().await.unwrap();
    assert_eq!(total_requests(&body), 2);
    assert!(body.contains(r#"route="/""#));

    let body = client
        .get(format!("http://{}/metrics", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(total_requests(&body), 3);
    assert!(body.contains(r#"route="/metrics""#));

    shutdown.trigger();
}

#[tokio::test]
async fn test_slow_requests_run_concurrently() {
    let mut config = test_config();
    config.workload.delays_ms = vec![300];
    let (addr, shutdown) = common::start_service(config).await;
    let client = client();

    let started = std::time::Instant::now();
    let requests = (0..5).map(|_| {
        let client = client.clone();
        let url = format!("http://{}/slow", addr);
        tokio::spawn(async move { client.get(url).send().await.unwrap().status() })
    });
    for handle in requests.collect::<Vec<_>>() {
        assert_eq!(handle.await.unwrap(), 200);
    }

    // Sequential handling would take at least 1.5s.
    assert!(started.elapsed() < Duration::from_millis(1200));
    shutdown.trigger();
}

#[tokio::test]
async fn test_slow_failure_is_generic_500() {
    let mut config = test_config();
    config.workload.failure_rate = 1.0;
    let (addr, shutdown) = common::start_service(config).await;

    let res = client()
        .get(format!("http://{}/slow", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "Error");
    assert_eq!(body["error"], "Internal Server Error");

    shutdown.trigger();
}
