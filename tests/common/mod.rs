//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scrape_beacon::config::ServiceConfig;
use scrape_beacon::{HttpServer, MetricsRegistry, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Scrape config with a `prometheus` job and an unrelated `node` job.
#[allow(dead_code)]
pub const SCRAPE_CONFIG: &str = r#"global:
  scrape_interval: 4s
scrape_configs:
  - job_name: prometheus
    static_configs:
      - targets: ["10.0.0.1:8000"]
  - job_name: node
    static_configs:
      - targets: ["10.0.0.9:9100"]
        labels:
          role: db
"#;

/// Stand-in collector that answers every request with `status` and counts
/// `POST /-/reload` requests.
#[allow(dead_code)]
pub async fn start_mock_collector(status: u16) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reloads = Arc::new(AtomicUsize::new(0));
    let counter = reloads.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        if buf[..n].starts_with(b"POST /-/reload ") {
                            counter.fetch_add(1, Ordering::SeqCst);
                        }

                        let status_text = match status {
                            200 => "200 OK",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            status_text
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, reloads)
}

/// A port with nothing listening on it.
#[allow(dead_code)]
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Start the HTTP service on an ephemeral port.
#[allow(dead_code)]
pub async fn start_service(config: ServiceConfig) -> (SocketAddr, Shutdown) {
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, metrics);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}
