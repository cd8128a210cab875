//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::http::StatusCode;
use digipos_gateway::config::GatewayConfig;
use digipos_gateway::{HttpServer, Shutdown};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned upstream reply: status, optional content type, body.
pub type Reply = (u16, Option<&'static str>, String);

/// Request lines (`GET /path?query HTTP/1.1`) seen by a mock upstream.
pub type Seen = Arc<Mutex<Vec<String>>>;

/// Start a programmable mock upstream on an ephemeral port.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> (SocketAddr, Seen)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Seen = Arc::default();
    let f = Arc::new(f);

    let recorded = seen.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                if let Some(line) = head.lines().next() {
                    recorded.lock().unwrap().push(line.to_string());
                }

                let (status, content_type, body) = f().await;
                let reason = StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown");
                let mut response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                    status,
                    reason,
                    body.len()
                );
                if let Some(ct) = content_type {
                    response.push_str(&format!("Content-Type: {}\r\n", ct));
                }
                response.push_str("\r\n");
                response.push_str(&body);

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, seen)
}

/// Start a mock upstream that always returns the same reply.
pub async fn start_mock_upstream(status: u16, content_type: Option<&'static str>, body: &str) -> (SocketAddr, Seen) {
    let body = body.to_string();
    start_programmable_upstream(move || {
        let body = body.clone();
        async move { (status, content_type, body) }
    })
    .await
}

/// An address nothing is listening on.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Gateway config pointing at `upstream`, with fast retries.
pub fn test_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = format!("http://{}/", upstream);
    config.upstream.timeout_secs = 2;
    config.upstream.connect_timeout_secs = 1;
    config.upstream.retry.max_attempts = 3;
    config.upstream.retry.base_delay_ms = 1;
    config.upstream.retry.max_delay_ms = 5;
    config.digipos.username = "alice".into();
    config.digipos.password = "secret".into();
    config
}

/// Spawn the gateway on an ephemeral port. Trigger the returned
/// [`Shutdown`] to stop it.
pub async fn spawn_gateway(config: GatewayConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(server.run(listener, shutdown.subscribe()));
    (format!("http://{}", addr), shutdown)
}
