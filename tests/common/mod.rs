//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::http::StatusCode;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use media_gateway::config::{GatewayConfig, StrmRuleConfig};
use media_gateway::http::{AppState, HttpServer, HyperTransport};
use media_gateway::lifecycle::Shutdown;
use media_gateway::strm::{HookSet, StrmKind};

pub const TWO_SOURCES: &str = r#"{"Items":[{"Path":"/strm/http/movie.strm","MediaSources":[{"Id":"mediasource_1","Protocol":"Http","Path":"https://origin.example/first.mp4"},{"Id":"mediasource_2","Protocol":"Http","Path":"https://origin.example/second.mp4"}]}]}"#;

/// Start a programmable mock origin. The handler gets `(method, path_and_query)`
/// and returns `(status, body)`. Every response carries `X-Origin-Path`.
pub async fn start_programmable_origin<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some((method, target)) = read_request_line(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(method, target.clone()).await;
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("OK");

                        let response_str = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nX-Origin-Path: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason,
                            body.len(),
                            target,
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Mock origin serving `items` on `/Items` and `proxied` everywhere else.
pub async fn start_media_origin(items: &'static str) -> SocketAddr {
    start_programmable_origin(move |_method, target| async move {
        if target.starts_with("/Items?") {
            (200, items.to_string())
        } else {
            (200, "proxied".to_string())
        }
    })
    .await
}

async fn read_request_line(socket: &mut tokio::net::TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    let mut parts = head.lines().next()?.split_whitespace();
    Some((parts.next()?.to_string(), parts.next()?.to_string()))
}

/// Gateway config pointing at `origin` with one enabled HTTP STRM prefix.
pub fn gateway_config(origin: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.origin.url = format!("http://{}", origin);
    config.origin.api_key = "test-api-key".into();
    config.strm.rules.push(StrmRuleConfig {
        prefix: "/strm/http/".into(),
        kind: StrmKind::HttpStrm,
        enabled: true,
    });
    config
}

/// Hook appending `#redirected` to HTTP STRM targets.
pub fn redirect_hooks() -> HookSet {
    HookSet::new().with_hook(StrmKind::HttpStrm, |content, _| format!("{}#redirected", content))
}

/// Run a gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig, hooks: HookSet) -> (SocketAddr, AppState, Shutdown) {
    let transport = Arc::new(HyperTransport::new(Duration::from_secs(
        config.timeouts.connect_secs,
    )));
    let state = AppState::new(&config, transport, hooks).unwrap();
    let server = HttpServer::from_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, state, shutdown)
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
