//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use waypoint::config::ServerConfig;
use waypoint::http::ResponseState;
use waypoint::lifecycle::{self, Shutdown};
use waypoint::{HttpServer, Router};

/// Build the sample route table with default settings.
pub fn sample_router() -> Arc<Router> {
    sample_router_with(ServerConfig::default())
}

pub fn sample_router_with(config: ServerConfig) -> Arc<Router> {
    lifecycle::build_router(&config).unwrap()
}

/// Dispatch a request straight into the route table, no transport involved.
pub fn send(router: &Router, method: Method, target: &str, headers: HeaderMap, body: Bytes) -> ResponseState {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    router.dispatch(&method, path, headers, query, body)
}

pub fn get(router: &Router, target: &str) -> ResponseState {
    send(router, Method::GET, target, HeaderMap::new(), Bytes::new())
}

pub fn text(response: &ResponseState) -> String {
    String::from_utf8_lossy(response.body()).into_owned()
}

/// Start the HTTP server on `addr` and wait until it accepts connections.
#[allow(dead_code)]
pub async fn start_server(addr: SocketAddr, mut config: ServerConfig) -> Shutdown {
    config.listener.bind_address = addr.to_string();
    let router = sample_router_with(config.clone());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server = HttpServer::new(config, router);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
