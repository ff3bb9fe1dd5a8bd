//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up transport layers (tracing, timeouts, body limits)
//! - Buffer the request and hand it to the frozen route table
//! - Serve until the shutdown coordinator fires
//!
//! # Design Decisions
//! - Axum only carries bytes; matching and middleware belong to `routing::Router`
//! - The route table is shared read-only behind an `Arc` after startup
//! - Paths are percent-decoded before matching; undecodable paths match raw

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::routing::Router as RouteTable;

/// Application state injected into the catch-all handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub max_body_size: usize,
}

/// HTTP front end for a frozen route table.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `routes`.
    pub fn new(config: ServerConfig, routes: Arc<RouteTable>) -> Self {
        let state = AppState {
            routes,
            max_body_size: config.limits.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server on `listener` until `shutdown` receives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Catch-all handler: buffer, decode the path, dispatch.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "413 payload too large").into_response();
        }
    };

    let raw_path = parts.uri.path();
    let path = urlencoding::decode(raw_path).unwrap_or(Cow::Borrowed(raw_path));
    let query = parts.uri.query().unwrap_or("");

    state
        .routes
        .dispatch(&parts.method, &path, parts.headers, query, body)
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::RequestContext;
    use crate::http::handler::HandlerResult;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut routes = RouteTable::new();
        routes
            .get("/hello/:name", |ctx: &mut RequestContext| -> HandlerResult {
                let body = format!("hello {}", ctx.param("name"));
                ctx.string(StatusCode::OK, body);
                Ok(())
            })
            .unwrap();
        routes
            .post("/echo", |ctx: &mut RequestContext| -> HandlerResult {
                let body = String::from_utf8_lossy(ctx.body()).into_owned();
                ctx.string(StatusCode::OK, body);
                Ok(())
            })
            .unwrap();

        let mut config = ServerConfig::default();
        config.limits.max_body_size = 16;
        HttpServer::new(config, Arc::new(routes))
    }

    async fn send(request: Request<Body>) -> (StatusCode, String) {
        let response = server().router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_catch_all_dispatches() {
        let request = Request::get("/hello/gopher").body(Body::empty()).unwrap();
        assert_eq!(send(request).await, (StatusCode::OK, "hello gopher".to_string()));
    }

    #[tokio::test]
    async fn test_path_is_decoded() {
        let request = Request::get("/hello/a%20b").body(Body::empty()).unwrap();
        assert_eq!(send(request).await.1, "hello a b");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let request = Request::get("/").body(Body::empty()).unwrap();
        assert_eq!(
            send(request).await,
            (StatusCode::NOT_FOUND, "404 page not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_body_reaches_handler() {
        let request = Request::post("/echo").body(Body::from("ping")).unwrap();
        assert_eq!(send(request).await.1, "ping");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let request = Request::post("/echo")
            .body(Body::from("x".repeat(64)))
            .unwrap();
        assert_eq!(send(request).await.0, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
