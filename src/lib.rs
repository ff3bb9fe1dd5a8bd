//! Waypoint: a method-aware HTTP request router with middleware chains.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum catch-all, body limit, timeout, trace)
//!                          │
//!                          ▼
//!                     routing::Router ── per-method RouteTrie ── 404 / 405
//!                          │
//!                          ▼
//!                     http::middleware::chain (global → group → endpoint)
//!                          │  RequestContext: params, query, binding, store
//!                          ▼
//!     Client Response ◀── http::response (text / JSON / XML / YAML)
//!
//!     Cross-cutting: config, lifecycle (startup, signals, shutdown), observability
//! ```

pub mod app;
pub mod binding;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::{HttpServer, RequestContext};
pub use lifecycle::Shutdown;
pub use routing::{Group, Method, RouteError, Router};
