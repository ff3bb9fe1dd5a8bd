//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, transport layers, body buffering)
//!     → routing::Router (match, build RequestContext)
//!     → middleware/ (chain of handlers, Next)
//!     → context.rs (params, query.rs, binding, store.rs)
//!     → response.rs (status, headers, rendered body)
//!     → Send to client
//! ```

pub mod context;
pub mod handler;
pub mod middleware;
pub mod query;
pub mod response;
pub mod server;
pub mod store;

pub use context::RequestContext;
pub use handler::{Endpoint, HandlerError, HandlerResult};
pub use query::QueryParams;
pub use response::{RenderError, ResponseState};
pub use server::HttpServer;
pub use store::{Store, StoreError};
