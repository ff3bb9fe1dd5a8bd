//! Request ID propagation.
//!
//! Reuses an incoming `x-request-id` header or generates a UUID v4, stores it
//! under [`STORE_KEY`] for later handlers and echoes it on the response.

use axum::http::{HeaderName, HeaderValue};
use uuid::Uuid;

use crate::http::context::RequestContext;
use crate::http::handler::HandlerResult;
use crate::http::middleware::chain::{Middleware, Next};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Store key the ID is saved under, as a `String`.
pub const STORE_KEY: &str = "request_id";

#[derive(Debug, Clone, Default)]
pub struct RequestId;

impl RequestId {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestId {
    fn handle(&self, ctx: &mut RequestContext, next: Next) -> HandlerResult {
        let id = ctx
            .header(X_REQUEST_ID)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Ok(value) = HeaderValue::from_str(&id) {
            ctx.response_mut()
                .insert_header(HeaderName::from_static(X_REQUEST_ID), value);
        }
        ctx.set(STORE_KEY, id);

        next.run(ctx)
    }
}
