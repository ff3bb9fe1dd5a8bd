//! Request logging middleware.
//!
//! Wraps the rest of the chain: notes the start time, runs the chain, then
//! logs latency and the final status and feeds the request metrics.

use std::time::Instant;

use crate::http::context::RequestContext;
use crate::http::handler::HandlerResult;
use crate::http::middleware::chain::{Middleware, Next};
use crate::observability::metrics;

#[derive(Debug, Clone, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for Logger {
    fn handle(&self, ctx: &mut RequestContext, next: Next) -> HandlerResult {
        let start = Instant::now();

        let result = next.run(ctx);

        let latency = start.elapsed();
        let status = ctx.response().status();
        let request_id = ctx.try_get::<String>(super::request_id::STORE_KEY).cloned();

        tracing::info!(
            request_id = request_id.as_deref().unwrap_or("-"),
            method = %ctx.method(),
            path = %ctx.path(),
            route = %ctx.route(),
            status = status.as_u16(),
            latency = ?latency,
            failed = result.is_err(),
            "Request handled"
        );
        metrics::record_request(ctx.method().as_str(), status.as_u16(), start);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::middleware::chain::{run, Chain, Terminal};
    use crate::routing::Method;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use std::sync::Arc;

    #[test]
    fn test_logger_is_transparent() {
        let terminal = Terminal(|ctx: &mut RequestContext| -> HandlerResult {
            ctx.string(StatusCode::CREATED, "made");
            Ok(())
        });
        let handlers: Vec<Arc<dyn Middleware>> = vec![Arc::new(Logger::new()), Arc::new(terminal)];
        let chain: Chain = handlers.into();

        let mut ctx = RequestContext::new(Method::Post, "/things", "", HeaderMap::new(), Bytes::new());
        run(&chain, &mut ctx).unwrap();
        assert_eq!(ctx.response().status(), StatusCode::CREATED);
        assert_eq!(&ctx.response().body()[..], b"made");
    }
}
