//! Prefix groups and group-local middleware.

use std::time::Instant;

use axum::http::StatusCode;

use crate::http::context::RequestContext;
use crate::http::handler::HandlerResult;
use crate::http::middleware::{from_fn, Middleware, Next};
use crate::routing::{RouteError, Router};

/// Store key set by [`example_logger`].
pub const EXAMPLE_KEY: &str = "example";

pub fn hello(ctx: &mut RequestContext) -> HandlerResult {
    ctx.string(StatusCode::OK, "Hello");
    Ok(())
}

/// Stores a marker value for later handlers, then logs latency and status
/// once the rest of the chain has run.
pub fn example_logger() -> impl Middleware {
    from_fn(|ctx: &mut RequestContext, next: Next| -> HandlerResult {
        let start = Instant::now();
        ctx.set(EXAMPLE_KEY, "12345".to_string());

        let result = next.run(ctx);

        tracing::info!(
            latency = ?start.elapsed(),
            status = ctx.response().status().as_u16(),
            "Group middleware finished"
        );
        result
    })
}

pub fn example(ctx: &mut RequestContext) -> HandlerResult {
    let example = ctx.get::<String>(EXAMPLE_KEY)?.clone();
    ctx.string(StatusCode::OK, format!("example = {example}"));
    Ok(())
}

pub fn register(router: &mut Router) -> Result<(), RouteError> {
    router.group("/router/group/v1").get("/hello", hello)?;
    router.group("/router/group/v2").get("/hello", hello)
}

pub fn register_with_middleware(router: &mut Router) -> Result<(), RouteError> {
    let mut group = router.group("/router/group/middleware");
    group.use_middleware(example_logger());
    group.get("/hello", example)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Method;

    #[test]
    fn test_middleware_scoped_to_group() {
        let mut router = Router::new();
        register(&mut router).unwrap();
        register_with_middleware(&mut router).unwrap();

        let (plain, _) = router.lookup(Method::Get, "/router/group/v1/hello").unwrap();
        let (wrapped, _) = router.lookup(Method::Get, "/router/group/middleware/hello").unwrap();
        assert_eq!(plain.chain_len(), 1);
        assert_eq!(wrapped.chain_len(), 2);
    }
}
