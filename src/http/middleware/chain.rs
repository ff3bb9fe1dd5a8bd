//! Middleware chain execution.
//!
//! # Control Flow
//! ```text
//! M1 pre → next.run() ─┐
//!                      M2 pre → next.run() ─┐
//!                                           endpoint
//!                      M2 post ◀────────────┘
//! M1 post ◀────────────┘
//! ```
//!
//! A handler that returns without calling `next` ends the chain; whatever
//! response it (or an earlier handler) set is final. `Next` is consumed by
//! `run`, so the continuation can fire at most once.
//!
//! # Failures
//! An error or panic leaving a handler is logged once and turned into a 500
//! right there, before control returns to the handler that called `next`.
//! Outer post-processing therefore observes the final status, and the error
//! keeps propagating so it can also tell the request failed.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::http::context::RequestContext;
use crate::http::handler::{Endpoint, HandlerError, HandlerResult};

/// A request interceptor.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, ctx: &mut RequestContext, next: Next) -> HandlerResult;
}

/// Shared, immutable handler sequence of one route.
pub type Chain = Arc<[Arc<dyn Middleware>]>;

/// Continuation to the rest of the chain.
pub struct Next {
    chain: Chain,
    index: usize,
}

impl Next {
    /// Start of a chain.
    pub fn new(chain: Chain) -> Self {
        Self { chain, index: 0 }
    }

    /// Run the remaining handlers. Returns once they have all finished.
    pub fn run(self, ctx: &mut RequestContext) -> HandlerResult {
        let Some(handler) = self.chain.get(self.index).cloned() else {
            return Ok(());
        };
        let next = Next {
            chain: self.chain,
            index: self.index + 1,
        };
        let result = match catch_unwind(AssertUnwindSafe(|| handler.handle(ctx, next))) {
            Ok(result) => result,
            Err(panic) => Err(HandlerError::Panic(panic_message(&*panic))),
        };
        if let Err(e) = &result {
            recover(ctx, e);
        }
        result
    }

    /// Handlers not yet run, including the one `run` would invoke.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }
}

// Only the innermost failing handler reports; outer frames see the same error.
fn recover(ctx: &mut RequestContext, error: &HandlerError) {
    if ctx.is_failed() {
        return;
    }
    match error {
        HandlerError::Panic(message) => {
            tracing::error!(method = %ctx.method(), route = %ctx.route(), panic = %message, "Handler panicked");
        }
        e if e.is_bug() => {
            tracing::error!(method = %ctx.method(), route = %ctx.route(), error = %e, "Handler bug: request store misuse");
        }
        e => {
            tracing::error!(method = %ctx.method(), route = %ctx.route(), error = %e, "Handler failed");
        }
    }
    ctx.fail();
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run a full chain against a context.
pub fn run(chain: &Chain, ctx: &mut RequestContext) -> HandlerResult {
    Next::new(chain.clone()).run(ctx)
}

/// Middleware built from a closure.
pub struct FromFn<F>(F);

/// Wrap a closure as middleware, in the spirit of `axum::middleware::from_fn`.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&mut RequestContext, Next) -> HandlerResult + Send + Sync + 'static,
{
    FromFn(f)
}

impl<F> Middleware for FromFn<F>
where
    F: Fn(&mut RequestContext, Next) -> HandlerResult + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut RequestContext, next: Next) -> HandlerResult {
        (self.0)(ctx, next)
    }
}

/// Adapts an [`Endpoint`] into the last link of a chain.
pub(crate) struct Terminal<E>(pub(crate) E);

impl<E: Endpoint> Middleware for Terminal<E> {
    fn handle(&self, ctx: &mut RequestContext, _next: Next) -> HandlerResult {
        self.0.call(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::HandlerError;
    use crate::routing::Method;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
    use std::sync::Mutex;

    fn ctx() -> RequestContext {
        RequestContext::new(Method::Get, "/", "", HeaderMap::new(), Bytes::new())
    }

    fn chain(handlers: Vec<Arc<dyn Middleware>>) -> Chain {
        handlers.into()
    }

    fn arc<M: Middleware>(m: M) -> Arc<dyn Middleware> {
        Arc::new(m)
    }

    #[test]
    fn test_order_and_post_processing() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let l1 = log.clone();
        let m1 = from_fn(move |ctx: &mut RequestContext, next: Next| {
            l1.lock().unwrap().push("m1 pre");
            ctx.set("example", "12345".to_string());
            next.run(ctx)?;
            l1.lock().unwrap().push("m1 post");
            Ok(())
        });

        let l2 = log.clone();
        let m2 = from_fn(move |ctx: &mut RequestContext, next: Next| {
            l2.lock().unwrap().push("m2 pre");
            next.run(ctx)?;
            l2.lock().unwrap().push("m2 post");
            Ok(())
        });

        let l3 = log.clone();
        let terminal = Terminal(move |ctx: &mut RequestContext| -> HandlerResult {
            let example = ctx.get::<String>("example")?.clone();
            l3.lock().unwrap().push("terminal");
            ctx.string(StatusCode::OK, format!("example = {}", example));
            Ok(())
        });

        let c = chain(vec![arc(m1), arc(m2), arc(terminal)]);
        let mut context = ctx();
        run(&c, &mut context).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["m1 pre", "m2 pre", "terminal", "m2 post", "m1 post"]
        );
        assert_eq!(&context.response().body()[..], b"example = 12345");
    }

    #[test]
    fn test_short_circuit_skips_rest() {
        let reached = Arc::new(Mutex::new(false));

        let guard = from_fn(|ctx: &mut RequestContext, _next: Next| {
            ctx.string(StatusCode::FORBIDDEN, "denied");
            Ok(())
        });
        let r = reached.clone();
        let terminal = Terminal(move |ctx: &mut RequestContext| -> HandlerResult {
            *r.lock().unwrap() = true;
            ctx.string(StatusCode::OK, "should not run");
            Ok(())
        });

        let c = chain(vec![arc(guard), arc(terminal)]);
        let mut context = ctx();
        run(&c, &mut context).unwrap();

        assert!(!*reached.lock().unwrap());
        assert_eq!(context.response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_post_processing_sees_final_status() {
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        let observer = from_fn(move |ctx: &mut RequestContext, next: Next| {
            assert_eq!(next.remaining(), 1);
            next.run(ctx)?;
            *s.lock().unwrap() = Some(ctx.response().status());
            Ok(())
        });
        let terminal = Terminal(|ctx: &mut RequestContext| -> HandlerResult {
            ctx.string(StatusCode::ACCEPTED, "ok");
            Ok(())
        });

        let c = chain(vec![arc(observer), arc(terminal)]);
        run(&c, &mut ctx()).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(StatusCode::ACCEPTED));
    }

    #[test]
    fn test_missing_key_propagates() {
        let terminal = Terminal(|ctx: &mut RequestContext| -> HandlerResult {
            ctx.get::<String>("example")?;
            Ok(())
        });
        let c = chain(vec![arc(terminal)]);
        let mut context = ctx();
        let err = run(&c, &mut context).unwrap_err();
        assert!(matches!(err, HandlerError::Store(_)));
        assert!(err.is_bug());
        assert!(context.is_failed());
        assert_eq!(context.response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn observed_status(terminal: Arc<dyn Middleware>) -> (Option<StatusCode>, bool) {
        let seen = Arc::new(Mutex::new((None, false)));
        let s = seen.clone();
        let observer = from_fn(move |ctx: &mut RequestContext, next: Next| {
            ctx.response_mut()
                .insert_header(HeaderName::from_static("x-request-id"), HeaderValue::from_static("abc"));
            let result = next.run(ctx);
            *s.lock().unwrap() = (Some(ctx.response().status()), result.is_err());
            result
        });

        let c = chain(vec![arc(observer), terminal]);
        let mut context = ctx();
        assert!(run(&c, &mut context).is_err());
        assert_eq!(&context.response().body()[..], b"500 Internal Server Error");
        assert_eq!(context.response().headers().get("x-request-id").unwrap(), "abc");
        let seen = *seen.lock().unwrap();
        seen
    }

    #[test]
    fn test_outer_middleware_sees_500_from_failing_handler() {
        let failing = arc(Terminal(|ctx: &mut RequestContext| -> HandlerResult {
            ctx.string(StatusCode::OK, "partial");
            Err(HandlerError::internal("database unavailable"))
        }));
        assert_eq!(observed_status(failing), (Some(StatusCode::INTERNAL_SERVER_ERROR), true));
    }

    #[test]
    fn test_outer_middleware_sees_500_from_panicking_handler() {
        let panicking = arc(Terminal(|_: &mut RequestContext| -> HandlerResult { panic!("boom") }));
        assert_eq!(observed_status(panicking), (Some(StatusCode::INTERNAL_SERVER_ERROR), true));
    }

    #[test]
    fn test_panic_message_is_kept() {
        let terminal = Terminal(|_: &mut RequestContext| -> HandlerResult { panic!("index {} out of range", 3) });
        let c = chain(vec![arc(terminal)]);
        let err = run(&c, &mut ctx()).unwrap_err();
        assert!(matches!(&err, HandlerError::Panic(m) if m == "index 3 out of range"));
        assert!(err.is_bug());
    }

    #[test]
    fn test_empty_chain_is_noop() {
        let c = chain(Vec::new());
        let mut context = ctx();
        run(&c, &mut context).unwrap();
        assert_eq!(context.response().status(), StatusCode::OK);
    }
}
