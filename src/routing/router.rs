//! Route registration, grouping and dispatch.
//!
//! # Responsibilities
//! - Own one trie per method
//! - Build each route's handler chain at registration time
//!   (router middleware → group middleware → endpoint)
//! - Dispatch (method, path, query, headers, body) to the matching chain
//! - Answer unmatched requests: 404, optional 405
//!
//! # Design Decisions
//! - Built mutably at startup, then frozen behind `Arc` (reads need no locks)
//! - Middleware is captured when a route is registered; later `use_middleware`
//!   calls only affect routes registered afterwards
//! - Group middleware never leaks to the parent or sibling groups

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};

use crate::http::context::RequestContext;
use crate::http::handler::Endpoint;
use crate::http::middleware::chain::{self, Chain, Middleware, Terminal};
use crate::http::response::ResponseState;
pub use crate::http::response::INTERNAL_ERROR_BODY;
use crate::routing::method::Method;
use crate::routing::pattern::{join_paths, Pattern};
use crate::routing::trie::RouteTrie;
use crate::routing::RouteError;

pub const NOT_FOUND_BODY: &str = "404 page not found";
pub const METHOD_NOT_ALLOWED_BODY: &str = "405 method not allowed";

/// A registered route. Immutable once registered.
pub struct Route {
    method: Method,
    pattern: Pattern,
    chain: Chain,
}

impl Route {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Number of handlers, endpoint included.
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.to_string())
            .field("handlers", &self.chain.len())
            .finish()
    }
}

/// HTTP request router.
pub struct Router {
    tries: Vec<RouteTrie<Arc<Route>>>,
    middleware: Vec<Arc<dyn Middleware>>,
    handle_method_not_allowed: bool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            tries: Method::ALL.iter().map(|m| RouteTrie::new(*m)).collect(),
            middleware: Vec::new(),
            handle_method_not_allowed: false,
        }
    }

    /// Answer 405 instead of 404 when the path exists under another method.
    pub fn handle_method_not_allowed(mut self, enabled: bool) -> Self {
        self.handle_method_not_allowed = enabled;
        self
    }

    /// Append router-wide middleware for routes registered from now on.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Sub-router whose routes live under `prefix` and start with this
    /// router's middleware.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let middleware = self.middleware.clone();
        Group {
            router: self,
            prefix: prefix.to_string(),
            middleware,
        }
    }

    pub fn handle<E: Endpoint>(&mut self, method: Method, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.group("").handle(method, pattern, endpoint)
    }

    pub fn get<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Get, pattern, endpoint)
    }

    pub fn post<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Post, pattern, endpoint)
    }

    pub fn put<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Put, pattern, endpoint)
    }

    pub fn patch<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Patch, pattern, endpoint)
    }

    pub fn delete<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Delete, pattern, endpoint)
    }

    pub fn head<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Head, pattern, endpoint)
    }

    pub fn options<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Options, pattern, endpoint)
    }

    pub fn any<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.group("").any(pattern, endpoint)
    }

    /// Register a pre-built chain. The chain's last handler should be the endpoint.
    pub fn route(&mut self, method: Method, pattern: &str, chain: Vec<Arc<dyn Middleware>>) -> Result<(), RouteError> {
        let pattern = Pattern::parse(pattern)?;
        let route = Arc::new(Route {
            method,
            pattern: pattern.clone(),
            chain: chain.into(),
        });
        self.tries[method.index()].insert(&pattern, route.clone())?;

        tracing::debug!(
            method = %method,
            pattern = %pattern,
            handlers = route.chain.len(),
            "Route registered"
        );
        Ok(())
    }

    /// All registered `(method, pattern)` pairs, sorted by pattern then method.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut routes = Vec::new();
        for trie in &self.tries {
            trie.visit(&mut |route: &Arc<Route>| {
                routes.push((route.method, route.pattern.to_string()));
            });
        }
        routes.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        routes
    }

    pub fn len(&self) -> usize {
        self.tries.iter().map(RouteTrie::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the route for a method and path without running it.
    pub fn lookup(&self, method: Method, path: &str) -> Option<(Arc<Route>, crate::routing::Params)> {
        self.tries[method.index()]
            .find(path)
            .map(|m| (m.value.clone(), m.params))
    }

    /// Dispatch one request and produce its response.
    pub fn dispatch(
        &self,
        method: &axum::http::Method,
        path: &str,
        headers: HeaderMap,
        raw_query: &str,
        body: Bytes,
    ) -> ResponseState {
        let Some(method) = Method::from_http(method) else {
            tracing::debug!(method = %method, path = %path, "Unsupported method");
            return self.unmatched(None, path);
        };

        let Some((route, params)) = self.lookup(method, path) else {
            return self.unmatched(Some(method), path);
        };

        let mut ctx = RequestContext::new(method, path, raw_query, headers, body)
            .with_route(route.pattern.to_string(), params);

        // Failures were already logged and turned into a 500 inside the chain.
        if let Err(e) = chain::run(&route.chain, &mut ctx) {
            tracing::debug!(route = %route.pattern, error = %e, "Chain ended with an error");
        }
        ctx.into_response()
    }

    fn unmatched(&self, method: Option<Method>, path: &str) -> ResponseState {
        if self.handle_method_not_allowed {
            let allowed: Vec<&str> = Method::ALL
                .iter()
                .filter(|m| Some(**m) != method)
                .filter(|m| self.tries[m.index()].find(path).is_some())
                .map(Method::as_str)
                .collect();
            if !allowed.is_empty() {
                tracing::debug!(path = %path, allowed = ?allowed, "Method not allowed");
                let mut response = ResponseState::text(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY);
                if let Ok(value) = allowed.join(", ").parse() {
                    response.insert_header(axum::http::header::ALLOW, value);
                }
                return response;
            }
        }

        tracing::debug!(path = %path, "No route matched");
        ResponseState::text(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
    }
}

/// Routes registered under a shared prefix and middleware stack.
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl<'r> Group<'r> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Append middleware for routes registered through this group from now on.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Nested group: prefixes concatenate, middleware is inherited.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            prefix: join_paths(&self.prefix, prefix),
            middleware: self.middleware.clone(),
            router: &mut *self.router,
        }
    }

    pub fn handle<E: Endpoint>(&mut self, method: Method, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        let endpoint: Arc<dyn Middleware> = Arc::new(Terminal(endpoint));
        self.register(method, pattern, endpoint)
    }

    fn register(&mut self, method: Method, pattern: &str, endpoint: Arc<dyn Middleware>) -> Result<(), RouteError> {
        let full = join_paths(&self.prefix, pattern);
        let mut chain = self.middleware.clone();
        chain.push(endpoint);
        self.router.route(method, &full, chain)
    }

    pub fn get<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Get, pattern, endpoint)
    }

    pub fn post<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Post, pattern, endpoint)
    }

    pub fn put<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Put, pattern, endpoint)
    }

    pub fn patch<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Patch, pattern, endpoint)
    }

    pub fn delete<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Delete, pattern, endpoint)
    }

    pub fn head<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Head, pattern, endpoint)
    }

    pub fn options<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        self.handle(Method::Options, pattern, endpoint)
    }

    /// Register the same endpoint under every method.
    ///
    /// Every method is checked before any is inserted, so a conflict on one
    /// method leaves all tries untouched.
    pub fn any<E: Endpoint>(&mut self, pattern: &str, endpoint: E) -> Result<(), RouteError> {
        let full = join_paths(&self.prefix, pattern);
        let parsed = Pattern::parse(&full)?;
        for method in Method::ALL {
            self.router.tries[method.index()].check(&parsed)?;
        }

        let endpoint: Arc<dyn Middleware> = Arc::new(Terminal(endpoint));
        for method in Method::ALL {
            self.register(method, pattern, endpoint.clone())?;
        }
        Ok(())
    }
}
