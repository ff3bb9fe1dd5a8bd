//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table from configuration
//! - Install process-wide middleware (request ID, access log)
//! - Register the application routes and freeze the table
//!
//! # Design Decisions
//! - Fail fast: a registration conflict is a startup error
//! - Global middleware is installed before any route so every route captures it

use std::sync::Arc;

use crate::app;
use crate::config::ServerConfig;
use crate::http::middleware::{Logger, RequestId};
use crate::observability::metrics;
use crate::routing::{RouteError, Router};

/// Build and freeze the route table.
pub fn build_router(config: &ServerConfig) -> Result<Arc<Router>, RouteError> {
    let mut router = Router::new().handle_method_not_allowed(config.routing.handle_method_not_allowed);
    router.use_middleware(RequestId).use_middleware(Logger);

    app::register_routes(&mut router)?;

    tracing::info!(
        routes = router.len(),
        handle_method_not_allowed = config.routing.handle_method_not_allowed,
        "Route table frozen"
    );
    metrics::record_route_count(router.len());

    Ok(Arc::new(router))
}
