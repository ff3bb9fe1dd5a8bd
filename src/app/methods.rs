//! One endpoint under every method.

use axum::http::StatusCode;
use serde_json::json;

use crate::http::context::RequestContext;
use crate::http::handler::HandlerResult;
use crate::routing::{RouteError, Router};

pub fn ok(ctx: &mut RequestContext) -> HandlerResult {
    ctx.json(StatusCode::OK, &json!({ "message": "ok" }))?;
    Ok(())
}

pub fn register(router: &mut Router) -> Result<(), RouteError> {
    router.get("/router/method", ok)?;
    router.post("/router/method", ok)?;
    router.put("/router/method", ok)?;
    router.patch("/router/method", ok)?;
    router.delete("/router/method", ok)?;
    router.head("/router/method", ok)?;
    router.options("/router/method", ok)?;
    router.any("/router/any", ok)
}
