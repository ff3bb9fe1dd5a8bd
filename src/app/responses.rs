//! One record rendered as JSON, YAML and XML.

use axum::http::StatusCode;
use serde::Serialize;

use crate::http::context::RequestContext;
use crate::http::handler::HandlerResult;
use crate::routing::{RouteError, Router};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
}

impl Profile {
    pub fn sample() -> Self {
        Self {
            name: "xiaoming".to_string(),
            email: "xiaoming@example.com".to_string(),
        }
    }
}

pub fn json(ctx: &mut RequestContext) -> HandlerResult {
    ctx.json(StatusCode::OK, &Profile::sample())?;
    Ok(())
}

pub fn yaml(ctx: &mut RequestContext) -> HandlerResult {
    ctx.yaml(StatusCode::OK, &Profile::sample())?;
    Ok(())
}

pub fn xml(ctx: &mut RequestContext) -> HandlerResult {
    ctx.xml(StatusCode::OK, &Profile::sample())?;
    Ok(())
}

pub fn register(router: &mut Router) -> Result<(), RouteError> {
    let mut group = router.group("/router/response");
    group.get("/json", json)?;
    group.get("/yaml", yaml)?;
    group.get("/xml", xml)
}
