//! Path, query and bound request parameters.

use std::collections::BTreeMap;
use std::fmt;

use axum::http::StatusCode;
use serde::Deserialize;
use validator::Validate;

use crate::http::context::RequestContext;
use crate::http::handler::HandlerResult;
use crate::routing::{RouteError, Router};

/// Credentials gathered from headers first, then the query string.
///
/// Query keys match exactly: `password=` does not fill `Password`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct Credentials {
    #[serde(rename = "User")]
    pub user: Option<String>,
    #[serde(rename = "Password")]
    pub password: Option<String>,
    #[serde(rename = "Accept")]
    pub accept: Option<String>,
}

/// Header side of [`Credentials`]; header names arrive lower-cased.
#[derive(Debug, Default, Deserialize, Validate)]
struct HeaderCredentials {
    user: Option<String>,
    password: Option<String>,
    accept: Option<String>,
}

impl From<HeaderCredentials> for Credentials {
    fn from(h: HeaderCredentials) -> Self {
        Self {
            user: h.user,
            password: h.password,
            accept: h.accept,
        }
    }
}

impl Credentials {
    /// Fields present in `later` replace ours.
    fn overlay(self, later: Credentials) -> Self {
        Self {
            user: later.user.or(self.user),
            password: later.password.or(self.password),
            accept: later.accept.or(self.accept),
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {} {}}}",
            self.user.as_deref().unwrap_or(""),
            self.password.as_deref().unwrap_or(""),
            self.accept.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct Pagination {
    #[serde(rename = "pageNo")]
    #[validate(required, range(min = 1))]
    pub page_no: Option<u32>,

    #[serde(rename = "pageSize")]
    #[validate(required, range(min = 1, max = 100))]
    pub page_size: Option<u32>,
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {}}}", self.page_no.unwrap_or(0), self.page_size.unwrap_or(0))
    }
}

fn format_array(values: &[String]) -> String {
    format!("[{}]", values.join(" "))
}

fn format_map(map: &BTreeMap<String, String>) -> String {
    let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}:{v}")).collect();
    format!("map[{}]", pairs.join(" "))
}

pub fn require_path_param(ctx: &mut RequestContext) -> HandlerResult {
    let body = format!("requirePathParam = {}", ctx.param("requirePathParam"));
    ctx.string(StatusCode::OK, body);
    Ok(())
}

pub fn remain_path_param(ctx: &mut RequestContext) -> HandlerResult {
    let body = format!("remainPathParam = {}", ctx.param("remainPathParam"));
    ctx.string(StatusCode::OK, body);
    Ok(())
}

pub fn query(ctx: &mut RequestContext) -> HandlerResult {
    let body = format!(
        "queryParam = {}, queryParamWithDefault = {}, queryArr = {}, queryMap = {}",
        ctx.query("queryParam"),
        ctx.default_query("queryParamWithDefault", "default"),
        format_array(ctx.query_array("queryArr")),
        format_map(&ctx.query_map("queryMap")),
    );
    ctx.string(StatusCode::OK, body);
    Ok(())
}

/// Bind failures leave the affected source empty.
pub fn bind(ctx: &mut RequestContext) -> HandlerResult {
    let from_headers: Credentials = ctx.bind_header::<HeaderCredentials>().unwrap_or_default().into();
    let from_request: Credentials = ctx.bind().unwrap_or_default();
    let user = from_headers.overlay(from_request);

    ctx.string(StatusCode::OK, format!("user = {user}"));
    Ok(())
}

/// Validation failures are reported in the body with a 200.
pub fn validate(ctx: &mut RequestContext) -> HandlerResult {
    let body = match ctx.bind::<Pagination>() {
        Ok(pagination) => format!("pagination = {pagination}"),
        Err(e) => e.to_string(),
    };
    ctx.string(StatusCode::OK, body);
    Ok(())
}

pub fn register(router: &mut Router) -> Result<(), RouteError> {
    router.get("/router/request/path/require/:requirePathParam", require_path_param)?;
    router.get("/router/request/path/remain/*remainPathParam", remain_path_param)?;
    router.get("/router/request/query", query)?;
    router.get("/router/request/bind", bind)?;
    router.get("/router/request/validate", validate)
}
