//! Request binding and validation.
//!
//! # Data Flow
//! ```text
//! RequestContext (query / headers / body)
//!     → pick a source (method + Content-Type, or explicit bind_*)
//!     → flatten to key/value pairs, first value per key
//!     → serde_urlencoded (strings → scalars: "10" → u32)
//!       or serde_json for JSON bodies
//!     → validator::Validate (required, range, length, ...)
//!     → T, or the first failing constraint as a ValidationError
//! ```
//!
//! # Design Decisions
//! - Declarative constraints live on the target type (`#[validate(...)]`)
//! - The router never interprets a bind failure; handlers choose the status

use axum::http::header;
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

use crate::http::context::RequestContext;
use crate::routing::Method;

/// A declared constraint that did not hold.
///
/// When several fields fail, the one reported is the first by field name,
/// not by declaration order: `validator` hands errors back keyed by field
/// without remembering the order of the struct. Within one field, the
/// first declared constraint wins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Key: '{field}' Error:Field validation for '{field}' failed on the '{constraint}' tag")]
pub struct ValidationError {
    pub field: String,
    pub constraint: String,
    pub message: Option<String>,
}

/// Why binding failed.
#[derive(Debug, Error)]
pub enum BindError {
    /// The raw data could not be decoded into the target shape.
    #[error("{0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl BindError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            BindError::Validation(e) => Some(e),
            BindError::Decode(_) => None,
        }
    }
}

/// Bind using the method and `Content-Type` to pick the source.
///
/// Bodiless methods and empty bodies bind from the query string; JSON and
/// url-encoded bodies bind from the body; anything else falls back to the query.
pub fn bind<T: DeserializeOwned + Validate>(ctx: &RequestContext) -> Result<T, BindError> {
    let bodiless = matches!(
        ctx.method(),
        Method::Get | Method::Head | Method::Delete | Method::Options
    );
    if bodiless || ctx.body().is_empty() {
        return bind_query(ctx);
    }

    let content_type = ctx
        .header(header::CONTENT_TYPE.as_str())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match content_type.as_str() {
        "application/json" => bind_json(ctx),
        "application/x-www-form-urlencoded" => bind_form(ctx),
        _ => bind_query(ctx),
    }
}

/// Bind from the query string.
pub fn bind_query<T: DeserializeOwned + Validate>(ctx: &RequestContext) -> Result<T, BindError> {
    let pairs: Vec<(&str, &str)> = ctx.query_params().first_values().collect();
    validate(decode_pairs(&pairs)?)
}

/// Bind from request headers. Keys are lower-case header names.
pub fn bind_header<T: DeserializeOwned + Validate>(ctx: &RequestContext) -> Result<T, BindError> {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for (name, value) in ctx.headers() {
        let Ok(value) = value.to_str() else {
            continue;
        };
        if !pairs.iter().any(|(k, _)| *k == name.as_str()) {
            pairs.push((name.as_str(), value));
        }
    }
    validate(decode_pairs(&pairs)?)
}

/// Bind from a JSON body.
pub fn bind_json<T: DeserializeOwned + Validate>(ctx: &RequestContext) -> Result<T, BindError> {
    let value = serde_json::from_slice(ctx.body()).map_err(|e| BindError::Decode(e.to_string()))?;
    validate(value)
}

/// Bind from an `application/x-www-form-urlencoded` body.
pub fn bind_form<T: DeserializeOwned + Validate>(ctx: &RequestContext) -> Result<T, BindError> {
    let value = serde_urlencoded::from_bytes(ctx.body()).map_err(|e| BindError::Decode(e.to_string()))?;
    validate(value)
}

fn decode_pairs<T: DeserializeOwned>(pairs: &[(&str, &str)]) -> Result<T, BindError> {
    let encoded = serde_urlencoded::to_string(pairs).map_err(|e| BindError::Decode(e.to_string()))?;
    serde_urlencoded::from_str(&encoded).map_err(|e| BindError::Decode(e.to_string()))
}

fn validate<T: Validate>(value: T) -> Result<T, BindError> {
    match value.validate() {
        Ok(()) => Ok(value),
        Err(errors) => Err(first_failure(&errors).into()),
    }
}

/// Pick the first failure: fields in name order, constraints in declaration order.
///
/// Name order keeps the choice stable across runs; `field_errors` is a hash map.
fn first_failure(errors: &validator::ValidationErrors) -> ValidationError {
    let mut fields: Vec<(String, &Vec<validator::ValidationError>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| ValidationError {
                field,
                constraint: e.code.to_string(),
                message: e.message.as_ref().map(|m| m.to_string()),
            })
        })
        .unwrap_or_else(|| ValidationError {
            field: String::new(),
            constraint: "invalid".to_string(),
            message: Some(errors.to_string()),
        })
}
