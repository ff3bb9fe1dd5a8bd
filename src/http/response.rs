//! Response state written by handlers.
//!
//! # Responsibilities
//! - Hold status, body bytes, content type and extra headers for one request
//! - Render structured values as JSON, XML or YAML on explicit request
//! - Convert into an axum response at the transport boundary
//!
//! # Design Decisions
//! - The handler picks the encoding; `Accept` is never consulted
//! - A fresh response is `200 OK` with an empty body until a handler writes

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_XML: &str = "application/xml; charset=utf-8";
pub const CONTENT_TYPE_YAML: &str = "application/yaml; charset=utf-8";

/// Body written when a handler fails or panics.
pub const INTERNAL_ERROR_BODY: &str = "500 Internal Server Error";

/// Serialization failure while rendering a response body.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML rendering failed: {0}")]
    Xml(String),

    #[error("YAML rendering failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// The response being built for the current request.
#[derive(Debug, Clone)]
pub struct ResponseState {
    status: StatusCode,
    body: Bytes,
    content_type: Option<&'static str>,
    headers: HeaderMap,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::new(),
            content_type: None,
            headers: HeaderMap::new(),
        }
    }
}

impl ResponseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-text response, used for router-generated errors.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut response = Self::new();
        response.write_text(status, body);
        response
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn write_text(&mut self, status: StatusCode, body: impl Into<String>) {
        self.write(status, CONTENT_TYPE_TEXT, Bytes::from(body.into()));
    }

    pub fn write_json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> Result<(), RenderError> {
        let body = serde_json::to_vec(value)?;
        self.write(status, CONTENT_TYPE_JSON, Bytes::from(body));
        Ok(())
    }

    pub fn write_xml<T: Serialize>(&mut self, status: StatusCode, value: &T) -> Result<(), RenderError> {
        let body = quick_xml::se::to_string(value).map_err(|e| RenderError::Xml(e.to_string()))?;
        self.write(status, CONTENT_TYPE_XML, Bytes::from(body));
        Ok(())
    }

    pub fn write_yaml<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> Result<(), RenderError> {
        let body = serde_yaml::to_string(value)?;
        self.write(status, CONTENT_TYPE_YAML, Bytes::from(body));
        Ok(())
    }

    fn write(&mut self, status: StatusCode, content_type: &'static str, body: Bytes) {
        self.status = status;
        self.content_type = Some(content_type);
        self.body = body;
    }

    /// Split into `(status, body, content type)`.
    pub fn into_parts(self) -> (StatusCode, Bytes, Option<&'static str>) {
        (self.status, self.body, self.content_type)
    }
}

impl IntoResponse for ResponseState {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in self.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(content_type) = self.content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        response
    }
}
