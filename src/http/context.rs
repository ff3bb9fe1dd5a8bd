//! Per-request context handed down the middleware chain.
//!
//! # Responsibilities
//! - Carry the request: method, path, path params, query, headers, body
//! - Hold the typed store middleware uses to talk to later handlers
//! - Hold the response state the chain writes into
//!
//! # Design Decisions
//! - Owned by exactly one in-flight request; never shared across tasks
//! - Dropped once the response has been produced

use std::any::Any;
use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::binding::{self, BindError};
use crate::http::query::QueryParams;
use crate::http::response::{RenderError, ResponseState, INTERNAL_ERROR_BODY};
use crate::http::store::{Store, StoreError};
use crate::routing::{Method, Params};

#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    route: String,
    params: Params,
    query: QueryParams,
    headers: HeaderMap,
    body: Bytes,
    store: Store,
    response: ResponseState,
    failed: bool,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>, raw_query: &str, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            path: path.into(),
            route: String::new(),
            params: Params::new(),
            query: QueryParams::parse(raw_query),
            headers,
            body,
            store: Store::new(),
            response: ResponseState::new(),
            failed: false,
        }
    }

    /// Attach the matched route pattern and its captured parameters.
    pub fn with_route(mut self, route: impl Into<String>, params: Params) -> Self {
        self.route = route.into();
        self.params = params;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Pattern of the matched route, e.g. `/users/:id`.
    pub fn route(&self) -> &str {
        &self.route
    }

    // Path parameters

    /// Path parameter by name, `""` when the route has no such capture.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).unwrap_or("")
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    // Query parameters

    pub fn query(&self, name: &str) -> &str {
        self.query.get(name)
    }

    pub fn default_query<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.query.get_or(name, default)
    }

    pub fn query_array(&self, name: &str) -> &[String] {
        self.query.get_all(name)
    }

    pub fn query_map(&self, name: &str) -> BTreeMap<String, String> {
        self.query.get_map(name)
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query
    }

    // Headers and body

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    // Binding

    /// Bind from the query or body depending on method and content type, then validate.
    pub fn bind<T: DeserializeOwned + Validate>(&self) -> Result<T, BindError> {
        binding::bind(self)
    }

    pub fn bind_query<T: DeserializeOwned + Validate>(&self) -> Result<T, BindError> {
        binding::bind_query(self)
    }

    pub fn bind_header<T: DeserializeOwned + Validate>(&self) -> Result<T, BindError> {
        binding::bind_header(self)
    }

    pub fn bind_json<T: DeserializeOwned + Validate>(&self) -> Result<T, BindError> {
        binding::bind_json(self)
    }

    pub fn bind_form<T: DeserializeOwned + Validate>(&self) -> Result<T, BindError> {
        binding::bind_form(self)
    }

    // Store

    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.store.set(key, value);
    }

    pub fn get<T: Any>(&self, key: &str) -> Result<&T, StoreError> {
        self.store.get(key)
    }

    pub fn try_get<T: Any>(&self, key: &str) -> Option<&T> {
        self.store.try_get(key)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    // Response

    pub fn string(&mut self, status: StatusCode, body: impl Into<String>) {
        self.response.write_text(status, body);
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> Result<(), RenderError> {
        self.response.write_json(status, value)
    }

    pub fn xml<T: Serialize>(&mut self, status: StatusCode, value: &T) -> Result<(), RenderError> {
        self.response.write_xml(status, value)
    }

    pub fn yaml<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> Result<(), RenderError> {
        self.response.write_yaml(status, value)
    }

    pub fn status(&mut self, status: StatusCode) {
        self.response.set_status(status);
    }

    pub fn response(&self) -> &ResponseState {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ResponseState {
        &mut self.response
    }

    /// Whether a handler in the chain has already failed this request.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Replace the body with a 500, keeping headers set so far.
    pub(crate) fn fail(&mut self) {
        self.failed = true;
        self.response.write_text(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY);
    }

    pub fn into_response(self) -> ResponseState {
        self.response
    }
}
