//! Immutable request description
//!
//! A [`ResourceRequest`] is built fresh for every call from the endpoint the
//! caller passes in, so a rotated credential applies to the very next request.

use reqwest::{Client, Method, RequestBuilder};

use crate::routes::{build_target, Query, Route};
use crate::RemoteEndpoint;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Outgoing representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    /// reqwest writes the `multipart/form-data` header with its boundary
    Multipart,
}

#[derive(Debug, Clone)]
pub struct ResourceRequest {
    method: Method,
    url: String,
    headers: Vec<(&'static str, String)>,
    body: BodyKind,
}

impl ResourceRequest {
    pub fn new(
        method: Method,
        endpoint: &RemoteEndpoint,
        route: Route<'_>,
        query: &Query,
        body: BodyKind,
    ) -> Self {
        let mut headers = Vec::new();
        if body == BodyKind::Json {
            headers.push(("Content-Type", CONTENT_TYPE_JSON.to_string()));
        }
        if let Some(token) = endpoint.token() {
            headers.push(("Authorization", format!("Bearer {}", token)));
        }

        Self {
            method,
            url: build_target(endpoint.base_url(), route, query),
            headers,
            body,
        }
    }

    pub fn get(endpoint: &RemoteEndpoint, route: Route<'_>, query: &Query) -> Self {
        Self::new(Method::GET, endpoint, route, query, BodyKind::Json)
    }

    pub fn delete(endpoint: &RemoteEndpoint, route: Route<'_>, query: &Query) -> Self {
        Self::new(Method::DELETE, endpoint, route, query, BodyKind::Json)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(&'static str, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> BodyKind {
        self.body
    }

    // Invalid header values are reported by reqwest at send time.
    pub(crate) fn into_builder(self, http: &Client) -> RequestBuilder {
        self.headers
            .into_iter()
            .fold(http.request(self.method, self.url), |builder, (k, v)| {
                builder.header(k, v)
            })
    }
}
