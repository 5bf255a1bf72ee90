// src/api/mod.rs
//! Anytype API interaction: how the loader enumerates and retrieves objects.
//!
//! Every pipeline stage (space resolution, object indexing, object fetching)
//! is written once against [`ApiRequest`]/[`ApiResponse`]. Only the small
//! drivers differ between the blocking [`Transport`] and the
//! concurrency-aware [`AsyncTransport`].

mod blocking;
mod client;
mod concurrency;
mod connection_pool;
mod endpoints;
mod fetcher;
mod indexer;
mod pagination;
pub(crate) mod parser;
mod resolver;

use crate::error::LoaderError;
use crate::error_recovery::{retry_async, retry_blocking, RetryPolicy};
use std::fmt;

pub use blocking::BlockingHttpClient;
pub use client::AnytypeHttpClient;
pub use concurrency::BoundedFetcher;
pub use connection_pool::{PoolConfig, TransportPool};
pub use endpoints::{get_object, list_objects, list_spaces, search_objects};
pub use fetcher::{fetch_object_async, fetch_object_blocking, FetchOutcome};
pub use indexer::{object_references, IndexRequest, ListingMode, ObjectIndex};
pub use pagination::{Page, PageWindow};
pub use resolver::{match_space_names, SpaceResolver};

/// HTTP methods the loader issues. It never mutates remote state; `Post`
/// is used only for the search endpoint, which takes its filter as a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// One request against the API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Unencoded path segments, e.g. `["v1", "spaces", "<id>", "objects"]`.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            method: HttpMethod::Get,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post<S: Into<String>>(
        segments: impl IntoIterator<Item = S>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            method: HttpMethod::Post,
            body: Some(body),
            ..Self::get(segments)
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// The request path, e.g. `/v1/spaces/abc/objects`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", separator, key, value)?;
        }
        Ok(())
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Blocking capability: send one request, return the raw response.
///
/// Implementations report only transport failures as errors; HTTP error
/// statuses come back as ordinary responses.
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse<String>, LoaderError>;
}

/// Concurrency-aware counterpart of [`Transport`].
#[async_trait::async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse<String>, LoaderError>;
}

/// Sends a request, turning error statuses into [`LoaderError::Api`] and
/// retrying per `retry`.
pub(crate) fn execute_blocking(
    transport: &dyn Transport,
    request: &ApiRequest,
    retry: &RetryPolicy,
) -> Result<ApiResponse<String>, LoaderError> {
    retry_blocking(retry, || {
        transport.send(request).and_then(parser::ensure_success)
    })
}

/// Async counterpart of [`execute_blocking`].
pub(crate) async fn execute_async(
    transport: &dyn AsyncTransport,
    request: &ApiRequest,
    retry: &RetryPolicy,
) -> Result<ApiResponse<String>, LoaderError> {
    retry_async(retry, || async move {
        parser::ensure_success(transport.send(request).await?)
    })
    .await
}
