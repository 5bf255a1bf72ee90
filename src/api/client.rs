// src/api/client.rs
//! Async HTTP client for the Anytype local API.
//!
//! A thin wrapper around reqwest: it authenticates, builds URLs and hands
//! back raw bodies. Status interpretation lives in the parser.

use super::connection_pool::PoolConfig;
use super::{ApiRequest, ApiResponse, AsyncTransport};
use crate::constants::{ANYTYPE_API_VERSION, USER_AGENT};
use crate::error::LoaderError;
use crate::types::{ApiKey, BaseUrl};
use reqwest::{header, Client, Url};

/// Non-blocking [`AsyncTransport`] backed by `reqwest::Client`.
#[derive(Clone)]
pub struct AnytypeHttpClient {
    client: Client,
    base_url: BaseUrl,
}

impl AnytypeHttpClient {
    pub fn new(base_url: &BaseUrl, api_key: &ApiKey, pool: &PoolConfig) -> Result<Self, LoaderError> {
        let client = pool
            .configure_async(Client::builder())
            .default_headers(create_headers(api_key)?)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl AsyncTransport for AnytypeHttpClient {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse<String>, LoaderError> {
        let url = request_url(&self.base_url, request);
        log::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let data = response.text().await?;

        Ok(ApiResponse { data, status, url })
    }
}

/// Default headers for every Anytype API request.
pub(crate) fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, LoaderError> {
    let mut headers = header::HeaderMap::new();

    let auth_header = format!("Bearer {}", api_key.as_str());
    let mut auth_value = header::HeaderValue::from_str(&auth_header)
        .map_err(|e| LoaderError::Configuration(format!("Invalid API key format: {}", e)))?;
    auth_value.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, auth_value);

    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        "Anytype-Version",
        header::HeaderValue::from_static(ANYTYPE_API_VERSION),
    );

    Ok(headers)
}

/// Absolute URL for a request, query string included.
pub(crate) fn request_url(base_url: &BaseUrl, request: &ApiRequest) -> Url {
    let mut url = base_url.join_segments(&request.segments);
    if !request.query.is_empty() {
        url.query_pairs_mut().extend_pairs(request.query.iter());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_keeps_base_path() {
        let base = BaseUrl::parse("http://localhost:31009/proxy/").unwrap();
        let request = ApiRequest::get(["v1", "spaces", "s 1", "objects"])
            .with_query("limit", 50)
            .with_query("offset", 0);

        assert_eq!(
            request_url(&base, &request).as_str(),
            "http://localhost:31009/proxy/v1/spaces/s%201/objects?limit=50&offset=0"
        );
    }

    #[test]
    fn test_headers_carry_auth_and_version() {
        let headers = create_headers(&ApiKey::new("secret-key").unwrap()).unwrap();

        assert_eq!(headers[header::AUTHORIZATION], "Bearer secret-key");
        assert!(headers[header::AUTHORIZATION].is_sensitive());
        assert_eq!(headers["Anytype-Version"], ANYTYPE_API_VERSION);
        assert_eq!(headers[header::USER_AGENT], USER_AGENT);
    }
}
