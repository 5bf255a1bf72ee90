// src/api/blocking.rs
//! Blocking HTTP client used by the synchronous entry points.
//!
//! `reqwest::blocking` runs its own runtime internally, so this client
//! must not be created or used from inside an async context.

use super::client::{create_headers, request_url};
use super::connection_pool::PoolConfig;
use super::{ApiRequest, ApiResponse, Transport};
use crate::error::LoaderError;
use crate::types::{ApiKey, BaseUrl};
use reqwest::blocking::Client;

/// Blocking [`Transport`] backed by `reqwest::blocking::Client`.
#[derive(Clone)]
pub struct BlockingHttpClient {
    client: Client,
    base_url: BaseUrl,
}

impl BlockingHttpClient {
    pub fn new(base_url: &BaseUrl, api_key: &ApiKey, pool: &PoolConfig) -> Result<Self, LoaderError> {
        let client = pool
            .configure_blocking(Client::builder())
            .default_headers(create_headers(api_key)?)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.clone(),
        })
    }
}

impl Transport for BlockingHttpClient {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse<String>, LoaderError> {
        let url = request_url(&self.base_url, request);
        log::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let url = response.url().to_string();
        let data = response.text()?;

        Ok(ApiResponse { data, status, url })
    }
}
