//! HTTP client implementation for the Oura v2 API.
//!
//! This module provides a reqwest-based implementation of the
//! [`OuraClient`](crate::OuraClient) trait.

use crate::config::Config;
use crate::{Category, DateRange, OuraClient, OuraError, RangeQuery};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.ouraring.com";

const COLLECTION_PATH: &str = "/v2/usercollection";

/// Client for the Oura v2 API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestOuraClient {
    base_url: String,
    access_token: SecretString,
    client: reqwest::Client,
}

impl ReqwestOuraClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The API host (e.g., "https://api.ouraring.com")
    /// * `access_token` - Personal access token, sent as a bearer token
    pub fn new(base_url: &str, access_token: SecretString) -> Self {
        Self::with_http_client(base_url, access_token, reqwest::Client::new())
    }

    /// Create a client from loaded configuration, applying its timeout.
    pub fn from_config(cfg: &Config) -> Result<Self, OuraError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self::with_http_client(
            &cfg.base_url,
            cfg.access_token.clone(),
            client,
        ))
    }

    fn with_http_client(
        base_url: &str,
        access_token: SecretString,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            client,
        }
    }

    /// Full URL of a category's endpoint.
    pub fn endpoint_url(&self, category: Category) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            COLLECTION_PATH,
            category.endpoint()
        )
    }

    /// Issue an authenticated request carrying a date range and return the
    /// parsed JSON body.
    ///
    /// Anything other than `200 OK` becomes [`OuraError::RequestFailed`].
    pub async fn call_api(
        &self,
        method: Method,
        url: &str,
        query: &RangeQuery,
    ) -> Result<serde_json::Value, OuraError> {
        let resp = self
            .client
            .request(method, url)
            .bearer_auth(self.access_token.expose_secret())
            .query(&query.pairs())
            .send()
            .await?;
        record_exchange(endpoint_label(url), resp.status());
        if resp.status() != StatusCode::OK {
            return Err(Self::error_from_response(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// Extract the status and any vendor `detail` from a failed response.
    async fn error_from_response(resp: reqwest::Response) -> OuraError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status, "oura request failed");
        OuraError::RequestFailed {
            status,
            detail: detail_from_body(&body),
        }
    }
}

/// Count one completed HTTP exchange. Transport failures never reach here.
fn record_exchange(endpoint: &str, status: StatusCode) {
    metrics::counter!(
        "oura_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}

/// Last path segment of an endpoint URL, e.g. `heartrate`.
fn endpoint_label(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// `detail` of a JSON object body; strings verbatim, anything else as JSON.
fn detail_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.as_object()?.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl OuraClient for ReqwestOuraClient {
    async fn fetch_endpoint(
        &self,
        category: Category,
        range: &DateRange,
    ) -> Result<serde_json::Value, OuraError> {
        let url = self.endpoint_url(category);
        tracing::debug!(%category, %url, "fetching oura endpoint");
        self.call_api(Method::GET, &url, &category.range_query(range))
            .await
    }
}
