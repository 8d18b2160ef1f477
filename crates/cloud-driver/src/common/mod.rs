//! Common utilities for provider HTTP clients
//!
//! Provides the authenticated JSON transport shared by all native API clients.
//! Failed responses are normalized through the platform's [`ErrorDialect`]
//! at the point of failure.

use crate::error::CloudError;
use crate::normalize::ErrorDialect;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Header carrying the native error type on AWS-style REST APIs
pub const ERROR_TYPE_HEADER: &str = "x-amzn-ErrorType";

/// HTTP client wrapper with authentication
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
    dialect: ErrorDialect,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    ///
    /// # Arguments
    /// * `base_url` - API endpoint (e.g., "https://eks.us-east-1.amazonaws.com")
    /// * `token` - pre-authorized bearer token handed over by the credential resolver
    /// * `dialect` - error vocabulary of the platform behind `base_url`
    pub fn new(base_url: String, token: String, dialect: ErrorDialect) -> Result<Self, CloudError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            dialect,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from an endpoint-relative path
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CloudError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let request = self.client.get(&url);
        self.send(request).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CloudError> {
        let url = self.build_url(path);
        debug!(
            "POST {} with body: {}",
            url,
            serde_json::to_string(body).unwrap_or_default()
        );

        let request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);
        self.send(request).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, CloudError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let request = self.client.delete(&url);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CloudError> {
        let response = request
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_type = response
                .headers()
                .get(ERROR_TYPE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(self
                .dialect
                .normalize_response(status.as_u16(), error_type.as_deref(), &body));
        }

        let body = response.text().await?;
        // Empty success bodies decode as JSON null so `()` responses work
        let json = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(json).map_err(|e| CloudError::Unknown {
            code: "DecodeError".to_string(),
            message: format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                json.chars().take(500).collect::<String>()
            ),
        })
    }
}

/// Encode a single path segment
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build query string from filters
pub fn build_query_string(filters: &[(&str, &str)]) -> String {
    filters
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
