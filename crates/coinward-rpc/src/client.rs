//! Base REST/JSON HTTP client.
//!
//! Provides `get()` and `post()` for JSON endpoints of the indexing service.
//! Supports Basic auth, configurable timeout, and retry with exponential backoff.

use crate::error::RpcError;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

/// Configuration for an RPC client.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Base URL (e.g., `http://localhost:18110`).
    pub url: String,
    /// Optional username for Basic auth.
    pub username: Option<String>,
    /// Optional password for Basic auth.
    pub password: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Number of retry attempts on transient failure.
    pub retries: u32,
    /// Initial delay between retries (doubles each attempt).
    pub retry_delay: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:18110".to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
            retries: 2,
            retry_delay: Duration::from_millis(500),
        }
    }
}

enum Method<'a> {
    Get,
    Post(&'a Value),
}

/// Async client for the indexer's JSON endpoints.
pub struct RestClient {
    client: reqwest::Client,
    config: RpcConfig,
}

impl RestClient {
    /// Create a new client with the given URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Self::with_config(RpcConfig {
            url: url.to_string(),
            ..Default::default()
        })
    }

    /// Create a new client with full configuration.
    pub fn with_config(mut config: RpcConfig) -> Result<Self, RpcError> {
        config.url = config.url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| RpcError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the configured base URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn auth_header(&self) -> Option<HeaderValue> {
        match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => {
                let creds = format!("{}:{}", user, pass);
                let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
                HeaderValue::from_str(&format!("Basic {}", encoded)).ok()
            }
            _ => None,
        }
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(auth) = self.auth_header() {
            headers.insert(AUTHORIZATION, auth);
        }
        headers
    }

    /// GET a JSON endpoint.
    pub async fn get(&self, endpoint: &str) -> Result<Value, RpcError> {
        self.with_retries(endpoint, Method::Get).await
    }

    /// POST JSON to an endpoint.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, RpcError> {
        self.with_retries(endpoint, Method::Post(body)).await
    }

    async fn with_retries(&self, endpoint: &str, method: Method<'_>) -> Result<Value, RpcError> {
        let url = format!("{}{}", self.config.url, endpoint);
        let attempts = self.config.retries + 1;

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.config.retry_delay * 2u32.saturating_pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }

            match self.do_request(&url, endpoint, &method).await {
                Ok(val) => return Ok(val),
                Err(e) => {
                    let should_retry = e.is_transient() && attempt + 1 < attempts;
                    if !should_retry {
                        return Err(e);
                    }
                    log::warn!(
                        "{} failed (attempt {}/{}): {}; retrying",
                        endpoint,
                        attempt + 1,
                        attempts,
                        e
                    );
                }
            }
            attempt += 1;
        }
    }

    async fn do_request(
        &self,
        url: &str,
        endpoint: &str,
        method: &Method<'_>,
    ) -> Result<Value, RpcError> {
        let request = match method {
            Method::Get => self.client.get(url),
            Method::Post(body) => self.client.post(url).json(body),
        };

        let resp = request
            .headers(self.build_headers())
            .send()
            .await
            .map_err(|e| RpcError::Http {
                endpoint: endpoint.to_string(),
                url: url.to_string(),
                source: e,
            })?;

        let status = resp.status().as_u16();

        if status == 401 {
            return Err(RpcError::AuthFailed {
                url: url.to_string(),
            });
        }

        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::HttpStatus {
                endpoint: endpoint.to_string(),
                url: url.to_string(),
                status,
                body: body.chars().take(500).collect(),
            });
        }

        let val: Value = resp.json().await.map_err(|e| RpcError::Http {
            endpoint: endpoint.to_string(),
            url: url.to_string(),
            source: e,
        })?;

        Ok(val)
    }
}
