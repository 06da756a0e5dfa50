//! Thin JSON HTTP client
//!
//! Provides a client that handles:
//! - Base URL joining
//! - Default headers and user agent
//! - Per-request timeout
//! - Error classification into [`DataSourceError`]
//!
//! Retries are deliberately left to the caller: a failed page is retried by
//! calling `load_next()` again.

use crate::error::{DataSourceError, Error, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("offset-infinity/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client returning decoded JSON bodies
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        if let Some(base) = &config.base_url {
            url::Url::parse(base)?;
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request with query parameters and decode the JSON body
    ///
    /// `204 No Content` yields `Value::Null`.
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<Value, DataSourceError> {
        let full_url = self.build_url(path);

        let mut req = self.client.request(Method::GET, &full_url);
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !query.is_empty() {
            req = req.query(query);
        }

        let response = req.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataSourceError::http_status(status.as_u16(), body));
        }

        debug!("Request succeeded: GET {} ({})", full_url, status);

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| DataSourceError::decode(format!("invalid JSON body: {e}")))
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    fn classify(&self, e: reqwest::Error) -> DataSourceError {
        if e.is_timeout() {
            DataSourceError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            DataSourceError::Http(e)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
