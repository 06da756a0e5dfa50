//! Fetch profiles
//!
//! A profile describes one paginated endpoint in YAML (or JSON):
//!
//! ```yaml
//! base_url: https://api.example.com/v1
//! model: posts
//! limit_param: per
//! offset_param: p
//! total_count_param: pagination.total
//! records_field: data
//! timeout_secs: 10
//! headers:
//!   Authorization: Bearer abc
//! options:
//!   limit: 50
//!   status: published
//! ```

use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::{CursorConfig, StartOptions};
use crate::source::HttpDataSource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

fn default_records_field() -> String {
    "items".to_string()
}

/// Endpoint and pagination settings for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchProfile {
    /// Base URL of the API
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model identifier, appended to the base URL
    #[serde(default)]
    pub model: Option<String>,

    /// Request/response field names
    #[serde(flatten)]
    pub cursor: CursorConfig,

    /// Response field holding the records
    #[serde(default = "default_records_field")]
    pub records_field: String,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Options passed to `start`
    #[serde(default)]
    pub options: StartOptions,
}

impl Default for FetchProfile {
    fn default() -> Self {
        Self {
            base_url: None,
            model: None,
            cursor: CursorConfig::default(),
            records_field: default_records_field(),
            timeout_secs: None,
            headers: HashMap::new(),
            options: StartOptions::default(),
        }
    }
}

impl FetchProfile {
    /// Check that the profile names an endpoint and a model
    pub fn validate(&self) -> Result<()> {
        match self.base_url.as_deref() {
            None | Some("") => return Err(Error::config("Profile base_url cannot be empty")),
            Some(base) => {
                url::Url::parse(base)?;
            }
        }

        if self.model.as_deref().map_or(true, |m| m.trim().is_empty()) {
            return Err(Error::config("Profile model cannot be empty"));
        }

        if self.records_field.is_empty() {
            return Err(Error::config("Profile records_field cannot be empty"));
        }

        Ok(())
    }

    /// Model identifier, or an error when unset
    pub fn model_name(&self) -> Result<&str> {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| Error::config("Profile model cannot be empty"))
    }

    /// HTTP client settings for this profile
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder();
        if let Some(base) = &self.base_url {
            builder = builder.base_url(base.clone());
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        for (key, value) in &self.headers {
            builder = builder.header(key.clone(), value.clone());
        }
        builder.build()
    }

    /// Build the data source described by this profile
    pub fn build_source(&self) -> Result<HttpDataSource> {
        self.validate()?;
        let client = HttpClient::with_config(self.http_config())?;
        Ok(HttpDataSource::with_client(client).with_records_field(self.records_field.clone()))
    }
}

/// Load a profile from a YAML or JSON file
pub fn load_profile(path: impl AsRef<Path>) -> Result<FetchProfile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read profile '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_profile_from_str(&content)
}

/// Load a profile from a YAML (or JSON) string
pub fn load_profile_from_str(yaml: &str) -> Result<FetchProfile> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse profile YAML: {e}")))
}
