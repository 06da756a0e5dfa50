//! REST data source
//!
//! Issues `GET {base_url}/{model_name}` with the page parameters in the query
//! string and decodes the JSON body into a [`Page`].

use super::DataSource;
use crate::error::{DataSourceError, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::{JsonObject, JsonValue, Page};
use async_trait::async_trait;
use tracing::debug;

/// Default response field holding the records
pub const DEFAULT_RECORDS_FIELD: &str = "items";

/// Data source backed by a JSON REST endpoint
#[derive(Debug)]
pub struct HttpDataSource {
    client: HttpClient,
    records_field: String,
}

impl HttpDataSource {
    /// Create a source for `base_url` with default client settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let config = HttpClientConfig::builder().base_url(base_url).build();
        Ok(Self::with_client(HttpClient::with_config(config)?))
    }

    /// Create a source from a configured client
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client,
            records_field: DEFAULT_RECORDS_FIELD.to_string(),
        }
    }

    /// Set the response field holding the records
    #[must_use]
    pub fn with_records_field(mut self, field: impl Into<String>) -> Self {
        self.records_field = field.into();
        self
    }

    /// Response field holding the records
    pub fn records_field(&self) -> &str {
        &self.records_field
    }

    /// Get the underlying client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_page(
        &self,
        model_name: &str,
        params: &JsonObject,
    ) -> std::result::Result<Page, DataSourceError> {
        let query = to_query(params);
        debug!(model = model_name, ?query, "Fetching page");

        match self.client.get_json(model_name, &query).await? {
            // 204 No Content
            JsonValue::Null => Ok(Page::default()),
            body => Page::from_response(body, &self.records_field),
        }
    }
}

/// Flatten request parameters into query pairs
///
/// Strings are sent verbatim, other scalars via their JSON text, nulls are
/// dropped and arrays/objects are sent JSON-encoded.
pub(crate) fn to_query(params: &JsonObject) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                JsonValue::Null => return None,
                JsonValue::String(s) => s.clone(),
                JsonValue::Bool(b) => b.to_string(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}
