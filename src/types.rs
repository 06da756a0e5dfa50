//! Common types used throughout offset-infinity
//!
//! This module contains shared type definitions, type aliases,
//! and the [`Page`] returned by every data source.

use crate::error::DataSourceError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single fetched record
pub type Record = JsonValue;

// ============================================================================
// Page
// ============================================================================

/// One page of results returned by a data source
///
/// Besides `items` and `meta`, any other top-level fields of the response are
/// kept in `extra` so that a total count can be addressed wherever the server
/// puts it (e.g. `pagination.total`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Records in server order
    #[serde(default)]
    pub items: Vec<Record>,

    /// Response metadata (`meta` object)
    #[serde(default)]
    pub meta: JsonObject,

    /// Remaining top-level response fields
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Page {
    /// Create a page from items only
    pub fn new(items: Vec<Record>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Set `meta.totalCount`
    #[must_use]
    pub fn with_total_count(mut self, total: u64) -> Self {
        self.meta.insert("totalCount".to_string(), total.into());
        self
    }

    /// Set an arbitrary meta field
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Set an arbitrary top-level field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Build a page from a decoded JSON response body
    ///
    /// A top-level array is taken as the items. For an object, the array under
    /// `records_field` becomes the items (absent means an empty page), the
    /// `meta` object becomes the metadata and everything else is kept in `extra`.
    pub fn from_response(
        body: JsonValue,
        records_field: &str,
    ) -> std::result::Result<Self, DataSourceError> {
        match body {
            JsonValue::Array(items) => Ok(Self::new(items)),
            JsonValue::Object(mut map) => {
                let items = match map.remove(records_field) {
                    Some(JsonValue::Array(items)) => items,
                    Some(JsonValue::Null) | None => Vec::new(),
                    Some(other) => {
                        return Err(DataSourceError::decode(format!(
                            "field '{records_field}' is not an array (got {})",
                            type_name(&other)
                        )))
                    }
                };

                let meta = match map.remove("meta") {
                    Some(JsonValue::Object(meta)) => meta,
                    Some(other) => {
                        map.insert("meta".to_string(), other);
                        JsonObject::new()
                    }
                    None => JsonObject::new(),
                };

                Ok(Self {
                    items,
                    meta,
                    extra: map,
                })
            }
            other => Err(DataSourceError::decode(format!(
                "expected a JSON object or array, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Resolve a dot path against this page
    ///
    /// The first segment selects `meta`, `items` (followed by an index) or a
    /// top-level field from `extra`. A leading `$.` is ignored.
    pub fn lookup(&self, path: &str) -> Option<&JsonValue> {
        let path = path.strip_prefix("$.").unwrap_or(path);
        let mut parts = path.split('.');
        let head = parts.next()?;

        let mut current = match head {
            "meta" => self.meta.get(parts.next()?)?,
            "items" => self.items.get(parts.next()?.parse::<usize>().ok()?)?,
            _ => self.extra.get(head)?,
        };

        for part in parts {
            current = match current {
                JsonValue::Object(map) => map.get(part)?,
                JsonValue::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Read a count at `path`, `None` when absent or not a non-negative integer
    pub fn count_at(&self, path: &str) -> Option<u64> {
        self.lookup(path).and_then(parse_count)
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Interpret a JSON value as a non-negative count
///
/// Integers, integral floats and numeric strings are accepted.
pub fn parse_count(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
