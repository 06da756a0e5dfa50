//! Pagination types
//!
//! Configuration and result types shared by the cursor and its callers.

use crate::error::{Error, Result};
use crate::notify::PageLoaded;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Page size used when `limit` is not given
pub const DEFAULT_LIMIT: u64 = 25;

/// Default request field for the page size
pub const DEFAULT_LIMIT_PARAM: &str = "limit";

/// Default request field for the offset
pub const DEFAULT_OFFSET_PARAM: &str = "offset";

/// Default dot path of the total count in a response
pub const DEFAULT_TOTAL_COUNT_PARAM: &str = "meta.totalCount";

// ============================================================================
// Cursor Config
// ============================================================================

/// Request/response field names, fixed for the lifetime of a cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Request field carrying the page size
    pub limit_param: String,
    /// Request field carrying the offset
    pub offset_param: String,
    /// Dot path of the total count in a response
    pub total_count_param: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            limit_param: DEFAULT_LIMIT_PARAM.to_string(),
            offset_param: DEFAULT_OFFSET_PARAM.to_string(),
            total_count_param: DEFAULT_TOTAL_COUNT_PARAM.to_string(),
        }
    }
}

impl CursorConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size request field
    #[must_use]
    pub fn limit_param(mut self, name: impl Into<String>) -> Self {
        self.limit_param = name.into();
        self
    }

    /// Set the offset request field
    #[must_use]
    pub fn offset_param(mut self, name: impl Into<String>) -> Self {
        self.offset_param = name.into();
        self
    }

    /// Set the total count path
    #[must_use]
    pub fn total_count_param(mut self, path: impl Into<String>) -> Self {
        self.total_count_param = path.into();
        self
    }
}

// ============================================================================
// Start Options
// ============================================================================

/// Options accepted by `start`
///
/// Recognized keys are `initialOffset`, `limit`, `offsetStep` and `modelPath`.
/// Every other key is a pass-through filter parameter sent with each fetch.
///
/// `offsetStep` is independent of `limit`: a step smaller than the limit
/// re-requests records already loaded and a larger one skips records. Both
/// are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    /// Starting offset (default 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_offset: Option<u64>,

    /// Page size (default 25)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Offset increment per `load_next` (default = limit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_step: Option<u64>,

    /// Location of the collection in caller state, recorded for caller wiring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,

    /// Pass-through filter parameters
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl StartOptions {
    /// Create empty options (all defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object
    pub fn from_value(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Null => Ok(Self::default()),
            JsonValue::Object(_) => serde_json::from_value(value)
                .map_err(|e| Error::invalid_value("options", e.to_string())),
            other => Err(Error::invalid_value(
                "options",
                format!("expected an object, got {other}"),
            )),
        }
    }

    /// Set the starting offset
    #[must_use]
    pub fn initial_offset(mut self, offset: u64) -> Self {
        self.initial_offset = Some(offset);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the offset increment
    #[must_use]
    pub fn offset_step(mut self, step: u64) -> Self {
        self.offset_step = Some(step);
        self
    }

    /// Set the model path
    #[must_use]
    pub fn model_path(mut self, path: impl Into<String>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Add a pass-through parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Overlay `other` on top of these options
    ///
    /// Recognized keys set in `other` win; extra parameters are merged key by key.
    #[must_use]
    pub fn merge(mut self, other: StartOptions) -> Self {
        self.initial_offset = other.initial_offset.or(self.initial_offset);
        self.limit = other.limit.or(self.limit);
        self.offset_step = other.offset_step.or(self.offset_step);
        self.model_path = other.model_path.or(self.model_path);
        self.extra.extend(other.extra);
        self
    }

    /// Effective page size
    pub fn resolved_limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Effective offset step
    pub fn resolved_offset_step(&self) -> u64 {
        self.offset_step.unwrap_or_else(|| self.resolved_limit())
    }
}

// ============================================================================
// Load Outcome
// ============================================================================

/// Why `load_next` did not fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotAdvancing {
    /// Another fetch for this cursor is still in flight
    Busy,
    /// No more pages exist
    Exhausted,
}

/// Result of a `load_next` call
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A page was fetched and appended
    Advanced(PageLoaded),
    /// Nothing was fetched
    NotAdvancing(NotAdvancing),
}

impl LoadOutcome {
    /// Check if a page was loaded
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced(_))
    }

    /// The loaded page, if any
    pub fn page(&self) -> Option<&PageLoaded> {
        match self {
            Self::Advanced(page) => Some(page),
            Self::NotAdvancing(_) => None,
        }
    }

    /// Why nothing was loaded, if so
    pub fn halt_reason(&self) -> Option<NotAdvancing> {
        match self {
            Self::Advanced(_) => None,
            Self::NotAdvancing(reason) => Some(*reason),
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Point-in-time view of a pagination session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorSnapshot {
    /// Model identifier passed to the data source
    pub model_name: String,
    /// Page size
    pub limit: u64,
    /// Offset increment
    pub offset_step: u64,
    /// Offset most recently consumed
    pub current_offset: u64,
    /// Total count, once reported
    pub total_count: Option<u64>,
    /// A follow-up fetch is in flight
    pub loading_more: bool,
    /// No more pages will be requested
    pub exhausted: bool,
    /// Pass-through filter parameters
    pub extra_params: JsonObject,
    /// Caller wiring hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
}
