//! In-process data source
//!
//! Serves windows of a fixed record list the way an offset-paginated API
//! would, reporting the list length as `meta.totalCount`.

use super::DataSource;
use crate::error::DataSourceError;
use crate::pagination::{DEFAULT_LIMIT_PARAM, DEFAULT_OFFSET_PARAM};
use crate::types::{parse_count, JsonObject, Page, Record};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Data source over an in-memory record list
#[derive(Debug)]
pub struct MemorySource {
    records: Vec<Record>,
    limit_param: String,
    offset_param: String,
    report_total: bool,
    requests: Mutex<Vec<JsonObject>>,
}

impl MemorySource {
    /// Create a source serving `records`
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            limit_param: DEFAULT_LIMIT_PARAM.to_string(),
            offset_param: DEFAULT_OFFSET_PARAM.to_string(),
            report_total: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Read limit and offset from custom parameter names
    #[must_use]
    pub fn with_param_names(
        mut self,
        limit_param: impl Into<String>,
        offset_param: impl Into<String>,
    ) -> Self {
        self.limit_param = limit_param.into();
        self.offset_param = offset_param.into();
        self
    }

    /// Leave `meta.totalCount` out of responses
    #[must_use]
    pub fn without_total_count(mut self) -> Self {
        self.report_total = false;
        self
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.requests().len()
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<JsonObject> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<JsonObject> {
        self.requests().pop()
    }

    fn window(&self, params: &JsonObject) -> &[Record] {
        let len = self.records.len();
        let offset = params
            .get(&self.offset_param)
            .and_then(parse_count)
            .map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX))
            .min(len);
        let limit = params
            .get(&self.limit_param)
            .and_then(parse_count)
            .map_or(len, |l| usize::try_from(l).unwrap_or(usize::MAX));

        &self.records[offset..offset.saturating_add(limit).min(len)]
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch_page(
        &self,
        _model_name: &str,
        params: &JsonObject,
    ) -> Result<Page, DataSourceError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(params.clone());

        let page = Page::new(self.window(params).to_vec());
        if self.report_total {
            Ok(page.with_total_count(self.records.len() as u64))
        } else {
            Ok(page)
        }
    }
}
