//! Data source module
//!
//! A data source answers one page request at a time:
//! `fetch_page(model_name, params) -> Page`.
//!
//! # Overview
//!
//! - [`DataSource`] - the abstract fetch capability driven by the cursor
//! - [`HttpDataSource`] - JSON REST endpoint (`GET {base_url}/{model}`)
//! - [`MemorySource`] - fixed in-process record list with limit/offset windows

mod http;
mod memory;

pub use http::HttpDataSource;
pub use memory::MemorySource;

use crate::error::DataSourceError;
use crate::types::{JsonObject, Page};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches pages of records for a model
///
/// Implementations own transport, timeouts and decoding. The cursor never
/// issues two calls concurrently on the same source for one session.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch one page for `model_name` with the given request parameters
    async fn fetch_page(
        &self,
        model_name: &str,
        params: &JsonObject,
    ) -> Result<Page, DataSourceError>;
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    async fn fetch_page(
        &self,
        model_name: &str,
        params: &JsonObject,
    ) -> Result<Page, DataSourceError> {
        (**self).fetch_page(model_name, params).await
    }
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Box<T> {
    async fn fetch_page(
        &self,
        model_name: &str,
        params: &JsonObject,
    ) -> Result<Page, DataSourceError> {
        (**self).fetch_page(model_name, params).await
    }
}
