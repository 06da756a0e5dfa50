//! HTTP client module
//!
//! Provides the JSON client used by [`HttpDataSource`](crate::source::HttpDataSource).

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};

#[cfg(test)]
mod tests;
