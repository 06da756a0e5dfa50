// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # offset-infinity
//!
//! Offset-based "infinite scroll" pagination for list endpoints.
//!
//! A [`PaginationCursor`] remembers where a list view left off: the page
//! size, the offset step, the offset most recently consumed and the total
//! count reported by the server. `start` fetches the first page, each
//! `load_next` fetches the next window and appends it to a [`ResultSink`],
//! and the cursor reports itself exhausted once the consumed offset reaches
//! the total count.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use offset_infinity::{Collection, HttpDataSource, PaginationCursor, StartOptions};
//!
//! #[tokio::main]
//! async fn main() -> offset_infinity::Result<()> {
//!     let source = HttpDataSource::new("https://api.example.com/v1")?;
//!     let posts = Collection::new();
//!     let cursor = PaginationCursor::new(source, posts.clone());
//!
//!     cursor
//!         .start("posts", StartOptions::new().limit(20).param("status", "published"))
//!         .await?;
//!
//!     while cursor.can_load_more() {
//!         cursor.load_next().await?;
//!     }
//!
//!     println!("{} posts", posts.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PaginationCursor                        │
//! │  start(model, options)   load_next()   snapshot()            │
//! └──────────────────────────────────────────────────────────────┘
//!          │                       │                     │
//! ┌────────┴────────┬──────────────┴───────┬─────────────┴──────┐
//! │   DataSource    │      ResultSink      │      Notifier      │
//! ├─────────────────┼──────────────────────┼────────────────────┤
//! │ HttpDataSource  │ Collection           │ Immediate          │
//! │ MemorySource    │                      │ Deferred / channel │
//! └─────────────────┴──────────────────────┴────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client
pub mod http;

/// Data sources the cursor fetches pages from
pub mod source;

/// Result sinks the cursor appends records into
pub mod sink;

/// Pagination events and delivery
pub mod notify;

/// Offset pagination cursor
pub mod pagination;

/// Fetch profiles
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{DataSourceError, Error, Result};
pub use types::*;

pub use config::{load_profile, load_profile_from_str, FetchProfile};
pub use notify::{
    Callbacks, Deferred, Immediate, Notifier, PageLoaded, PaginationComplete, PaginationEvent,
    PaginationListener,
};
pub use pagination::{
    CursorConfig, CursorSnapshot, LoadOutcome, NotAdvancing, PaginationCursor, StartOptions,
};
pub use sink::{Collection, ResultSink};
pub use source::{DataSource, HttpDataSource, MemorySource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
