//! CLI module
//!
//! Command-line interface for paging through HTTP list endpoints.
//!
//! # Commands
//!
//! - `fetch` - Page through a model and write every record
//! - `validate` - Check a profile after applying overrides

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, ProfileOverrides};
pub use runner::{apply_overrides, fetch_all, render, FetchSummary, Runner};
