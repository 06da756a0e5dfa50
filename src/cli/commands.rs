//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Offset-based infinite scroll over HTTP list endpoints
#[derive(Parser, Debug)]
#[command(name = "offset-infinity")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Fetch profile (YAML or JSON)
    #[arg(short, long, global = true)]
    pub profile: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a model and write every record
    Fetch {
        #[command(flatten)]
        overrides: ProfileOverrides,

        /// Stop after this many pages (including the first)
        #[arg(long)]
        max_pages: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the resolved profile and print it
    Validate {
        #[command(flatten)]
        overrides: ProfileOverrides,
    },
}

/// Flags that override fields of the loaded profile
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileOverrides {
    /// Base URL of the API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Inline start options JSON, e.g. '{"limit": 50, "status": "open"}'
    #[arg(long)]
    pub options: Option<String>,

    /// Request field carrying the page size
    #[arg(long)]
    pub limit_param: Option<String>,

    /// Request field carrying the offset
    #[arg(long)]
    pub offset_param: Option<String>,

    /// Dot path of the total count in responses
    #[arg(long)]
    pub total_count_param: Option<String>,

    /// Response field holding the records
    #[arg(long)]
    pub records_field: Option<String>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// A single pretty-printed JSON array
    Json,
    /// One record per line
    Jsonl,
}
