//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, ProfileOverrides};
use crate::config::{load_profile, FetchProfile};
use crate::error::{Error, Result, ResultExt};
use crate::notify::{Callbacks, Immediate};
use crate::pagination::{LoadOutcome, PaginationCursor, StartOptions};
use crate::sink::Collection;
use crate::types::{JsonValue, Record};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Records gathered by a fetch run
#[derive(Debug, Clone)]
pub struct FetchSummary {
    /// Every record appended to the collection, in fetch order
    pub records: Vec<Record>,
    /// Pages fetched, including the first
    pub pages: usize,
    /// Last reported total count
    pub total_count: Option<u64>,
    /// Whether the cursor reached the end
    pub exhausted: bool,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch {
                overrides,
                max_pages,
                format,
                output,
            } => {
                self.fetch(overrides, *max_pages, *format, output.as_deref())
                    .await
            }
            Commands::Validate { overrides } => self.validate(overrides),
        }
    }

    /// Load the profile file (if any) and apply command-line overrides
    fn resolve_profile(&self, overrides: &ProfileOverrides) -> Result<FetchProfile> {
        let profile = match &self.cli.profile {
            Some(path) => load_profile(path)?,
            None => FetchProfile::default(),
        };
        apply_overrides(profile, overrides)
    }

    async fn fetch(
        &self,
        overrides: &ProfileOverrides,
        max_pages: Option<usize>,
        format: OutputFormat,
        output: Option<&Path>,
    ) -> Result<()> {
        let profile = self.resolve_profile(overrides)?;
        let started = Instant::now();

        let summary = fetch_all(&profile, max_pages).await?;

        info!(
            records = summary.records.len(),
            pages = summary.pages,
            total_count = ?summary.total_count,
            exhausted = summary.exhausted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetch finished"
        );

        let rendered = render(&summary.records, format)?;
        write_output(&rendered, output)
    }

    fn validate(&self, overrides: &ProfileOverrides) -> Result<()> {
        let profile = self.resolve_profile(overrides)?;
        profile.validate()?;

        if self.cli.verbose {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        } else {
            println!("Profile is valid");
        }
        Ok(())
    }
}

/// Overlay command-line flags on a loaded profile
///
/// Inline `--options` are merged over the profile's options: recognized keys
/// replace, pass-through parameters are merged key by key.
pub fn apply_overrides(
    mut profile: FetchProfile,
    overrides: &ProfileOverrides,
) -> Result<FetchProfile> {
    if let Some(base_url) = &overrides.base_url {
        profile.base_url = Some(base_url.clone());
    }
    if let Some(model) = &overrides.model {
        profile.model = Some(model.clone());
    }
    if let Some(name) = &overrides.limit_param {
        profile.cursor.limit_param.clone_from(name);
    }
    if let Some(name) = &overrides.offset_param {
        profile.cursor.offset_param.clone_from(name);
    }
    if let Some(path) = &overrides.total_count_param {
        profile.cursor.total_count_param.clone_from(path);
    }
    if let Some(field) = &overrides.records_field {
        profile.records_field.clone_from(field);
    }
    if let Some(raw) = &overrides.options {
        let value: JsonValue = serde_json::from_str(raw)
            .map_err(|e| Error::invalid_value("options", e.to_string()))?;
        let options = StartOptions::from_value(value)?;
        profile.options = profile.options.merge(options);
    }
    Ok(profile)
}

/// Page through the profile's model until the cursor stops advancing
///
/// An empty page also ends the run, so endpoints that never report a total
/// count still terminate. `max_pages` counts the initial page.
pub async fn fetch_all(profile: &FetchProfile, max_pages: Option<usize>) -> Result<FetchSummary> {
    let source = profile.build_source()?;
    let model = profile.model_name()?;
    let collection = Collection::new();

    let listener = Callbacks::new()
        .on_page_loaded(|page| {
            debug!(
                offset = page.current_offset,
                items = page.new_items.len(),
                total_count = ?page.total_count,
                "Page loaded"
            );
        })
        .on_complete(|done| {
            info!(total_count = ?done.total_count, "Pagination complete");
        });

    let cursor = PaginationCursor::new(source, collection.clone())
        .with_notifier(Immediate(listener))
        .with_config(profile.cursor.clone());

    let first = cursor
        .start(model, profile.options.clone())
        .await
        .with_context(|| format!("Initial fetch of '{model}' failed"))?;

    let mut pages = 1;
    let mut last_len = first.new_items.len();

    while last_len > 0 && max_pages.map_or(true, |max| pages < max) {
        let outcome = cursor.load_next().await.with_context(|| {
            format!(
                "Fetch of '{model}' after offset {} failed",
                cursor.current_offset()
            )
        })?;

        match outcome {
            LoadOutcome::Advanced(page) => {
                pages += 1;
                last_len = page.new_items.len();
            }
            LoadOutcome::NotAdvancing(reason) => {
                debug!(?reason, "Cursor stopped advancing");
                break;
            }
        }
    }

    let exhausted = cursor.is_exhausted();
    if !exhausted && last_len == 0 {
        warn!(
            offset = cursor.current_offset(),
            total_count = ?cursor.total_count(),
            "Empty page before pagination was exhausted"
        );
    }

    Ok(FetchSummary {
        records: collection.items(),
        pages,
        total_count: cursor.total_count(),
        exhausted,
    })
}

/// Serialize records in the requested format
pub fn render(records: &[Record], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(records)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Jsonl => {
            let mut out = String::new();
            for record in records {
                out.push_str(&serde_json::to_string(record)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write '{}'", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
