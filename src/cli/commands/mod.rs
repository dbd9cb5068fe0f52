//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic. Shared settings resolution and item
//! loading live here.

pub mod config;
pub mod durations;
pub mod events;
pub mod stats;

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::analytics::StatusAccumulator;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{MetricsError, Result};
use crate::extraction::TimelineExtractor;
use crate::model::{StatusSet, TrackedItem};
use crate::parser::{collect_input_files, ItemParser, ParseStats};
use crate::util::{parse_grace_period, parse_instant};

/// Effective settings for one run: configuration with command-line overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Statuses to account for.
    pub statuses: StatusSet,
    /// Closure grace period.
    pub grace_period: Duration,
    /// Evaluation instant for open items.
    pub now: DateTime<Utc>,
    /// Skip malformed records instead of failing.
    pub lenient: bool,
    /// Print durations as `1h 2m` in text output.
    pub humanize: bool,
    /// Show item titles in text output.
    pub show_titles: bool,
}

impl Settings {
    /// Load configuration and apply command-line overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        Self::resolve(cli, &load_config(cli)?)
    }

    /// Apply command-line overrides to a loaded configuration.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let statuses: StatusSet = if cli.statuses.is_empty() {
            config.status_set()
        } else {
            cli.statuses.iter().map(|s| s.trim()).collect()
        };
        if statuses.is_empty() {
            return Err(MetricsError::ConfigError {
                message: "No statuses configured; pass -S/--status or set statuses.names".to_string(),
            });
        }

        let grace_period = match &cli.grace_period {
            Some(value) => parse_grace_period(value)?,
            None => config.grace_period()?,
        };

        let now = match &cli.now {
            Some(value) => parse_instant("now", value)?,
            None => Utc::now(),
        };

        debug!(statuses = statuses.len(), %grace_period, %now, "Resolved settings");

        Ok(Self {
            statuses,
            grace_period,
            now,
            lenient: config.accounting.lenient && !cli.strict,
            humanize: config.display.humanize,
            show_titles: config.display.show_titles,
        })
    }

    /// Extractor for the configured statuses.
    #[must_use]
    pub fn extractor(&self) -> TimelineExtractor {
        TimelineExtractor::new(self.statuses.clone())
    }

    /// Accumulator for the configured statuses and grace period.
    #[must_use]
    pub fn accumulator(&self) -> StatusAccumulator {
        StatusAccumulator::new(self.statuses.clone()).with_close_grace(self.grace_period)
    }
}

/// Load configuration from `--config` or the default locations.
pub fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| MetricsError::io("Failed to determine working directory", e))?;
            Config::load_for_project(&cwd)
        }
    }
}

/// Read every item from the given files and directories.
///
/// Records without inline events are resolved through the extractor. Items
/// failing validation are reported and kept in lenient mode; in strict mode
/// the first one aborts the run.
pub fn load_items(paths: &[PathBuf], settings: &Settings) -> Result<Vec<TrackedItem>> {
    let files = collect_input_files(paths)?;
    let mut extractor = settings.extractor();
    let mut totals = ParseStats::default();
    let mut items = Vec::new();

    for file in &files {
        let mut parser = ItemParser::new().with_lenient(settings.lenient);
        let records = parser.parse_file(file)?;
        for err in &parser.stats().errors {
            warn!(file = %file.display(), line = err.line, error = %err.message, "Skipped malformed record");
        }
        totals.merge(parser.stats());

        for record in records {
            let tracked = record.into_tracked(&mut extractor);
            if let Err(e) = tracked.item.validate() {
                if !(settings.lenient && e.is_recoverable()) {
                    return Err(e);
                }
                warn!(file = %file.display(), id = %tracked.id, error = %e, "Inconsistent item");
            }
            items.push(tracked);
        }
    }

    info!(
        files = files.len(),
        items = items.len(),
        skipped = totals.lines_skipped,
        "Loaded items"
    );
    Ok(items)
}

/// Render rows as a left-aligned text table with a header.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(idx) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = format_row(headers);
    out.push('\n');
    out.push_str(&format_row(
        &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
    ));
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

/// Render rows as tab-separated values with a header.
pub fn render_tsv(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = headers.join("\t");
    out.push('\n');
    for row in rows {
        out.push_str(&row.iter().map(|c| c.replace(['\t', '\n'], " ")).collect::<Vec<_>>().join("\t"));
        out.push('\n');
    }
    out
}
