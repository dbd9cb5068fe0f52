//! Stats command implementation.
//!
//! Shows mean, median and 90th percentile of time spent in each status
//! across all items.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::analytics::{AggregateStats, ItemStatusTimes, StatusReport, StatusSummaryRow};
use crate::cli::{Cli, OutputFormat, StatsArgs};
use crate::error::Result;
use crate::util::format_optional;

use super::durations::print_item_times;
use super::{load_items, render_table, render_tsv, Settings};

/// JSON shape of the stats output.
#[derive(Debug, Serialize)]
struct StatsOutput<'a> {
    evaluated_at: DateTime<Utc>,
    item_count: usize,
    open_count: usize,
    #[serde(flatten)]
    stats: &'a AggregateStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a [ItemStatusTimes]>,
}

/// Run the stats command.
pub fn run(cli: &Cli, args: &StatsArgs) -> Result<()> {
    let settings = Settings::load(cli)?;
    let items = load_items(&args.paths, &settings)?;
    let report = StatusReport::compute(&items, &settings.accumulator(), settings.now);

    let output = StatsOutput {
        evaluated_at: report.evaluated_at,
        item_count: report.item_count(),
        open_count: report.open_count(),
        stats: &report.stats,
        items: args.per_item.then_some(report.items.as_slice()),
    };

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Compact => {
            println!("{}", serde_json::to_string(&output)?);
        }
        OutputFormat::Tsv => {
            print!("{}", render_tsv(&headers(), &rows(&report.summary_rows(), false)));
            if args.per_item {
                println!();
                print_item_times(cli, &settings, &report);
            }
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!(
                    "{} items ({} open), evaluated at {}",
                    report.item_count(),
                    report.open_count(),
                    report.evaluated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
                );
                println!();
            }
            print!("{}", render_table(&headers(), &rows(&report.summary_rows(), settings.humanize)));
            if args.per_item {
                println!();
                print_item_times(cli, &settings, &report);
            }
        }
    }

    Ok(())
}

fn headers() -> Vec<String> {
    ["status", "items", "avg", "med", "90p"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn rows(summary: &[StatusSummaryRow], humanize: bool) -> Vec<Vec<String>> {
    summary
        .iter()
        .map(|row| {
            vec![
                row.status.clone(),
                row.items.to_string(),
                format_optional(row.avg, humanize),
                format_optional(row.med, humanize),
                format_optional(row.p90, humanize),
            ]
        })
        .collect()
}
