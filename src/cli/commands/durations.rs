//! Durations command implementation.
//!
//! Shows, for every item, how long it spent in each configured status.

use crate::analytics::{ItemStatusTimes, StatusReport};
use crate::cli::{Cli, DurationsArgs, OutputFormat};
use crate::error::Result;
use crate::util::format_optional;

use super::{load_items, render_table, render_tsv, Settings};

/// Run the durations command.
pub fn run(cli: &Cli, args: &DurationsArgs) -> Result<()> {
    let settings = Settings::load(cli)?;
    let items = load_items(&args.paths, &settings)?;
    let report = StatusReport::compute(&items, &settings.accumulator(), settings.now);

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.items)?);
        }
        OutputFormat::Compact => {
            for item in &report.items {
                println!("{}", serde_json::to_string(item)?);
            }
        }
        OutputFormat::Tsv | OutputFormat::Text => print_item_times(cli, &settings, &report),
    }

    Ok(())
}

/// Print per-item durations as a text table or TSV.
pub(crate) fn print_item_times(cli: &Cli, settings: &Settings, report: &StatusReport) {
    let tsv = cli.effective_output() == OutputFormat::Tsv;
    let show_titles = settings.show_titles && !tsv;

    let mut headers = vec!["id".to_string()];
    if show_titles || tsv {
        headers.push("title".to_string());
    }
    headers.push("state".to_string());
    headers.extend(report.statuses.iter().map(str::to_string));

    let rows: Vec<Vec<String>> = report
        .items
        .iter()
        .map(|item| item_row(item, report, show_titles || tsv, settings.humanize && !tsv))
        .collect();

    if tsv {
        print!("{}", render_tsv(&headers, &rows));
    } else if rows.is_empty() {
        if !cli.quiet {
            eprintln!("No items found.");
        }
    } else {
        print!("{}", render_table(&headers, &rows));
    }
}

fn item_row(item: &ItemStatusTimes, report: &StatusReport, with_title: bool, humanize: bool) -> Vec<String> {
    let mut row = vec![item.id.clone()];
    if with_title {
        row.push(item.title.clone().unwrap_or_default());
    }
    row.push(item.state.to_string());
    row.extend(
        report
            .statuses
            .iter()
            .map(|status| format_optional(item.durations.get(status), humanize)),
    );
    row
}
