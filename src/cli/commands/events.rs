//! Events command implementation.
//!
//! Extracts the normalized status event sequence from one saved issue page
//! or JSON payload.

use crate::cli::{Cli, EventsArgs, OutputFormat};
use crate::error::Result;
use crate::model::StatusEvent;
use crate::parser::read_document;

use super::{render_table, render_tsv, Settings};

/// Run the events command.
pub fn run(cli: &Cli, args: &EventsArgs) -> Result<()> {
    let settings = Settings::load(cli)?;
    let document = read_document(&args.document)?;

    let mut extractor = settings.extractor();
    let events = extractor.extract(&document);
    let stats = extractor.stats();

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        OutputFormat::Compact => {
            for event in &events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        OutputFormat::Tsv => {
            print!("{}", render_tsv(&headers(), &rows(&events)));
        }
        OutputFormat::Text => {
            if !events.is_empty() {
                print!("{}", render_table(&headers(), &rows(&events)));
            }
            if !cli.quiet {
                if !stats.timeline_found {
                    eprintln!("No status timeline found in {}", args.document.display());
                }
                eprintln!(
                    "{} events from {} status changes ({} dropped)",
                    events.len(),
                    stats.change_records,
                    stats.records_dropped
                );
            }
        }
    }

    Ok(())
}

fn headers() -> Vec<String> {
    vec!["timestamp".into(), "kind".into(), "status".into()]
}

fn rows(events: &[StatusEvent]) -> Vec<Vec<String>> {
    events
        .iter()
        .map(|e| {
            vec![
                e.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                e.kind.to_string(),
                e.status.clone(),
            ]
        })
        .collect()
}
