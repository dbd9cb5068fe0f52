//! status-metrics: time-in-status accounting for issue tracker histories.
//!
//! Reads item histories (or saved issue pages), measures how long each item
//! spent in each configured status, and reports mean, median and 90th
//! percentile per status.

use std::process::ExitCode;

use issue_status_metrics::cli;

fn main() -> ExitCode {
    // Logging is initialized by cli::run from --log-level and --log-format
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");

            if std::env::var("RUST_BACKTRACE").is_ok() {
                if let Some(source) = std::error::Error::source(&e) {
                    eprintln!("Caused by: {source}");
                }
            }

            ExitCode::from(e.exit_code() as u8)
        }
    }
}
