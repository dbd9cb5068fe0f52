//! Utility functions for common operations.
//!
//! This module provides shared utilities used across the crate:
//! - Atomic file writes for configuration
//! - Parsing of instants and grace periods given as text
//! - Human-readable duration formatting

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tempfile::NamedTempFile;

use crate::error::{MetricsError, Result};
use crate::model::round_seconds;

/// Atomically write content to a file.
///
/// The content goes to a temporary file in the target's directory, is
/// flushed, and then renamed over the target. If any step fails, the
/// original file (if it exists) remains unchanged. Missing parent
/// directories are created.
///
/// # Example
///
/// ```rust,no_run
/// use issue_status_metrics::util::atomic_write;
///
/// atomic_write("config.toml", b"[statuses]\nnames = []\n").unwrap();
/// ```
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => {
            return Err(MetricsError::IoError {
                context: format!("Cannot determine parent directory for: {}", path.display()),
                source: io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
            })
        }
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            MetricsError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    // Same directory keeps the rename on one filesystem
    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        MetricsError::io(format!("Failed to create temporary file in: {}", parent.display()), e)
    })?;

    temp_file
        .write_all(content)
        .and_then(|()| temp_file.flush())
        .map_err(|e| MetricsError::io(format!("Failed to write temporary file for: {}", path.display()), e))?;

    temp_file.persist(path).map_err(|e| {
        MetricsError::io(format!("Failed to atomically write file: {}", path.display()), e.error)
    })?;

    Ok(())
}

/// Parse an RFC 3339 instant such as `2024-03-01T12:00:00Z`.
pub fn parse_instant(name: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MetricsError::invalid_argument(name, format!("expected an RFC 3339 timestamp ({e})")))
}

/// Parse a human duration such as `5m`, `90s` or `1h 30m`.
pub fn parse_grace_period(value: &str) -> Result<Duration> {
    let std = humantime::parse_duration(value.trim())
        .map_err(|e| MetricsError::invalid_argument("grace_period", e.to_string()))?;
    Duration::from_std(std).map_err(|e| MetricsError::invalid_argument("grace_period", e.to_string()))
}

/// Format a duration for people, e.g. `1h 2m 5s`.
///
/// Rounded to whole seconds. Zero prints as `0s`.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let secs = round_seconds(d).max(0) as u64;
    humantime::format_duration(std::time::Duration::from_secs(secs)).to_string()
}

/// Format an optional duration, printing `-` when absent.
#[must_use]
pub fn format_optional(d: Option<Duration>, humanize: bool) -> String {
    match d {
        Some(d) if humanize => format_duration(d),
        Some(d) => round_seconds(d).to_string(),
        None => "-".to_string(),
    }
}
