//! Item record parsing.
//!
//! Reads item records from JSONL (one record per line) or from a JSON array,
//! with:
//! - Graceful error recovery for malformed records (lenient mode)
//! - Parsing statistics
//! - Directory inputs walked for `*.json` / `*.jsonl` files
//!
//! # Example
//!
//! ```rust
//! use issue_status_metrics::parser::ItemParser;
//!
//! let content = r#"{"id": 1, "created_at": "2024-01-01T00:00:00Z", "state": "open"}
//! not json
//! "#;
//!
//! let mut parser = ItemParser::new().with_lenient(true);
//! let records = parser.parse_str(content)?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(parser.stats().lines_skipped, 1);
//! # Ok::<(), issue_status_metrics::MetricsError>(())
//! ```
//!
//! # Parsing Modes
//!
//! - **Lenient mode** (default): Skips malformed records, logs errors
//! - **Strict mode**: Fails on first parse error

mod record;

pub use record::*;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument, trace, warn};
use walkdir::WalkDir;

use crate::error::{MetricsError, Result};

/// File extensions picked up when walking directories.
pub const INPUT_EXTENSIONS: &[&str] = &["json", "jsonl"];

/// Parser for item record files.
#[derive(Debug)]
pub struct ItemParser {
    /// Whether to skip malformed records instead of failing.
    lenient: bool,
    /// Statistics about parsing.
    stats: ParseStats,
}

/// Statistics about parsing operations.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    /// Total lines (or array elements) processed.
    pub lines_processed: usize,
    /// Successfully parsed records.
    pub records_parsed: usize,
    /// Malformed/skipped records.
    pub lines_skipped: usize,
    /// Empty lines.
    pub empty_lines: usize,
    /// Parsing errors encountered.
    pub errors: Vec<ParseError>,
}

impl ParseStats {
    /// Calculate success rate as percentage.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let valid = self.lines_processed - self.empty_lines;
        if valid == 0 {
            return 100.0;
        }
        (self.records_parsed as f64 / valid as f64) * 100.0
    }

    /// Fold another run's statistics into this one.
    pub fn merge(&mut self, other: &ParseStats) {
        self.lines_processed += other.lines_processed;
        self.records_parsed += other.records_parsed;
        self.lines_skipped += other.lines_skipped;
        self.empty_lines += other.empty_lines;
        self.errors.extend(other.errors.iter().cloned());
    }
}

/// A parsing error with context.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Line number (or 1-based array index) where the error occurred.
    pub line: usize,
    /// Error message.
    pub message: String,
    /// Original content (truncated).
    pub content_preview: String,
}

impl ItemParser {
    /// Create a new parser with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lenient: true,
            stats: ParseStats::default(),
        }
    }

    /// Set lenient mode (skip malformed records instead of failing).
    #[must_use]
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Get parse statistics of the last run.
    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parse an item file from a path.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<ItemRecord>> {
        let path = path.as_ref();
        debug!("Opening file for parsing");

        let mut file = File::open(path).map_err(|e| open_error(path, e))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| MetricsError::io(format!("Failed to read {}", path.display()), e))?;

        self.parse_str(&content)
    }

    /// Parse records from a string, detecting JSON array vs JSONL.
    ///
    /// In lenient mode, content that starts like an array but is not valid
    /// JSON is retried line by line.
    pub fn parse_str(&mut self, content: &str) -> Result<Vec<ItemRecord>> {
        if content.trim_start().starts_with('[') {
            match self.parse_array(content) {
                Ok(records) => return Ok(records),
                Err(e) if self.lenient => {
                    debug!(error = %e, "Not a JSON array, falling back to JSONL");
                }
                Err(e) => return Err(e),
            }
        }
        self.parse_reader(content.as_bytes())
    }

    /// Parse JSONL records from a reader.
    #[instrument(skip(self, reader), level = "debug")]
    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<Vec<ItemRecord>> {
        let mut records = Vec::new();
        self.stats = ParseStats::default();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line_num = line_num + 1;
            self.stats.lines_processed += 1;

            let line = match line_result {
                Ok(l) => l,
                Err(e) => {
                    if self.lenient {
                        self.record_error(line_num, format!("I/O error: {e}"), "");
                        warn!(line = line_num, error = %e, "I/O error reading line, skipping");
                        continue;
                    }
                    return Err(MetricsError::io(format!("Failed to read line {line_num}"), e));
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                self.stats.empty_lines += 1;
                continue;
            }

            match serde_json::from_str::<ItemRecord>(trimmed) {
                Ok(record) => {
                    self.stats.records_parsed += 1;
                    records.push(record);
                }
                Err(e) => {
                    if self.lenient {
                        self.record_error(line_num, e.to_string(), trimmed);
                        trace!(line = line_num, error = %e, "Parse error, skipping line");
                        continue;
                    }
                    return Err(MetricsError::parse_with_source(line_num, e.to_string(), e));
                }
            }
        }

        debug!(
            records = records.len(),
            lines = self.stats.lines_processed,
            skipped = self.stats.lines_skipped,
            "Parsing complete"
        );
        Ok(records)
    }

    /// Parse a JSON array of records.
    fn parse_array(&mut self, content: &str) -> Result<Vec<ItemRecord>> {
        self.stats = ParseStats::default();

        let elements: Vec<Value> = serde_json::from_str(content)
            .map_err(|e| MetricsError::parse_with_source(e.line(), "Invalid JSON array", e))?;

        let mut records = Vec::with_capacity(elements.len());
        for (idx, element) in elements.into_iter().enumerate() {
            let position = idx + 1;
            self.stats.lines_processed += 1;
            match serde_json::from_value::<ItemRecord>(element) {
                Ok(record) => {
                    self.stats.records_parsed += 1;
                    records.push(record);
                }
                Err(e) => {
                    if self.lenient {
                        self.record_error(position, e.to_string(), "");
                        trace!(element = position, error = %e, "Parse error, skipping element");
                        continue;
                    }
                    return Err(MetricsError::parse_with_source(position, e.to_string(), e));
                }
            }
        }

        debug!(records = records.len(), skipped = self.stats.lines_skipped, "Array parsing complete");
        Ok(records)
    }

    fn record_error(&mut self, line: usize, message: String, content: &str) {
        self.stats.lines_skipped += 1;
        self.stats.errors.push(ParseError {
            line,
            message,
            content_preview: truncate_preview(content, 100),
        });
    }
}

impl Default for ItemParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand input paths: files are kept, directories are walked for
/// `*.json` / `*.jsonl` files in sorted order.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable directory entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|p| {
                    p.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext))
                })
                .collect();
            found.sort();
            debug!(dir = %path.display(), files = found.len(), "Walked input directory");
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(MetricsError::FileNotFound { path: path.clone() });
        }
    }
    Ok(files)
}

/// Read a whole document (for the extractor) from a path.
pub fn read_document(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut content = String::new();
    BufReader::new(file)
        .read_to_string(&mut content)
        .map_err(|e| MetricsError::io(format!("Failed to read {}", path.display()), e))?;
    Ok(content)
}

fn open_error(path: &Path, e: std::io::Error) -> MetricsError {
    match e.kind() {
        std::io::ErrorKind::NotFound => MetricsError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => MetricsError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => MetricsError::io(format!("Failed to open {}", path.display()), e),
    }
}

/// Truncate a string for preview display.
///
/// Uses character-aware truncation to avoid panicking on multi-byte UTF-8 characters.
fn truncate_preview(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
