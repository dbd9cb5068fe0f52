//! Status-event extraction from raw issue documents.
//!
//! Turns a saved issue page (or its embedded JSON payload) into the ordered
//! [`StatusEvent`] sequence the accumulator consumes. Each timeline node that
//! carries a `status` key is a change record:
//!
//! - the new status, when it is of interest, yields an ENTERED event
//! - a non-empty previous status of interest yields a LEFT event at the
//!   same timestamp
//!
//! A record whose new and previous status are the same yields only the
//! ENTERED event.
//!
//! Absence of data is not an error here: a document without a parsable
//! payload produces an empty sequence.
//!
//! # Example
//!
//! ```rust
//! use issue_status_metrics::extraction::TimelineExtractor;
//! use issue_status_metrics::model::StatusSet;
//!
//! let statuses: StatusSet = ["Todo", "In Progress"].into_iter().collect();
//! let mut extractor = TimelineExtractor::new(statuses);
//!
//! let events = extractor.extract("<html>no payload here</html>");
//! assert!(events.is_empty());
//! ```

mod embedded;

pub use embedded::*;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::model::{StatusEvent, StatusSet};

/// JSON pointer to the timeline edges inside the embedded payload.
pub const TIMELINE_EDGES_POINTER: &str =
    "/payload/preloadedQueries/0/result/data/repository/issue/frontTimelineItems/edges";

/// Timestamp layout used by timeline nodes.
const NODE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Statistics about the last extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Whether a timeline was found in the document.
    pub timeline_found: bool,
    /// Timeline nodes inspected.
    pub nodes_seen: usize,
    /// Nodes carrying a status change.
    pub change_records: usize,
    /// Change records dropped because their timestamp did not parse.
    pub records_dropped: usize,
    /// Events emitted.
    pub events_emitted: usize,
}

/// Extracts status events for a fixed set of statuses of interest.
#[derive(Debug, Clone)]
pub struct TimelineExtractor {
    statuses: StatusSet,
    stats: ExtractStats,
}

impl TimelineExtractor {
    /// Create an extractor for the given statuses.
    #[must_use]
    pub fn new(statuses: StatusSet) -> Self {
        Self {
            statuses,
            stats: ExtractStats::default(),
        }
    }

    /// Statuses this extractor keeps.
    #[must_use]
    pub fn statuses(&self) -> &StatusSet {
        &self.statuses
    }

    /// Statistics of the last extraction.
    #[must_use]
    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Extract events from a raw document (HTML page or bare JSON payload).
    #[instrument(skip_all, fields(len = document.len()))]
    pub fn extract(&mut self, document: &str) -> Vec<StatusEvent> {
        self.stats = ExtractStats::default();
        match parse_document(document) {
            Some(payload) => self.extract_payload(&payload),
            None => {
                debug!("No structured payload in document");
                Vec::new()
            }
        }
    }

    /// Extract events from an already-parsed payload.
    pub fn extract_payload(&mut self, payload: &Value) -> Vec<StatusEvent> {
        self.stats = ExtractStats::default();

        let Some(edges) = payload.pointer(TIMELINE_EDGES_POINTER).and_then(Value::as_array) else {
            debug!("Payload has no timeline edges");
            return Vec::new();
        };
        self.stats.timeline_found = true;

        let mut events = Vec::new();
        for edge in edges {
            self.stats.nodes_seen += 1;
            let Some(node) = edge.get("node") else {
                continue;
            };
            self.extract_node(node, &mut events);
        }

        // Stable: ENTERED before LEFT for records sharing a timestamp.
        events.sort_by_key(|e| e.timestamp);
        self.stats.events_emitted = events.len();

        debug!(
            nodes = self.stats.nodes_seen,
            records = self.stats.change_records,
            dropped = self.stats.records_dropped,
            events = events.len(),
            "Extraction complete"
        );
        events
    }

    fn extract_node(&mut self, node: &Value, events: &mut Vec<StatusEvent>) {
        let Some(status) = node.get("status") else {
            return;
        };
        self.stats.change_records += 1;

        let status = status.as_str().filter(|s| self.statuses.contains(s));
        let previous = node
            .get("previousStatus")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty() && self.statuses.contains(p))
            .filter(|p| Some(*p) != status);

        if status.is_none() && previous.is_none() {
            return;
        }

        let raw_ts = node.get("createdAt").and_then(Value::as_str).unwrap_or_default();
        let Some(timestamp) = parse_node_timestamp(raw_ts) else {
            self.stats.records_dropped += 1;
            warn!(created_at = raw_ts, "Dropping status change with unparsable timestamp");
            return;
        };

        if let Some(status) = status {
            events.push(StatusEvent::entered(timestamp, status));
        }
        if let Some(previous) = previous {
            events.push(StatusEvent::left(timestamp, previous));
        }
    }
}

/// Convenience wrapper: extract events from a document in one call.
#[must_use]
pub fn extract_status_events(document: &str, statuses: &StatusSet) -> Vec<StatusEvent> {
    TimelineExtractor::new(statuses.clone()).extract(document)
}

/// Parse a timeline node timestamp (`%Y-%m-%dT%H:%M:%SZ`, RFC 3339 accepted).
fn parse_node_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, NODE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}
