//! Time-in-status analytics.
//!
//! This module provides:
//! - Per-item accumulation of time spent in each status ([`StatusAccumulator`])
//! - Population statistics across items ([`AggregateStats`])
//! - A report running both over a batch of items at a single instant
//!   ([`StatusReport`])

pub mod accumulator;
pub mod aggregate;

pub use accumulator::*;
pub use aggregate::*;

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info_span};

use crate::model::{ItemState, StatusDurations, StatusSet, TrackedItem};

/// Durations computed for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemStatusTimes {
    /// Item identifier.
    pub id: String,
    /// Item title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Lifecycle state at evaluation.
    pub state: ItemState,
    /// Time spent in each status.
    pub durations: StatusDurations,
}

/// One row of the per-status summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummaryRow {
    /// Status name.
    pub status: String,
    /// Number of items with a value for this status.
    pub items: usize,
    /// Mean duration in whole seconds.
    #[serde(with = "opt_seconds")]
    pub avg: Option<Duration>,
    /// Median duration in whole seconds.
    #[serde(with = "opt_seconds")]
    pub med: Option<Duration>,
    /// 90th percentile in whole seconds.
    #[serde(rename = "90p", with = "opt_seconds")]
    pub p90: Option<Duration>,
}

/// Per-item durations and population statistics evaluated at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Instant used for every open item.
    pub evaluated_at: DateTime<Utc>,
    /// Statuses reported on, in configured order.
    pub statuses: StatusSet,
    /// Per-item results, in input order.
    pub items: Vec<ItemStatusTimes>,
    /// Population statistics.
    pub stats: AggregateStats,
}

impl StatusReport {
    /// Run the accumulator over every item, then aggregate.
    ///
    /// Items are independent and processed in parallel; `now` is shared so
    /// every open item is measured against the same instant.
    pub fn compute(items: &[TrackedItem], accumulator: &StatusAccumulator, now: DateTime<Utc>) -> Self {
        let span = info_span!("status_report", items = items.len(), statuses = accumulator.statuses().len());
        let _guard = span.enter();

        let results: Vec<ItemStatusTimes> = items
            .par_iter()
            .map(|tracked| ItemStatusTimes {
                id: tracked.id.clone(),
                title: tracked.title.clone(),
                state: tracked.item.state,
                durations: accumulator.compute(&tracked.item, now),
            })
            .collect();

        let stats = AggregateStats::from_items(results.iter().map(|r| &r.durations), accumulator.statuses());
        debug!(items = results.len(), "Report computed");

        Self {
            evaluated_at: now,
            statuses: accumulator.statuses().clone(),
            items: results,
            stats,
        }
    }

    /// Number of items in the report.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of open items.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.items.iter().filter(|i| i.state == ItemState::Open).count()
    }

    /// Number of items that have a value for the status.
    #[must_use]
    pub fn observed_items(&self, status: &str) -> usize {
        self.items
            .iter()
            .filter(|i| i.durations.get(status).is_some())
            .count()
    }

    /// Per-status summary rows in configured order.
    #[must_use]
    pub fn summary_rows(&self) -> Vec<StatusSummaryRow> {
        self.statuses
            .iter()
            .map(|status| StatusSummaryRow {
                status: status.to_string(),
                items: self.observed_items(status),
                avg: self.stats.avg.get(status),
                med: self.stats.med.get(status),
                p90: self.stats.p90.get(status),
            })
            .collect()
    }
}

mod opt_seconds {
    use chrono::Duration;
    use serde::Serializer;

    use crate::model::round_seconds;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&round_seconds(*d)),
            None => serializer.serialize_none(),
        }
    }
}
