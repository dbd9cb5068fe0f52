//! issue-status-metrics: time-in-status accounting for issue tracker histories.
//!
//! Given each item's creation time, optional closure time and a chronological
//! sequence of status-change events, this crate computes how long the item
//! spent in each status of interest, then summarizes those durations across
//! many items with mean, median and 90th percentile.
//!
//! # Features
//!
//! - **Event extraction**: Pull status changes out of a saved issue page or
//!   its embedded JSON payload
//! - **Interval accounting**: Pair entries and exits per status, with a
//!   grace window for events recorded just after closure
//! - **Explicit evaluation instant**: Open items are measured against a
//!   caller-supplied `now`, so results are reproducible
//! - **Population statistics**: Mean, median and linear-interpolated 90th
//!   percentile, rounded half-to-even to whole seconds
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use issue_status_metrics::prelude::*;
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let statuses: StatusSet = ["Todo", "Done"].into_iter().collect();
//!
//! let item = Item::closed(t0, t0 + Duration::seconds(200)).with_events(vec![
//!     StatusEvent::entered(t0 + Duration::seconds(10), "Todo"),
//!     StatusEvent::left(t0 + Duration::seconds(70), "Todo"),
//! ]);
//!
//! let accumulator = StatusAccumulator::new(statuses.clone());
//! let durations = accumulator.compute(&item, Utc::now());
//! assert_eq!(durations.get("Todo"), Some(Duration::seconds(60)));
//! assert_eq!(durations.get("Done"), None);
//!
//! let stats = aggregate([&durations], &statuses);
//! assert_eq!(stats.med.get("Todo"), Some(Duration::seconds(60)));
//! ```
//!
//! # Architecture
//!
//! - [`model`]: Items, status events, status sets and duration maps
//! - [`extraction`]: Status events from raw issue pages or payloads
//! - [`analytics`]: Per-item accumulation and population statistics
//! - [`parser`]: Item record files (JSONL or JSON array)
//! - [`config`]: Configuration management
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types and handling
//! - [`util`]: Shared helpers

#![doc(html_root_url = "https://docs.rs/issue-status-metrics/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parser;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{MetricsError, Result};
pub use model::{Item, StatusDurations, StatusEvent, StatusSet};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analytics::{aggregate, AggregateStats, StatusAccumulator, StatusReport};
    pub use crate::error::{MetricsError, Result};
    pub use crate::extraction::{extract_status_events, TimelineExtractor};
    pub use crate::model::{
        EventKind, Item, ItemState, StatusDurations, StatusEvent, StatusSet, TrackedItem,
    };
    pub use crate::parser::{ItemParser, ItemRecord};
}
