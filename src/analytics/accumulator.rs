//! Per-item time-in-status accumulation.
//!
//! Events are paired into intervals per status: an ENTERED opens an
//! interval, the next LEFT closes it and credits its length. An interval
//! still open after the last event is closed at `closed_at` for closed items
//! or at the evaluation instant for open ones.
//!
//! Edge policies:
//!
//! - On a closed item, events later than `closed_at + grace` are skipped
//!   before any accounting.
//! - On a closed item, interval ends are clamped to `closed_at`.
//! - A LEFT that is the first event seen for a status credits the time since
//!   creation: the status was carried from the start.
//! - A repeated ENTERED keeps the earlier start; a repeated LEFT with nothing
//!   open adds nothing.
//! - A status with no events stays absent; a status whose only interval is
//!   empty reports zero.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{instrument, trace, warn};

use crate::model::{EventKind, Item, StatusDurations, StatusSet};

/// Late-event grace window after closure.
pub const DEFAULT_CLOSE_GRACE_MINUTES: i64 = 5;

/// Default grace window as a duration.
#[must_use]
pub fn default_close_grace() -> Duration {
    Duration::minutes(DEFAULT_CLOSE_GRACE_MINUTES)
}

#[derive(Debug, Default)]
struct StatusTrack {
    open_since: Option<DateTime<Utc>>,
    total: Duration,
    seen: bool,
}

impl StatusTrack {
    fn credit(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        let span = end - start;
        if span > Duration::zero() {
            self.total += span;
        }
    }
}

/// Computes per-status durations for items against a fixed status set.
#[derive(Debug, Clone)]
pub struct StatusAccumulator {
    statuses: StatusSet,
    close_grace: Duration,
}

impl StatusAccumulator {
    /// Create an accumulator with the default 5-minute grace window.
    #[must_use]
    pub fn new(statuses: StatusSet) -> Self {
        Self {
            statuses,
            close_grace: default_close_grace(),
        }
    }

    /// Override the late-event grace window.
    #[must_use]
    pub fn with_close_grace(mut self, grace: Duration) -> Self {
        self.close_grace = grace;
        self
    }

    /// Statuses this accumulator reports on.
    #[must_use]
    pub fn statuses(&self) -> &StatusSet {
        &self.statuses
    }

    /// Grace window applied after closure.
    #[must_use]
    pub fn close_grace(&self) -> Duration {
        self.close_grace
    }

    /// Compute the time spent in each status as of `now`.
    ///
    /// `now` only matters for open items; closed items give the same answer
    /// for any evaluation instant.
    #[instrument(skip_all, level = "trace", fields(events = item.events.len(), closed = item.is_closed()))]
    pub fn compute(&self, item: &Item, now: DateTime<Utc>) -> StatusDurations {
        let mut durations = StatusDurations::absent(&self.statuses);
        if item.events.is_empty() {
            return durations;
        }

        let closed_at = if item.is_closed() { item.closed_at } else { None };
        // A grace window reaching past the representable range means no cutoff
        let cutoff = closed_at.and_then(|c| c.checked_add_signed(self.close_grace));
        let clamp = |ts: DateTime<Utc>| match closed_at {
            Some(c) if ts > c => c,
            _ => ts,
        };

        let mut tracks: HashMap<&str, StatusTrack> = HashMap::new();
        for event in &item.events {
            if cutoff.is_some_and(|cutoff| event.timestamp > cutoff) {
                trace!(status = %event.status, at = %event.timestamp, "Skipping event after closure");
                continue;
            }
            if !self.statuses.contains(&event.status) {
                continue;
            }

            let track = tracks.entry(event.status.as_str()).or_default();
            let at = clamp(event.timestamp);
            match event.kind {
                EventKind::Entered => {
                    if track.open_since.is_none() {
                        track.open_since = Some(at);
                    }
                }
                EventKind::Left => {
                    if let Some(start) = track.open_since.take() {
                        track.credit(start, at);
                    } else if !track.seen {
                        track.credit(item.created_at, at);
                    }
                }
            }
            track.seen = true;
        }

        let horizon = if item.is_closed() {
            item.closed_at.unwrap_or_else(|| {
                warn!("Closed item has no closed_at; finalizing against evaluation instant");
                now
            })
        } else {
            now
        };

        for (status, mut track) in tracks {
            if let Some(start) = track.open_since.take() {
                track.credit(start, horizon);
            }
            durations.set(status, Some(track.total));
        }

        durations
    }
}

/// Compute status durations with the default grace window.
#[must_use]
pub fn compute_status_durations(item: &Item, statuses: &StatusSet, now: DateTime<Utc>) -> StatusDurations {
    StatusAccumulator::new(statuses.clone()).compute(item, now)
}
