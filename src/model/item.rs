//! Tracked items and their lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{is_chronological, StatusEvent};
use crate::error::{MetricsError, Result};

/// Lifecycle state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Still open; durations keep growing with the evaluation instant.
    #[default]
    Open,
    /// Closed; durations are capped at `closed_at`.
    Closed,
}

impl ItemState {
    /// Lowercase name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item whose time in each status is measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Closure instant, if the item was ever closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Current lifecycle state.
    #[serde(default)]
    pub state: ItemState,
    /// Status-change events in chronological order.
    #[serde(default)]
    pub events: Vec<StatusEvent>,
}

impl Item {
    /// Create an open item with no events.
    pub fn open(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            closed_at: None,
            state: ItemState::Open,
            events: Vec::new(),
        }
    }

    /// Create a closed item with no events.
    pub fn closed(created_at: DateTime<Utc>, closed_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            closed_at: Some(closed_at),
            state: ItemState::Closed,
            events: Vec::new(),
        }
    }

    /// Attach an event sequence.
    #[must_use]
    pub fn with_events(mut self, events: Vec<StatusEvent>) -> Self {
        self.events = events;
        self
    }

    /// Whether the item is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == ItemState::Closed
    }

    /// Check the accounting preconditions.
    ///
    /// The accumulator does not call this; it is offered to callers that
    /// want to flag suspicious records before computing.
    pub fn validate(&self) -> Result<()> {
        if self.is_closed() && self.closed_at.is_none() {
            return Err(MetricsError::integrity("item is closed but has no closed_at"));
        }
        if let Some(closed_at) = self.closed_at {
            if closed_at < self.created_at {
                return Err(MetricsError::integrity(format!(
                    "closed_at {closed_at} precedes created_at {}",
                    self.created_at
                )));
            }
        }
        if !is_chronological(&self.events) {
            return Err(MetricsError::integrity("events are not in chronological order"));
        }
        if let Some(early) = self.events.iter().find(|e| e.timestamp < self.created_at) {
            return Err(MetricsError::integrity(format!(
                "event for '{}' at {} precedes created_at {}",
                early.status, early.timestamp, self.created_at
            )));
        }
        Ok(())
    }
}

/// An item tagged with its identity in the source tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedItem {
    /// Identifier (issue number, key, or URL).
    pub id: String,
    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The item itself.
    #[serde(flatten)]
    pub item: Item,
}

impl TrackedItem {
    /// Tag an item with an identifier.
    pub fn new(id: impl Into<String>, item: Item) -> Self {
        Self {
            id: id.into(),
            title: None,
            item,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_item_deserialize_defaults() {
        let item: Item = serde_json::from_str(r#"{"created_at":"2024-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(item.state, ItemState::Open);
        assert!(item.closed_at.is_none());
        assert!(item.events.is_empty());
        assert!(!item.is_closed());
    }

    #[test]
    fn test_validate_accepts_consistent_item() {
        let item = Item::closed(t0(), t0() + Duration::hours(2)).with_events(vec![
            StatusEvent::entered(t0() + Duration::minutes(5), "Todo"),
            StatusEvent::left(t0() + Duration::minutes(30), "Todo"),
        ]);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_validate_closed_without_closed_at() {
        let mut item = Item::open(t0());
        item.state = ItemState::Closed;
        let err = item.validate().unwrap_err();
        assert!(matches!(err, MetricsError::DataIntegrityError { .. }));
    }

    #[test]
    fn test_validate_event_before_creation() {
        let item = Item::open(t0()).with_events(vec![StatusEvent::entered(
            t0() - Duration::seconds(1),
            "Todo",
        )]);
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_validate_unsorted_events() {
        let item = Item::open(t0()).with_events(vec![
            StatusEvent::entered(t0() + Duration::minutes(10), "Todo"),
            StatusEvent::left(t0() + Duration::minutes(5), "Todo"),
        ]);
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_tracked_item_serializes_flat() {
        let tracked = TrackedItem::new("42", Item::open(t0())).with_title("Crash on save");
        let value = serde_json::to_value(&tracked).unwrap();
        assert_eq!(value["id"], "42");
        assert_eq!(value["title"], "Crash on save");
        assert_eq!(value["state"], "open");
        assert_eq!(value["created_at"], "2024-01-01T00:00:00Z");
    }
}
