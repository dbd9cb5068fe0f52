//! Status-change events.
//!
//! A [`StatusEvent`] records that an item entered or left a named status at
//! a point in time. Sequences of events are the input to the accumulator and
//! must be ordered by timestamp ascending.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The item started carrying the status.
    Entered,
    /// The item stopped carrying the status.
    Left,
}

impl EventKind {
    /// Get the kind as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entered => "entered",
            Self::Left => "left",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped transition of an item into or out of a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// When the transition happened (UTC).
    pub timestamp: DateTime<Utc>,
    /// Whether the status was entered or left.
    pub kind: EventKind,
    /// Status label, opaque to this crate.
    pub status: String,
}

impl StatusEvent {
    /// Create an ENTERED event.
    pub fn entered(timestamp: DateTime<Utc>, status: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind: EventKind::Entered,
            status: status.into(),
        }
    }

    /// Create a LEFT event.
    pub fn left(timestamp: DateTime<Utc>, status: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind: EventKind::Left,
            status: status.into(),
        }
    }
}

/// Check that events are ordered by timestamp ascending.
#[must_use]
pub fn is_chronological(events: &[StatusEvent]) -> bool {
    events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_serialization() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let event = StatusEvent::entered(ts, "In Progress");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2024-03-01T12:00:00Z","kind":"entered","status":"In Progress"}"#
        );

        let parsed: StatusEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_is_chronological() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::minutes(1);

        assert!(is_chronological(&[]));
        assert!(is_chronological(&[
            StatusEvent::entered(t0, "a"),
            StatusEvent::left(t0, "b"),
            StatusEvent::left(t1, "a"),
        ]));
        assert!(!is_chronological(&[
            StatusEvent::entered(t1, "a"),
            StatusEvent::left(t0, "a"),
        ]));
    }
}
