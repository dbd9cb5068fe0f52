//! Item records as they appear in input files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::extraction::TimelineExtractor;
use crate::model::{is_chronological, Item, ItemState, StatusEvent, TrackedItem};

/// One item as read from a JSONL line or JSON array element.
///
/// Events are taken from `events` when present; otherwise a raw `timeline`
/// document (saved issue page or its payload) is run through the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Identifier; numbers are accepted and kept as their decimal text.
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Closure instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Lifecycle state.
    #[serde(default)]
    pub state: ItemState,
    /// Normalized status events.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<StatusEvent>,
    /// Raw timeline document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

impl ItemRecord {
    /// Resolve the record into a tracked item.
    pub fn into_tracked(self, extractor: &mut TimelineExtractor) -> TrackedItem {
        let mut events = self.events;
        if events.is_empty() {
            if let Some(document) = &self.timeline {
                events = extractor.extract(document);
            }
        } else if !is_chronological(&events) {
            warn!(id = %self.id, "Inline events out of order, sorting by timestamp");
            events.sort_by_key(|e| e.timestamp);
        }

        TrackedItem {
            id: self.id,
            title: self.title,
            item: Item {
                created_at: self.created_at,
                closed_at: self.closed_at,
                state: self.state,
                events,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    })
}
