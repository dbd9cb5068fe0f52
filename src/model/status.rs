//! Status sets and per-status duration maps.

use std::cmp::Ordering;

use chrono::Duration;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Whole seconds of a duration, rounding half to even at microsecond precision.
///
/// Used for every seconds-valued output, matching aggregate rounding.
#[must_use]
pub fn round_seconds(d: Duration) -> i64 {
    let Some(us) = d.num_microseconds() else {
        return d.num_seconds();
    };
    let (secs, rem) = (us.div_euclid(1_000_000), us.rem_euclid(1_000_000));
    match rem.cmp(&500_000) {
        Ordering::Less => secs,
        Ordering::Greater => secs + 1,
        Ordering::Equal => secs + (secs & 1),
    }
}

/// Ordered, duplicate-free set of status names of interest.
///
/// Order is preserved from configuration so every report lists statuses the
/// way the user declared them. Empty names are ignored: an empty previous
/// status in tracker data means "no status".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSet {
    names: IndexSet<String>,
}

impl StatusSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a status name. Returns false if it was empty or already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() {
            return false;
        }
        self.names.insert(name)
    }

    /// Check membership.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over names in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for StatusSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl Serialize for StatusSet {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.names.iter())
    }
}

impl<'de> Deserialize<'de> for StatusSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names.into_iter().collect())
    }
}

/// Mapping from status name to accumulated duration, or `None` for absent.
///
/// Absent means no data for that status, which is distinct from a zero
/// duration. Maps built from a [`StatusSet`] hold every name of the set as
/// a key, so callers only ever check for absence, never for existence.
///
/// Serialized as a JSON object of whole seconds (`null` for absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDurations {
    entries: IndexMap<String, Option<Duration>>,
}

impl StatusDurations {
    /// Create a map with every status of the set marked absent.
    #[must_use]
    pub fn absent(statuses: &StatusSet) -> Self {
        Self {
            entries: statuses.iter().map(|name| (name.to_string(), None)).collect(),
        }
    }

    /// Get the duration for a status (`None` if absent or not a key).
    #[must_use]
    pub fn get(&self, status: &str) -> Option<Duration> {
        self.entries.get(status).copied().flatten()
    }

    /// Check whether the status is a key of this map.
    #[must_use]
    pub fn contains_status(&self, status: &str) -> bool {
        self.entries.contains_key(status)
    }

    /// Record a duration for a status.
    pub fn set(&mut self, status: impl Into<String>, duration: Option<Duration>) {
        self.entries.insert(status.into(), duration);
    }

    /// Iterate over `(status, duration)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Duration>)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), *d))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of statuses with a value.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.entries.values().filter(|d| d.is_some()).count()
    }

    /// Whether every status is absent.
    #[must_use]
    pub fn all_absent(&self) -> bool {
        self.observed_count() == 0
    }
}

impl Serialize for StatusDurations {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        serializer.collect_map(
            self.entries
                .iter()
                .map(|(name, d)| (name, d.map(round_seconds))),
        )
    }
}

impl<'de> Deserialize<'de> for StatusDurations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = IndexMap::<String, Option<i64>>::deserialize(deserializer)?;
        Ok(Self {
            entries: raw
                .into_iter()
                .map(|(name, secs)| (name, secs.map(Duration::seconds)))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_set_dedup_and_order() {
        let set: StatusSet = ["Todo", "In Progress", "Todo", "", "Done"].into_iter().collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Todo", "In Progress", "Done"]);
        assert!(set.contains("Done"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_absent_map_has_every_key() {
        let set: StatusSet = ["a", "b"].into_iter().collect();
        let map = StatusDurations::absent(&set);
        assert_eq!(map.len(), 2);
        assert!(map.contains_status("a"));
        assert!(map.contains_status("b"));
        assert!(map.all_absent());
        assert_eq!(map.get("a"), None);
    }

    #[test]
    fn test_round_seconds_half_to_even() {
        assert_eq!(round_seconds(Duration::milliseconds(1_499)), 1);
        assert_eq!(round_seconds(Duration::milliseconds(1_500)), 2);
        assert_eq!(round_seconds(Duration::milliseconds(2_500)), 2);
        assert_eq!(round_seconds(Duration::milliseconds(2_501)), 3);
        assert_eq!(round_seconds(Duration::seconds(60)), 60);
        assert_eq!(round_seconds(Duration::zero()), 0);
    }

    #[test]
    fn test_serialized_seconds_are_rounded() {
        let set: StatusSet = ["a", "b"].into_iter().collect();
        let mut map = StatusDurations::absent(&set);
        map.set("a", Some(Duration::milliseconds(1_600)));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"a": 2, "b": null}));
    }

    #[test]
    fn test_zero_is_not_absent() {
        let set: StatusSet = ["a"].into_iter().collect();
        let mut map = StatusDurations::absent(&set);
        map.set("a", Some(Duration::zero()));
        assert_eq!(map.get("a"), Some(Duration::zero()));
        assert_eq!(map.observed_count(), 1);
    }

    #[test]
    fn test_serialize_as_seconds() {
        let set: StatusSet = ["Todo", "Done"].into_iter().collect();
        let mut map = StatusDurations::absent(&set);
        map.set("Todo", Some(Duration::minutes(2)));

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Todo":120,"Done":null}"#);

        let parsed: StatusDurations = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }
}
