//! Property-based tests for extraction, accumulation and aggregation.
//!
//! Uses proptest to drive the accounting core with generated histories and
//! arbitrary documents.

use chrono::{DateTime, Duration, TimeZone, Utc};
use issue_status_metrics::analytics::{aggregate, StatusAccumulator};
use issue_status_metrics::extraction::{extract_status_events, TimelineExtractor};
use issue_status_metrics::model::{is_chronological, Item, StatusDurations, StatusEvent, StatusSet};
use issue_status_metrics::parser::ItemParser;
use proptest::prelude::*;

const NAMES: [&str; 3] = ["Todo", "In Progress", "Done"];

fn statuses() -> StatusSet {
    NAMES.into_iter().collect()
}

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Events at non-negative offsets from creation, sorted.
fn arb_events() -> impl Strategy<Value = Vec<StatusEvent>> {
    prop::collection::vec((0i64..10_000, any::<bool>(), 0usize..4), 0..30).prop_map(|raw| {
        let mut events: Vec<StatusEvent> = raw
            .into_iter()
            .map(|(offset, entered, idx)| {
                // Index 3 is a status outside the configured set
                let name = NAMES.get(idx).copied().unwrap_or("Blocked");
                let ts = base() + Duration::seconds(offset);
                if entered {
                    StatusEvent::entered(ts, name)
                } else {
                    StatusEvent::left(ts, name)
                }
            })
            .collect();
        events.sort_by_key(|e| e.timestamp);
        events
    })
}

fn arb_item() -> impl Strategy<Value = Item> {
    (arb_events(), prop::option::of(0i64..12_000)).prop_map(|(events, closed)| match closed {
        Some(offset) => Item::closed(base(), base() + Duration::seconds(offset)).with_events(events),
        None => Item::open(base()).with_events(events),
    })
}

fn timeline_doc(nodes: &[(String, String, String)]) -> String {
    let edges: Vec<_> = nodes
        .iter()
        .map(|(ts, status, prev)| {
            serde_json::json!({"node": {"createdAt": ts, "status": status, "previousStatus": prev}})
        })
        .collect();
    serde_json::json!({
        "payload": {"preloadedQueries": [{"result": {"data": {"repository": {"issue": {
            "frontTimelineItems": {"edges": edges}
        }}}}}]}
    })
    .to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every configured status is a key of the result, and durations are never negative.
    #[test]
    fn durations_cover_every_status(item in arb_item(), now_offset in 0i64..20_000) {
        let now = base() + Duration::seconds(now_offset);
        let durations = StatusAccumulator::new(statuses()).compute(&item, now);

        prop_assert_eq!(durations.len(), NAMES.len());
        for name in NAMES {
            prop_assert!(durations.contains_status(name));
            if let Some(d) = durations.get(name) {
                prop_assert!(d >= Duration::zero(), "{} is negative: {}", name, d);
            }
        }
        prop_assert!(!durations.contains_status("Blocked"));
    }

    /// Closed items give the same answer for any evaluation instant.
    #[test]
    fn closed_items_are_time_invariant(
        events in arb_events(),
        closed in 0i64..12_000,
        a in 0i64..50_000,
        b in 0i64..50_000,
    ) {
        let item = Item::closed(base(), base() + Duration::seconds(closed)).with_events(events);
        let acc = StatusAccumulator::new(statuses());
        prop_assert_eq!(
            acc.compute(&item, base() + Duration::seconds(a)),
            acc.compute(&item, base() + Duration::seconds(b))
        );
    }

    /// Open items never lose time as the evaluation instant advances.
    #[test]
    fn open_items_are_monotonic_in_now(events in arb_events(), extra in 0i64..50_000) {
        let item = Item::open(base()).with_events(events);
        let acc = StatusAccumulator::new(statuses());
        let earlier = acc.compute(&item, base() + Duration::seconds(10_000));
        let later = acc.compute(&item, base() + Duration::seconds(10_000 + extra));

        for name in NAMES {
            prop_assert_eq!(earlier.get(name).is_some(), later.get(name).is_some());
            prop_assert!(later.get(name) >= earlier.get(name));
        }
    }

    /// A closed item never accrues more time per status than its lifetime.
    #[test]
    fn closed_durations_bounded_by_lifetime(events in arb_events(), closed in 0i64..12_000) {
        let item = Item::closed(base(), base() + Duration::seconds(closed)).with_events(events);
        let durations = StatusAccumulator::new(statuses()).compute(&item, base());
        for (_, d) in durations.iter() {
            if let Some(d) = d {
                prop_assert!(d <= Duration::seconds(closed));
            }
        }
    }

    /// Aggregates lie between the smallest and largest sample.
    #[test]
    fn aggregates_within_sample_range(samples in prop::collection::vec(0i64..1_000_000, 1..50)) {
        let set: StatusSet = ["X"].into_iter().collect();
        let maps: Vec<StatusDurations> = samples
            .iter()
            .map(|s| {
                let mut d = StatusDurations::absent(&set);
                d.set("X", Some(Duration::seconds(*s)));
                d
            })
            .collect();
        let stats = aggregate(&maps, &set);

        let min = Duration::seconds(*samples.iter().min().unwrap());
        let max = Duration::seconds(*samples.iter().max().unwrap());
        for value in [stats.avg.get("X"), stats.med.get("X"), stats.p90.get("X")] {
            let value = value.unwrap();
            prop_assert!(value >= min && value <= max);
        }
        prop_assert!(stats.p90.get("X") >= stats.med.get("X"));
    }

    /// Extraction never panics and yields sorted events of configured statuses.
    #[test]
    fn extractor_handles_arbitrary_documents(doc in ".*") {
        let events = extract_status_events(&doc, &statuses());
        prop_assert!(is_chronological(&events));
    }

    /// Extracted events from generated timelines are sorted and in the set.
    #[test]
    fn extractor_output_sorted_and_filtered(
        nodes in prop::collection::vec(
            (0u32..28, 0usize..5, 0usize..5),
            0..20,
        )
    ) {
        let pick = |i: usize| match i {
            0..=2 => NAMES[i].to_string(),
            3 => "Blocked".to_string(),
            _ => String::new(),
        };
        let nodes: Vec<_> = nodes
            .into_iter()
            .map(|(day, s, p)| (format!("2024-02-{:02}T08:00:00Z", day + 1), pick(s), pick(p)))
            .collect();

        let mut extractor = TimelineExtractor::new(statuses());
        let events = extractor.extract(&timeline_doc(&nodes));

        prop_assert!(is_chronological(&events));
        prop_assert!(events.iter().all(|e| statuses().contains(&e.status)));
        prop_assert_eq!(extractor.stats().change_records, nodes.len());
    }

    /// Lenient record parsing never fails and its stats add up.
    #[test]
    fn parser_stats_are_consistent(lines in prop::collection::vec("[^\n]*", 1..50)) {
        let content = lines.join("\n");
        let mut parser = ItemParser::new().with_lenient(true);
        prop_assert!(parser.parse_str(&content).is_ok());

        let stats = parser.stats();
        prop_assert_eq!(
            stats.lines_processed,
            stats.records_parsed + stats.lines_skipped + stats.empty_lines
        );
    }
}
