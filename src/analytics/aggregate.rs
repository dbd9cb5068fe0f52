//! Population statistics over per-item status durations.
//!
//! For each configured status the non-absent durations of all items form a
//! sample (in fractional seconds). Mean, median and 90th percentile are
//! computed over it, rounded to whole seconds with ties going to the even
//! neighbour. Percentiles interpolate linearly between the closest ranks,
//! with the rank of percentile `p` at `p / 100 * (n - 1)`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{StatusDurations, StatusSet};

/// Mean, median and 90th percentile per status.
///
/// Every configured status is a key of all three maps; a status no item ever
/// reported is absent in each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Arithmetic mean.
    pub avg: StatusDurations,
    /// Median.
    pub med: StatusDurations,
    /// 90th percentile.
    #[serde(rename = "90p")]
    pub p90: StatusDurations,
}

impl AggregateStats {
    /// Aggregate a collection of per-item maps.
    pub fn from_items<'a, I>(items: I, statuses: &StatusSet) -> Self
    where
        I: IntoIterator<Item = &'a StatusDurations>,
    {
        let mut samples: Vec<Vec<f64>> = vec![Vec::new(); statuses.len()];
        for durations in items {
            for (idx, status) in statuses.iter().enumerate() {
                if let Some(d) = durations.get(status) {
                    samples[idx].push(as_seconds(d));
                }
            }
        }

        let mut stats = Self {
            avg: StatusDurations::absent(statuses),
            med: StatusDurations::absent(statuses),
            p90: StatusDurations::absent(statuses),
        };

        for (status, values) in statuses.iter().zip(samples.iter_mut()) {
            if values.is_empty() {
                continue;
            }
            values.sort_by(f64::total_cmp);
            debug!(status, samples = values.len(), "Aggregating status");

            stats.avg.set(status, Some(whole_seconds(mean(values))));
            stats.med.set(status, Some(whole_seconds(percentile(values, 50.0))));
            stats.p90.set(status, Some(whole_seconds(percentile(values, 90.0))));
        }

        stats
    }
}

/// Aggregate per-item maps into mean/median/p90 per status.
pub fn aggregate<'a, I>(items: I, statuses: &StatusSet) -> AggregateStats
where
    I: IntoIterator<Item = &'a StatusDurations>,
{
    AggregateStats::from_items(items, statuses)
}

/// Duration as fractional seconds, keeping microsecond precision.
fn as_seconds(d: Duration) -> f64 {
    d.num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or_else(|| d.num_seconds() as f64)
}

fn whole_seconds(secs: f64) -> Duration {
    Duration::seconds(secs.round_ties_even() as i64)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear-interpolated percentile of an ascending, non-empty sample.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
