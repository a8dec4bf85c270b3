//! Trailing-window baseline over execution times

use crate::config::BaselineConfig;
use crate::record::{Record, WindowStats};
use chrono::{Duration, NaiveDateTime};

/// Fewer points than this never produce statistics.
const MIN_WINDOW_POINTS: usize = 2;

/// Walks a record sequence with a monotonic cursor and attaches mean,
/// sample standard deviation and a `band`-sigma envelope computed over the
/// trailing `window` of every record that advances the cursor.
#[derive(Debug, Clone)]
pub struct BaselineCalculator {
    window: Duration,
    band: f64,
}

impl BaselineCalculator {
    pub fn new(window: Duration, band: f64) -> Self {
        Self { window, band }
    }

    pub fn from_config(config: &BaselineConfig) -> Self {
        let window = i64::try_from(config.window_hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or(Duration::MAX);
        Self::new(window, config.band_multiplier)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Enrich `records` in their given order.
    ///
    /// The cursor starts at the earliest timestamp, so the earliest record is
    /// never recomputed. A record whose timestamp does not move the cursor
    /// forward keeps the stats it came in with; one that does gets fresh
    /// stats (or none, when its window holds a single point). Windows are
    /// drawn from the whole sequence, not only from records already visited.
    pub fn compute(&self, records: Vec<Record>) -> Vec<Record> {
        let Some(mut cursor) = records.iter().map(|r| r.datetime).min() else {
            return records;
        };

        let mut timeline: Vec<(NaiveDateTime, f64)> =
            records.iter().map(|r| (r.datetime, r.execution_time)).collect();
        timeline.sort_by_key(|&(t, _)| t);

        records
            .into_iter()
            .map(|record| {
                if record.datetime <= cursor {
                    return record;
                }
                cursor = record.datetime;
                let stats = self.window_stats(&timeline, record.datetime);
                record.with_stats(stats)
            })
            .collect()
    }

    /// Stats over every point in `[end - window, end]`, both ends inclusive.
    /// `timeline` must be sorted by timestamp.
    pub fn window_stats(&self, timeline: &[(NaiveDateTime, f64)], end: NaiveDateTime) -> Option<WindowStats> {
        let start = end.checked_sub_signed(self.window).unwrap_or(NaiveDateTime::MIN);
        let lo = timeline.partition_point(|&(t, _)| t < start);
        let hi = timeline.partition_point(|&(t, _)| t <= end);
        let values: Vec<f64> = timeline[lo..hi].iter().map(|&(_, v)| v).collect();
        self.stats_for(&values)
    }

    pub fn stats_for(&self, values: &[f64]) -> Option<WindowStats> {
        if values.len() < MIN_WINDOW_POINTS {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();
        Some(WindowStats {
            baseline: mean,
            std_dev,
            upper_bound: mean + self.band * std_dev,
            lower_bound: mean - self.band * std_dev,
        })
    }
}

impl Default for BaselineCalculator {
    fn default() -> Self {
        Self::from_config(&BaselineConfig::default())
    }
}
