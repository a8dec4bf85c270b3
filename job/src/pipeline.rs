//! One run: load, fetch, merge, baseline, classify, replace

use crate::baseline::BaselineCalculator;
use crate::classifier::{anomaly_count, classify};
use crate::config::{BaselineConfig, OrderPolicy};
use crate::db::RecordStore;
use crate::error::Result;
use crate::feed::SnapshotFeed;
use crate::merger::merge_snapshot;
use crate::record::{Record, WindowStats};
use crate::status::StatusLog;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Tunables of the baseline stage, built by the caller.
#[derive(Debug, Clone)]
pub struct Settings {
    pub calculator: BaselineCalculator,
    pub order: OrderPolicy,
}

impl Settings {
    pub fn from_config(config: &BaselineConfig) -> Self {
        Self {
            calculator: BaselineCalculator::from_config(config),
            order: config.order,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&BaselineConfig::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Records read from the store.
    pub stored: usize,
    /// Items in the snapshot.
    pub fetched: usize,
    /// Snapshot records that made it past deduplication.
    pub appended: usize,
    /// Records whose stats changed in this pass.
    pub refreshed: usize,
    pub anomalies: usize,
}

/// Fully labelled dataset, not yet persisted.
#[derive(Debug, Clone)]
pub struct Processed {
    pub records: Vec<Record>,
    pub summary: RunSummary,
}

pub struct Pipeline<S, F> {
    store: S,
    feed: F,
    status: Arc<dyn StatusLog>,
    settings: Settings,
}

impl<S: RecordStore, F: SnapshotFeed> Pipeline<S, F> {
    pub fn new(store: S, feed: F, status: Arc<dyn StatusLog>, settings: Settings) -> Self {
        Self {
            store,
            feed,
            status,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Everything up to, but not including, the write.
    pub async fn process(&self) -> Result<Processed> {
        self.status.info("Starting data processing...");

        let existing = self.store.load()?;
        let stored = existing.len();

        let items = match self.feed.fetch().await {
            Ok(items) => items,
            Err(e) => {
                self.status.error(&e.to_string());
                return Err(e);
            }
        };
        let fetched = items.len();

        let mut merged = merge_snapshot(existing, &items)?;
        let appended = merged.len() - stored;
        debug!(stored, fetched, appended, "merged snapshot");

        if self.settings.order == OrderPolicy::Chronological {
            merged.sort_by_key(|r| r.datetime);
        }

        let before: Vec<_> = merged.iter().map(|r| r.stats).collect();
        let enriched = self.settings.calculator.compute(merged);
        let refreshed = count_refreshed(&before, &enriched);

        let records = classify(enriched);
        let summary = RunSummary {
            stored,
            fetched,
            appended,
            refreshed,
            anomalies: anomaly_count(&records),
        };

        self.status.info("Data processing completed successfully.");
        Ok(Processed { records, summary })
    }

    /// Process and then replace the stored dataset in one step.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let Processed { records, summary } = self.process().await?;
        self.store.replace_all(&records)?;
        self.status.info(&format!(
            "Data has been successfully stored ({} records, {} anomalies).",
            records.len(),
            summary.anomalies
        ));
        Ok(summary)
    }
}

/// Records whose stats differ from what they carried before the pass.
fn count_refreshed(before: &[Option<WindowStats>], after: &[Record]) -> usize {
    before
        .iter()
        .zip(after)
        .filter(|(old, record)| **old != record.stats)
        .count()
}
