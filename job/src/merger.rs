//! Merges a fresh snapshot into the stored dataset

use crate::error::Result;
use crate::record::{parse_snapshot, Record};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::HashSet;

/// Stored records first, untouched and in order, then every incoming record
/// whose timestamp the stored set does not already hold.
///
/// Incoming records are only checked against `existing`, so two incoming
/// records sharing a timestamp both survive. Nothing is sorted.
pub fn merge(existing: Vec<Record>, incoming: Vec<Record>) -> Vec<Record> {
    let known: HashSet<NaiveDateTime> = existing.iter().map(|r| r.datetime).collect();
    let mut merged = existing;
    merged.extend(incoming.into_iter().filter(|r| !known.contains(&r.datetime)));
    merged
}

/// Parse a raw snapshot and merge it. A single invalid item fails the merge.
pub fn merge_snapshot(existing: Vec<Record>, items: &[Value]) -> Result<Vec<Record>> {
    let incoming = parse_snapshot(items)?;
    Ok(merge(existing, incoming))
}
