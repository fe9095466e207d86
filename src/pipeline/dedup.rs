//! Idempotent deduplication of log entries across page boundaries.
//!
//! Overlapping pages from the cursor walk can repeat entries; two entries
//! are the same record iff (time, tx_type, trade payload, transfer payload)
//! all match. Payloads are compared by canonical JSON: serde_json maps are
//! key-ordered, so serialization is stable regardless of field arrival
//! order.

use crate::domain::LogEntry;
use std::collections::HashSet;

/// Remove duplicate entries, preserving first-seen order.
pub fn dedup_entries(entries: Vec<LogEntry>) -> Vec<LogEntry> {
    let mut seen: HashSet<EntryKey> = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry_key(entry)))
        .collect()
}

type EntryKey = (String, String, String, String);

fn entry_key(entry: &LogEntry) -> EntryKey {
    let trade = entry
        .trade_pubdata()
        .and_then(|p| serde_json::to_string(p).ok())
        .unwrap_or_default();
    let transfer = entry
        .transfer_pubdata()
        .and_then(|p| serde_json::to_string(p).ok())
        .unwrap_or_default();
    (entry.time.clone(), entry.tx_type.clone(), trade, transfer)
}
