//! Calendar-year filter on the ISO-8601 timestamp prefix.

use crate::domain::LogEntry;

/// Keep only entries whose timestamp falls inside `year`, in original
/// order. Entries with a missing or malformed timestamp are dropped by the
/// prefix check.
pub fn filter_year(entries: Vec<LogEntry>, year: u16) -> Vec<LogEntry> {
    let prefix = format!("{year}-");
    entries
        .into_iter()
        .filter(|entry| entry.time.starts_with(&prefix))
        .collect()
}
