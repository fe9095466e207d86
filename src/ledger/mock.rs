//! Mock ledger source for testing without network calls.

use super::{LedgerError, LedgerSource};
use crate::domain::{AccountId, LogEntry};
use async_trait::async_trait;
use std::sync::Mutex;

/// Scripted ledger source: returns one queued response per `fetch_page`
/// call, then empty pages once the script runs out.
#[derive(Debug, Default)]
pub struct MockLedgerSource {
    responses: Mutex<Vec<Result<Vec<LogEntry>, LedgerError>>>,
    cursors_seen: Mutex<Vec<Option<String>>>,
}

impl MockLedgerSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful page.
    pub fn with_page(self, entries: Vec<LogEntry>) -> Self {
        self.responses.lock().unwrap().push(Ok(entries));
        self
    }

    /// Queue an error response.
    pub fn with_error(self, error: LedgerError) -> Self {
        self.responses.lock().unwrap().push(Err(error));
        self
    }

    /// The `before` cursors observed across calls, in order.
    pub fn cursors_seen(&self) -> Vec<Option<String>> {
        self.cursors_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerSource for MockLedgerSource {
    async fn fetch_page(
        &self,
        _account: AccountId,
        before: Option<&str>,
    ) -> Result<Vec<LogEntry>, LedgerError> {
        self.cursors_seen
            .lock()
            .unwrap()
            .push(before.map(str::to_string));

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(Vec::new());
        }
        responses.remove(0)
    }
}
