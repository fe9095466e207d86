//! Ledger source abstraction for fetching pages of the transaction log.

use crate::domain::{AccountId, LogEntry};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod client;
pub mod mock;

pub use client::ExplorerClient;
pub use mock::MockLedgerSource;

/// One page of the account's transaction log.
///
/// Implementations return entries ordered newest-first, exactly as the
/// upstream service does; pagination walks backward in time via `before`.
#[async_trait]
pub trait LedgerSource: Send + Sync + fmt::Debug {
    /// Fetch the page of log entries strictly older than `before`
    /// (or the newest page when `before` is `None`).
    async fn fetch_page(
        &self,
        account: AccountId,
        before: Option<&str>,
    ) -> Result<Vec<LogEntry>, LedgerError>;
}

/// Error taxonomy for ledger fetches.
///
/// `RateLimited` is retried with a fixed cooldown; `Http` is treated as
/// graceful exhaustion; `Network` and `Parse` are transport faults that
/// abort the fetch loop but keep already-collected entries.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream returned HTTP {status}")]
    Http { status: u16 },
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("rate limited")]
    RateLimited,
}

impl LedgerError {
    /// True for errors that end the scan gracefully rather than recording
    /// a fault on the job.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, LedgerError::Http { .. })
    }
}
