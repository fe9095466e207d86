//! Backward-cursor page collection from the ledger service.
//!
//! Walks `GET /accounts/{id}/logs?before=<ts>` newest-first until the log
//! is exhausted, the cursor stalls, or a transport fault aborts the scan.
//! Rate limiting (HTTP 429) is retried with a fixed cooldown; any other
//! non-success status ends the scan gracefully.

use crate::config::Config;
use crate::domain::{AccountId, LogEntry};
use crate::jobs::JobHandle;
use crate::ledger::{LedgerError, LedgerSource};
use std::time::Duration;
use tracing::{info, warn};

/// Retry and pacing policy for the fetch loop, taken from `Config`.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub rate_limit_cooldown: Duration,
    /// 0 retries without bound.
    pub max_rate_limit_retries: u32,
    pub page_pause: Duration,
}

impl FetchPolicy {
    pub fn from_config(config: &Config) -> Self {
        FetchPolicy {
            rate_limit_cooldown: config.rate_limit_cooldown,
            max_rate_limit_retries: config.max_rate_limit_retries,
            page_pause: config.page_pause,
        }
    }
}

/// Everything the scan produced. `fault` is set when a transport error cut
/// the scan short; collected entries are still valid and flow onward.
#[derive(Debug)]
pub struct FetchOutcome {
    pub entries: Vec<LogEntry>,
    pub pages: u64,
    pub fault: Option<String>,
}

/// Collect all reachable pages for `account`, updating job progress as a
/// coarse liveness signal (`min(page * 2, 90)`).
pub async fn fetch_all(
    source: &dyn LedgerSource,
    account: AccountId,
    policy: &FetchPolicy,
    job: &JobHandle,
) -> FetchOutcome {
    let mut entries: Vec<LogEntry> = Vec::new();
    let mut page: u64 = 1;
    let mut cursor: Option<String> = None;
    let mut last_tail: Option<String> = None;
    let mut fault = None;

    loop {
        job.set_progress((page * 2).min(90) as u8, page).await;

        match fetch_page_with_cooldown(source, account, cursor.as_deref(), policy).await {
            Ok(batch) => {
                if batch.is_empty() {
                    break;
                }

                // Pages are newest-first, so the last entry is the oldest
                // and becomes the next cursor.
                let Some(tail) = batch.last().map(|e| e.time.clone()) else {
                    break;
                };
                if last_tail.as_deref() == Some(tail.as_str()) {
                    info!(page, "cursor stalled, ledger returned the same tail twice");
                    break;
                }

                entries.extend(batch);
                cursor = Some(tail.clone());
                last_tail = Some(tail);
                page += 1;

                tokio::time::sleep(policy.page_pause).await;
            }
            Err(e) if e.is_exhaustion() => {
                info!(page, error = %e, "upstream signaled end of data");
                break;
            }
            Err(e) => {
                warn!(page, error = %e, "transport fault, keeping partial results");
                fault = Some(e.to_string());
                break;
            }
        }
    }

    FetchOutcome {
        entries,
        pages: page - 1,
        fault,
    }
}

/// Issue one page request, absorbing 429s with a fixed cooldown. When the
/// retry bound is exhausted the scan is treated as ended, not failed.
async fn fetch_page_with_cooldown(
    source: &dyn LedgerSource,
    account: AccountId,
    before: Option<&str>,
    policy: &FetchPolicy,
) -> Result<Vec<LogEntry>, LedgerError> {
    let mut attempts: u32 = 0;
    loop {
        match source.fetch_page(account, before).await {
            Err(LedgerError::RateLimited) => {
                attempts += 1;
                if policy.max_rate_limit_retries > 0 && attempts > policy.max_rate_limit_retries {
                    warn!(attempts, "rate limit retries exhausted, ending scan");
                    return Err(LedgerError::Http { status: 429 });
                }
                warn!(
                    attempts,
                    cooldown_secs = policy.rate_limit_cooldown.as_secs(),
                    "rate limited, cooling down"
                );
                tokio::time::sleep(policy.rate_limit_cooldown).await;
            }
            other => return other,
        }
    }
}
