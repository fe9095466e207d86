//! The report pipeline: fetch, dedup, filter, classify, aggregate, match,
//! assemble, write.
//!
//! `run_report` executes one isolated run for one job and records every
//! state transition on that job. It never returns an error to the caller;
//! faults end up on the job record where the polling endpoint can see them.

pub mod classify;
pub mod dedup;
pub mod fetch;
pub mod fifo;
pub mod filter;
pub mod markets;
pub mod report;

pub use classify::{classify, Classified};
pub use dedup::dedup_entries;
pub use fetch::{fetch_all, FetchOutcome, FetchPolicy};
pub use fifo::{compute_market_pnl, MarketPnl};
pub use filter::filter_year;
pub use markets::{aggregate, market_symbol, Lot, MarketStats};
pub use report::{assemble, ArtifactPaths, Report, ReportSummary, ReportWriter};

use crate::config::Config;
use crate::domain::AccountId;
use crate::jobs::JobHandle;
use crate::ledger::LedgerSource;
use tracing::{error, info};

/// Run the full pipeline for one job.
pub async fn run_report(
    source: &dyn LedgerSource,
    config: &Config,
    account: AccountId,
    year: u16,
    job: JobHandle,
) {
    job.mark_running().await;
    info!(job_id = %job.id(), %account, year, "report run started");

    let policy = FetchPolicy::from_config(config);
    let outcome = fetch_all(source, account, &policy, &job).await;
    if let Some(fault) = outcome.fault {
        // Partial results still flow through the rest of the pipeline.
        job.record_fetch_fault(fault).await;
    }

    let entries = dedup_entries(outcome.entries);
    let entries = filter_year(entries, year);
    let mut classified = classify(&entries);

    // Pages arrive newest-first; FIFO consumes lots in chronological order.
    classified.trades.sort_by_key(|t| t.epoch_secs);

    let stats = aggregate(&classified.trades);
    let markets = compute_market_pnl(stats);
    let report = assemble(account, year, &entries, classified, markets);

    let writer = ReportWriter::new(config.reports_dir.clone());
    match writer.write(job.id(), &report) {
        Ok(files) => {
            info!(
                job_id = %job.id(),
                trades = report.summary.total_trades,
                net_pnl = %report.summary.net_pnl,
                "report run completed"
            );
            job.complete(report.summary, files).await;
        }
        Err(e) => {
            error!(job_id = %job.id(), error = %e, "failed to write report artifacts");
            job.fail(e.to_string()).await;
        }
    }
}
