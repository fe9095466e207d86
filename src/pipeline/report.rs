//! Final report assembly and artifact writing (JSON + CSV).

use super::classify::Classified;
use super::fifo::MarketPnl;
use super::markets::market_symbol;
use crate::domain::{AccountId, Decimal, LogEntry, Trade, Transfer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Headline figures for one fiscal year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub account_index: i64,
    pub year: u16,
    pub total_trades: u64,
    pub total_deposits: u64,
    pub total_withdrawals: u64,
    pub total_transfers: u64,
    pub total_volume: Decimal,
    pub total_fees: Decimal,
    pub gross_pnl: Decimal,
    pub net_pnl: Decimal,
    /// Timestamp of the oldest retained entry.
    pub period_start: Option<String>,
    /// Timestamp of the newest retained entry.
    pub period_end: Option<String>,
}

/// The terminal artifact: summary plus full activity lists. Immutable once
/// written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub markets: Vec<MarketPnl>,
    pub trades: Vec<Trade>,
    pub deposits: Vec<Transfer>,
    pub withdrawals: Vec<Transfer>,
    pub transfers: Vec<Transfer>,
}

/// Build the report from the classified working set and per-market FIFO
/// results. `entries` is the deduplicated, year-filtered set in fetch
/// order (newest first), used only for the period bounds.
pub fn assemble(
    account: AccountId,
    year: u16,
    entries: &[LogEntry],
    classified: Classified,
    markets: Vec<MarketPnl>,
) -> Report {
    let mut total_volume = Decimal::zero();
    let mut total_fees = Decimal::zero();
    let mut gross_pnl = Decimal::zero();
    for market in &markets {
        total_volume += market.total_volume;
        total_fees += market.total_fees;
        gross_pnl += market.realized_pnl;
    }

    let summary = ReportSummary {
        account_index: account.as_i64(),
        year,
        total_trades: classified.trades.len() as u64,
        total_deposits: classified.deposits.len() as u64,
        total_withdrawals: classified.withdrawals.len() as u64,
        total_transfers: classified.transfers.len() as u64,
        total_volume,
        total_fees,
        gross_pnl,
        net_pnl: gross_pnl - total_fees,
        period_start: entries.last().map(|e| e.time.clone()),
        period_end: entries.first().map(|e| e.time.clone()),
    };

    Report {
        summary,
        markets,
        trades: classified.trades,
        deposits: classified.deposits,
        withdrawals: classified.withdrawals,
        transfers: classified.transfers,
    }
}

/// Paths of the written artifacts for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the per-job artifacts under `{reports_dir}/{job_id}/`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    reports_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        ReportWriter {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn write(&self, job_id: Uuid, report: &Report) -> Result<ArtifactPaths, ArtifactError> {
        let dir = self.reports_dir.join(job_id.to_string());
        std::fs::create_dir_all(&dir)?;

        let json_path = dir.join("fiscal_report.json");
        let json_file = std::fs::File::create(&json_path)?;
        serde_json::to_writer_pretty(json_file, report)?;

        let csv_path = dir.join("trades.csv");
        write_trades_csv(&csv_path, &report.trades)?;

        Ok(ArtifactPaths {
            json: json_path,
            csv: csv_path,
        })
    }
}

fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<(), ArtifactError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Date", "Time", "Market", "Type", "Size", "Price", "USD Amount", "Fee USD",
    ])?;

    for trade in trades {
        let Some(dt) = DateTime::<Utc>::from_timestamp(trade.epoch_secs, 0) else {
            continue;
        };
        writer.write_record([
            dt.format("%Y-%m-%d").to_string(),
            dt.format("%H:%M:%S").to_string(),
            market_symbol(trade.market),
            trade.side.as_report_str().to_string(),
            trade.size.to_canonical_string(),
            trade.price.to_canonical_string(),
            trade.notional().round_2dp().to_canonical_string(),
            trade.fee().round_2dp().to_canonical_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
