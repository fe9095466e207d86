//! End-to-end pipeline runs against a scripted ledger source.

use lighter_fiscal::domain::AccountId;
use lighter_fiscal::jobs::{JobRegistry, JobStatus};
use lighter_fiscal::ledger::{LedgerError, MockLedgerSource};
use lighter_fiscal::pipeline;
use lighter_fiscal::Config;
use lighter_fiscal::LogEntry;
use std::collections::HashMap;
use tempfile::TempDir;

fn test_config(reports_dir: &TempDir) -> Config {
    let mut env = HashMap::new();
    env.insert(
        "REPORTS_DIR".to_string(),
        reports_dir.path().to_string_lossy().to_string(),
    );
    env.insert("PAGE_PAUSE_MS".to_string(), "0".to_string());
    env.insert("RATE_LIMIT_COOLDOWN_SECS".to_string(), "0".to_string());
    Config::from_env_map(env).unwrap()
}

fn trade_entry(time: &str, size: f64, price: f64, is_taker_ask: i64) -> LogEntry {
    serde_json::from_value(serde_json::json!({
        "time": time,
        "tx_type": "L2InternalClaimOrder",
        "status": "executed",
        "pubdata": {
            "trade_pubdata": {
                "market_index": 1,
                "size": size,
                "price": price,
                "is_taker_ask": is_taker_ask,
                "maker_fee": 0,
                "taker_fee": 100
            }
        }
    }))
    .unwrap()
}

fn transfer_entry(time: &str, tx_type: &str) -> LogEntry {
    serde_json::from_value(serde_json::json!({
        "time": time,
        "tx_type": tx_type,
        "status": "executed",
        "pubdata": {
            "l2_transfer_pubdata_v2": {"amount": "100"}
        }
    }))
    .unwrap()
}

#[tokio::test]
async fn full_run_produces_completed_job_and_artifacts() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    // Newest-first pages with an overlapping tail entry, a prior-year
    // entry, and a deposit. Buy 10 @ 100, sell 10 @ 110, taker fee 1%.
    let buy = trade_entry("2025-02-01T10:00:00Z", 10.0, 100.0, 0);
    let sell = trade_entry("2025-03-01T10:00:00Z", 10.0, 110.0, 1);
    let deposit = transfer_entry("2025-01-15T09:00:00Z", "L2Deposit");
    let old = transfer_entry("2024-12-31T23:59:59Z", "L2Transfer");

    let source = MockLedgerSource::new()
        .with_page(vec![sell.clone(), buy.clone()])
        // Overlap: the buy appears again at the head of the next page.
        .with_page(vec![buy.clone(), deposit.clone(), old.clone()])
        .with_page(vec![]);

    let registry = JobRegistry::new();
    let id = registry.create().await;
    pipeline::run_report(
        &source,
        &config,
        AccountId::new(524876),
        2025,
        registry.handle(id),
    )
    .await;

    let job = registry.get(id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert!(job.error.is_none());

    let summary = job.summary.expect("summary present");
    assert_eq!(summary.account_index, 524876);
    assert_eq!(summary.year, 2025);
    assert_eq!(summary.total_trades, 2);
    assert_eq!(summary.total_deposits, 1);
    assert_eq!(summary.total_transfers, 0, "2024 transfer filtered out");
    // Volume 10*100 + 10*110 = 2100; fees 1% = 21; gross (110-100)*10 = 100.
    assert_eq!(summary.total_volume.to_canonical_string(), "2100");
    assert_eq!(summary.total_fees.to_canonical_string(), "21");
    assert_eq!(summary.gross_pnl.to_canonical_string(), "100");
    assert_eq!(summary.net_pnl.to_canonical_string(), "79");
    // Pages are newest-first: start is the oldest retained entry.
    assert_eq!(summary.period_start.as_deref(), Some("2025-01-15T09:00:00Z"));
    assert_eq!(summary.period_end.as_deref(), Some("2025-03-01T10:00:00Z"));

    let files = job.files.expect("artifact paths present");
    assert!(files.json.exists());
    assert!(files.csv.exists());

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&files.json).unwrap()).unwrap();
    assert_eq!(report["summary"]["net_pnl"], 79.0);
    assert_eq!(report["markets"][0]["symbol"], "BTC");
    assert_eq!(report["trades"].as_array().unwrap().len(), 2);

    let csv = std::fs::read_to_string(&files.csv).unwrap();
    assert_eq!(csv.lines().count(), 3, "header plus two trade rows");
    assert!(csv.contains("BTC,BUY,10,100,1000,10"));
    assert!(csv.contains("BTC,SELL,10,110,1100,11"));
}

#[tokio::test]
async fn transport_fault_still_reports_partial_data() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    let source = MockLedgerSource::new()
        .with_page(vec![trade_entry("2025-02-01T10:00:00Z", 1.0, 50.0, 0)])
        .with_error(LedgerError::Network("connection reset by peer".to_string()));

    let registry = JobRegistry::new();
    let id = registry.create().await;
    pipeline::run_report(
        &source,
        &config,
        AccountId::new(1),
        2025,
        registry.handle(id),
    )
    .await;

    let job = registry.get(id).await.unwrap();
    // The fault is recorded but the collected page still produced a report.
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job
        .error
        .as_deref()
        .unwrap()
        .contains("connection reset by peer"));
    assert_eq!(job.summary.unwrap().total_trades, 1);
}

#[tokio::test]
async fn upstream_unavailable_is_an_empty_report_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    let source = MockLedgerSource::new().with_error(LedgerError::Http { status: 404 });

    let registry = JobRegistry::new();
    let id = registry.create().await;
    pipeline::run_report(
        &source,
        &config,
        AccountId::new(1),
        2025,
        registry.handle(id),
    )
    .await;

    let job = registry.get(id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.error.is_none());
    let summary = job.summary.unwrap();
    assert_eq!(summary.total_trades, 0);
    assert_eq!(summary.period_start, None);
}

#[tokio::test]
async fn sells_match_oldest_buys_across_pages() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    // Two buy lots then one spanning sell, arriving newest-first across
    // pages: buys = [(5,100),(5,110)], sell = (8,120) -> gross 130.
    let source = MockLedgerSource::new()
        .with_page(vec![trade_entry("2025-03-01T00:00:00Z", 8.0, 120.0, 1)])
        .with_page(vec![
            trade_entry("2025-02-01T00:00:00Z", 5.0, 110.0, 0),
            trade_entry("2025-01-01T00:00:00Z", 5.0, 100.0, 0),
        ])
        .with_page(vec![]);

    let registry = JobRegistry::new();
    let id = registry.create().await;
    pipeline::run_report(
        &source,
        &config,
        AccountId::new(1),
        2025,
        registry.handle(id),
    )
    .await;

    let job = registry.get(id).await.unwrap();
    let summary = job.summary.unwrap();
    assert_eq!(summary.gross_pnl.to_canonical_string(), "130");
}
