pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod jobs;
pub mod ledger;
pub mod pipeline;

pub use config::Config;
pub use domain::{AccountId, Decimal, LogEntry, MarketId, Side, Trade, Transfer, TransferKind};
pub use error::AppError;
pub use jobs::{Job, JobRegistry, JobStatus};
pub use ledger::{ExplorerClient, LedgerError, LedgerSource, MockLedgerSource};
pub use pipeline::{Report, ReportSummary};
