//! Domain types for the fiscal report pipeline.
//!
//! - Exact numeric handling via the Decimal wrapper
//! - Primitives: AccountId, MarketId, Side
//! - Raw wire types (LogEntry and payloads) and the reduced Trade/Transfer
//!   records the pipeline works with

pub mod decimal;
pub mod log_entry;
pub mod primitives;
pub mod trade;
pub mod transfer;

pub use decimal::Decimal;
pub use log_entry::{LogEntry, Pubdata, TradePubdata};
pub use primitives::{AccountId, MarketId, Side};
pub use trade::Trade;
pub use transfer::{Transfer, TransferKind};
