//! Partition filtered log entries into trades, deposits, withdrawals, and
//! internal transfers.
//!
//! Trade patterns are checked first: a trade-with-funding transaction also
//! mentions transfer-like machinery in its type tag and would otherwise be
//! swallowed by the generic transfer match.

use crate::domain::{LogEntry, Trade, Transfer, TransferKind};
use std::collections::HashSet;
use tracing::debug;

/// Classified working set for one report run.
#[derive(Debug, Default, Clone)]
pub struct Classified {
    pub trades: Vec<Trade>,
    pub deposits: Vec<Transfer>,
    pub withdrawals: Vec<Transfer>,
    pub transfers: Vec<Transfer>,
}

const TRADE_MARKERS: [&str; 2] = ["InternalClaimOrder", "TradeWithFunding"];

fn is_trade_type(tx_type: &str) -> bool {
    TRADE_MARKERS.iter().any(|marker| tx_type.contains(marker))
}

/// Assign each entry to exactly one category; unrecognized or unexecuted
/// entries are discarded.
pub fn classify(entries: &[LogEntry]) -> Classified {
    let mut out = Classified::default();
    // Secondary guard against residual duplicates the primary dedup key
    // missed: two distinct tx types can describe the same fill.
    let mut seen_fills: HashSet<(String, u32, String, String, bool)> = HashSet::new();
    let mut discarded = 0usize;

    for entry in entries {
        // A trade-marked entry is a trade or nothing; it must never fall
        // through to the transfer patterns below.
        if is_trade_type(&entry.tx_type) {
            if entry.status == "executed" {
                if let Some(trade) = Trade::from_entry(entry) {
                    let fill_key = (
                        trade.time.clone(),
                        trade.market.as_u32(),
                        trade.size.to_canonical_string(),
                        trade.price.to_canonical_string(),
                        trade.side.is_sell(),
                    );
                    if seen_fills.insert(fill_key) {
                        out.trades.push(trade);
                    }
                    continue;
                }
            }
            discarded += 1;
            continue;
        }

        if entry.tx_type.contains("Deposit") {
            out.deposits
                .push(Transfer::from_entry(entry, TransferKind::Deposit));
        } else if entry.tx_type.contains("Withdraw") {
            out.withdrawals
                .push(Transfer::from_entry(entry, TransferKind::Withdrawal));
        } else if entry.tx_type.contains("Transfer") {
            out.transfers
                .push(Transfer::from_entry(entry, TransferKind::Transfer));
        } else {
            discarded += 1;
        }
    }

    if discarded > 0 {
        debug!(discarded, "dropped unrecognized or unexecuted entries");
    }
    out
}
