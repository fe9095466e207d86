//! Deposit / withdrawal / internal transfer records.

use crate::domain::{Decimal, LogEntry};
use serde::{Deserialize, Serialize};

/// Direction of a non-trade movement relative to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    /// Inbound from the settlement layer (L1 -> L2).
    Deposit,
    /// Outbound to the settlement layer (L2 -> L1).
    Withdrawal,
    /// Internal movement between ledger accounts.
    Transfer,
}

/// A deposit, withdrawal, or internal transfer kept for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub time: String,
    pub kind: TransferKind,
    pub tx_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl Transfer {
    /// Build from a log entry, pulling the amount out of the transfer
    /// payload when one is present.
    pub fn from_entry(entry: &LogEntry, kind: TransferKind) -> Transfer {
        let amount = entry
            .transfer_pubdata()
            .and_then(|payload| payload.get("amount"))
            .and_then(|v| match v {
                serde_json::Value::String(s) => Decimal::from_str_exact(s).ok(),
                serde_json::Value::Number(n) => Decimal::from_str_exact(&n.to_string()).ok(),
                _ => None,
            });

        Transfer {
            time: entry.time.clone(),
            kind,
            tx_type: entry.tx_type.clone(),
            amount,
            tx_hash: entry.hash.clone(),
        }
    }
}
